//! A module for working with graphs.

use std::{
    cell::OnceCell,
    collections::{HashSet, VecDeque},
    ops::Range,
};

use nalgebra::DMatrix;
use thiserror::Error;

use crate::edge::Edge;

/// Nodes are identified by their position in `0..node_count`.
pub type NodeId = usize;

/// Errors raised when mutating a [`Graph`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// The edge references a node outside of `0..node_count`.
    #[error("node {node} is out of range for a graph with {node_count} nodes")]
    NodeOutOfRange { node: NodeId, node_count: usize },
    /// Simple graphs don't allow an edge from a node to itself.
    #[error("self-loop on node {node} is not allowed")]
    SelfLoop { node: NodeId },
}

/// Reasons the average shortest path length can't be computed.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PathLengthError {
    /// At least one pair of nodes has no path between them.
    #[error("graph is not connected")]
    Disconnected,
    /// There are no nodes to average over.
    #[error("average shortest path length is undefined for the null graph")]
    NullGraph,
}

/// A simple undirected graph over a fixed set of nodes.
///
/// Unlike an edge list, the node set is explicit: isolated nodes still count towards the node
/// total and every metric.
#[derive(Clone, Debug)]
pub struct Graph {
    /// The number of nodes, which are numbered `0..node_count`.
    node_count: usize,
    /// The edges in the graph.
    edges: HashSet<Edge>,
    /// Cache the sorted neighbour list of every node.
    adjacency_lists: OnceCell<Vec<Vec<NodeId>>>,
    /// Cache the adjacency matrix.
    adjacency_matrix: OnceCell<DMatrix<f64>>,
    /// Cache the number of triangles through every node.
    triangles: OnceCell<Vec<usize>>,
}

impl Graph {
    /// Creates a graph of `node_count` isolated nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallworld::graph::Graph;
    ///
    /// let graph = Graph::new(5);
    /// assert_eq!(graph.node_count(), 5);
    /// assert_eq!(graph.edge_count(), 0);
    /// ```
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            edges: Default::default(),
            adjacency_lists: OnceCell::new(),
            adjacency_matrix: OnceCell::new(),
            triangles: OnceCell::new(),
        }
    }

    /// Creates the complete graph on `node_count` nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallworld::graph::Graph;
    ///
    /// let graph = Graph::complete(4);
    /// assert_eq!(graph.edge_count(), 6);
    /// ```
    pub fn complete(node_count: usize) -> Self {
        let mut graph = Self::new(node_count);
        for a in 0..node_count {
            for b in a + 1..node_count {
                graph.edges.insert(Edge::new(a, b));
            }
        }

        graph
    }

    /// Returns the set of edges, in no particular order.
    pub fn edges(&self) -> &HashSet<Edge> {
        &self.edges
    }

    /// Returns the range of node ids.
    pub fn nodes(&self) -> Range<NodeId> {
        0..self.node_count
    }

    /// Inserts an edge into the graph, returning whether it was newly added.
    ///
    /// # Errors
    ///
    /// Fails if either endpoint is outside of the node range or the edge is a self-loop.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallworld::edge::Edge;
    /// use smallworld::graph::Graph;
    ///
    /// let mut graph = Graph::new(3);
    ///
    /// assert_eq!(graph.insert(Edge::new(0, 1)), Ok(true));
    /// assert_eq!(graph.insert(Edge::new(1, 0)), Ok(false));
    /// assert!(graph.insert(Edge::new(0, 3)).is_err());
    /// ```
    pub fn insert(&mut self, edge: Edge) -> Result<bool, GraphError> {
        if edge.is_loop() {
            return Err(GraphError::SelfLoop {
                node: edge.source(),
            });
        }
        // The target is always the higher endpoint.
        if edge.target() >= self.node_count {
            return Err(GraphError::NodeOutOfRange {
                node: edge.target(),
                node_count: self.node_count,
            });
        }

        let is_inserted = self.edges.insert(edge);

        // The cached objects can't be reliably updated from the new connection alone.
        if is_inserted {
            self.clear_cache();
        }

        Ok(is_inserted)
    }

    /// Removes an edge from the set and returns whether it was present in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallworld::edge::Edge;
    /// use smallworld::graph::Graph;
    ///
    /// let mut graph = Graph::new(3);
    /// graph.insert(Edge::new(0, 1)).unwrap();
    ///
    /// assert!(graph.remove(&Edge::new(1, 0)));
    /// assert!(!graph.remove(&Edge::new(0, 2)));
    /// ```
    pub fn remove(&mut self, edge: &Edge) -> bool {
        let is_removed = self.edges.remove(edge);

        if is_removed {
            self.clear_cache();
        }

        is_removed
    }

    /// Checks if the graph contains an edge.
    pub fn contains(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    /// Returns the node count of the graph, isolated nodes included.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns the edge count of the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the neighbours of `node` in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `node` is out of range.
    pub fn neighbours(&self, node: NodeId) -> &[NodeId] {
        &self.adjacency_lists()[node]
    }

    /// Returns the number of edges incident to `node`.
    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbours(node).len()
    }

    /// Constructs the adjacency matrix for this graph, row and column `i` being node `i`.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::dmatrix;
    /// use smallworld::edge::Edge;
    /// use smallworld::graph::Graph;
    ///
    /// let mut graph = Graph::new(2);
    /// graph.insert(Edge::new(0, 1)).unwrap();
    /// assert_eq!(
    ///     graph.adjacency_matrix(),
    ///     &dmatrix![0.0, 1.0;
    ///               1.0, 0.0]
    /// );
    /// ```
    pub fn adjacency_matrix(&self) -> &DMatrix<f64> {
        self.adjacency_matrix.get_or_init(|| {
            let n = self.node_count;
            let mut matrix = DMatrix::<f64>::zeros(n, n);

            // The graph is undirected so both triangles of the matrix are written for each edge.
            for edge in &self.edges {
                let (i, j) = (edge.source(), edge.target());
                matrix[(i, j)] = 1.0;
                matrix[(j, i)] = 1.0;
            }

            matrix
        })
    }

    /// Returns the number of triangles each node takes part in.
    ///
    /// For an adjacency matrix `A`, the row sum of `A² ∘ A` counts every triangle through a node
    /// twice, once per orientation.
    pub fn triangles(&self) -> &[usize] {
        self.triangles.get_or_init(|| {
            let adjacency = self.adjacency_matrix();
            let squared = adjacency * adjacency;

            (0..self.node_count)
                .map(|i| {
                    let closed_walks = squared.row(i).dot(&adjacency.row(i));
                    (closed_walks / 2.0).round() as usize
                })
                .collect()
        })
    }

    /// Computes the local clustering coefficient of `node`: the fraction of pairs of its
    /// neighbours which are themselves connected. Nodes with fewer than two neighbours have a
    /// coefficient of 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallworld::edge::Edge;
    /// use smallworld::graph::Graph;
    ///
    /// let mut graph = Graph::new(4);
    /// for (a, b) in [(0, 1), (0, 2), (0, 3), (1, 2)] {
    ///     graph.insert(Edge::new(a, b)).unwrap();
    /// }
    ///
    /// assert_eq!(graph.local_clustering(0), 1.0 / 3.0);
    /// assert_eq!(graph.local_clustering(1), 1.0);
    /// assert_eq!(graph.local_clustering(3), 0.0);
    /// ```
    pub fn local_clustering(&self, node: NodeId) -> f64 {
        local_coefficient(self.triangles()[node], self.degree(node))
    }

    /// Computes the average of the local clustering coefficients over every node, 0 for the
    /// null graph. The result is always within `[0, 1]`.
    pub fn average_clustering(&self) -> f64 {
        if self.node_count == 0 {
            return 0.0;
        }

        let total: f64 = self
            .triangles()
            .iter()
            .zip(self.adjacency_lists())
            .map(|(&triangles, neighbours)| local_coefficient(triangles, neighbours.len()))
            .sum();

        total / self.node_count as f64
    }

    /// Returns the hop distance from `source` to every node, `None` for unreachable nodes.
    pub fn distances_from(&self, source: NodeId) -> Vec<Option<usize>> {
        let lists = self.adjacency_lists();
        let mut distances: Vec<Option<usize>> = vec![None; self.node_count];
        let mut queue = VecDeque::new();

        distances[source] = Some(0);
        queue.push_back((source, 0));

        while let Some((current, distance)) = queue.pop_front() {
            for &next in &lists[current] {
                if distances[next].is_none() {
                    distances[next] = Some(distance + 1);
                    queue.push_back((next, distance + 1));
                }
            }
        }

        distances
    }

    /// Computes the mean hop distance over all ordered pairs of distinct nodes.
    ///
    /// # Errors
    ///
    /// Returns [`PathLengthError::Disconnected`] if some pair of nodes has no path between
    /// them and [`PathLengthError::NullGraph`] if the graph has no nodes. A single node has an
    /// average path length of 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallworld::edge::Edge;
    /// use smallworld::graph::{Graph, PathLengthError};
    ///
    /// let mut graph = Graph::new(3);
    /// graph.insert(Edge::new(0, 1)).unwrap();
    /// assert_eq!(
    ///     graph.average_shortest_path_length(),
    ///     Err(PathLengthError::Disconnected)
    /// );
    ///
    /// graph.insert(Edge::new(1, 2)).unwrap();
    /// // Distances: 0-1 = 1, 1-2 = 1, 0-2 = 2.
    /// assert_eq!(graph.average_shortest_path_length(), Ok(4.0 / 3.0));
    /// ```
    pub fn average_shortest_path_length(&self) -> Result<f64, PathLengthError> {
        let n = self.node_count;
        match n {
            0 => return Err(PathLengthError::NullGraph),
            1 => return Ok(0.0),
            _ => {}
        }

        let mut total = 0usize;
        for source in self.nodes() {
            for distance in self.distances_from(source) {
                total += distance.ok_or(PathLengthError::Disconnected)?;
            }
        }

        Ok(total as f64 / (n * (n - 1)) as f64)
    }

    /// Returns the number of connected components, isolated nodes counting as their own.
    pub fn connected_components(&self) -> usize {
        let mut seen = vec![false; self.node_count];
        let mut components = 0;

        for start in self.nodes() {
            if seen[start] {
                continue;
            }

            components += 1;
            for (node, distance) in self.distances_from(start).into_iter().enumerate() {
                if distance.is_some() {
                    seen[node] = true;
                }
            }
        }

        components
    }

    /// Whether every node can reach every other node. The null graph isn't connected.
    pub fn is_connected(&self) -> bool {
        self.connected_components() == 1
    }

    //
    // Private
    //

    /// Clears the computed state.
    ///
    /// This should be called every time the set of edges is mutated since the cached state won't
    /// correspond to the new graph.
    fn clear_cache(&mut self) {
        self.adjacency_lists = OnceCell::new();
        self.adjacency_matrix = OnceCell::new();
        self.triangles = OnceCell::new();
    }

    fn adjacency_lists(&self) -> &Vec<Vec<NodeId>> {
        self.adjacency_lists.get_or_init(|| {
            let mut lists = vec![Vec::new(); self.node_count];
            for edge in &self.edges {
                lists[edge.source()].push(edge.target());
                lists[edge.target()].push(edge.source());
            }

            // Edges are hashed, sorting keeps traversal order stable between runs.
            for list in &mut lists {
                list.sort_unstable();
            }

            lists
        })
    }
}

//
// Helpers
//

fn local_coefficient(triangles: usize, degree: usize) -> f64 {
    if degree < 2 {
        return 0.0;
    }

    let possible = degree * (degree - 1) / 2;
    triangles as f64 / possible as f64
}
