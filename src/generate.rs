//! Random graph generators.
//!
//! Both models are plain parameter structs implementing [`Generate`], so callers choose the
//! random number generator and runs can be reproduced from a seed.

use itertools::Itertools;
use rand::Rng;
use thiserror::Error;
use tracing::trace;

use crate::{
    edge::Edge,
    graph::{Graph, GraphError},
};

/// Errors raised when a generator's parameters can't produce a graph.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum GenerateError {
    /// The edge or rewiring probability is not a number in `[0, 1]`.
    #[error("probability {0} must be within [0, 1]")]
    InvalidProbability(f64),
    /// The ring lattice needs the same number of neighbours on each side.
    #[error("neighbour degree k={0} must be even")]
    OddDegree(usize),
    /// Each node must have at least one non-neighbour to rewire towards.
    #[error("neighbour degree k={k} must be smaller than the node count n={n}")]
    DegreeTooLarge { n: usize, k: usize },
    /// The generator produced an edge the graph rejected.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// A generator of random graphs.
pub trait Generate {
    /// Generates a graph, drawing randomness from `rng`.
    fn generate<R: Rng>(&self, rng: &mut R) -> Result<Graph, GenerateError>;
}

/// The Erdős–Rényi G(n, p) model: every pair of nodes is joined independently with
/// probability `p`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErdosRenyi {
    pub nodes: usize,
    pub probability: f64,
}

impl Default for ErdosRenyi {
    fn default() -> Self {
        Self {
            nodes: 30,
            probability: 0.1,
        }
    }
}

impl Generate for ErdosRenyi {
    fn generate<R: Rng>(&self, rng: &mut R) -> Result<Graph, GenerateError> {
        check_probability(self.probability)?;

        if self.probability >= 1.0 {
            return Ok(Graph::complete(self.nodes));
        }

        let mut graph = Graph::new(self.nodes);
        if self.probability <= 0.0 {
            return Ok(graph);
        }

        for (a, b) in (0..self.nodes).tuple_combinations() {
            if rng.gen::<f64>() < self.probability {
                graph.insert(Edge::new(a, b))?;
            }
        }

        Ok(graph)
    }
}

/// The Watts–Strogatz small-world model: a ring lattice in which every node is joined to its
/// `neighbours / 2` nearest nodes on each side, with every lattice edge rewired to a random
/// endpoint with probability `probability`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WattsStrogatz {
    pub nodes: usize,
    pub neighbours: usize,
    pub probability: f64,
}

impl Default for WattsStrogatz {
    fn default() -> Self {
        Self {
            nodes: 30,
            neighbours: 4,
            probability: 0.1,
        }
    }
}

impl WattsStrogatz {
    /// Checks the parameters without generating anything.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallworld::generate::{GenerateError, WattsStrogatz};
    ///
    /// let model = WattsStrogatz { nodes: 4, neighbours: 4, probability: 0.5 };
    /// assert_eq!(model.validate(), Err(GenerateError::DegreeTooLarge { n: 4, k: 4 }));
    /// ```
    pub fn validate(&self) -> Result<(), GenerateError> {
        check_probability(self.probability)?;

        if self.neighbours % 2 != 0 {
            return Err(GenerateError::OddDegree(self.neighbours));
        }
        if self.neighbours >= self.nodes {
            return Err(GenerateError::DegreeTooLarge {
                n: self.nodes,
                k: self.neighbours,
            });
        }

        Ok(())
    }
}

impl Generate for WattsStrogatz {
    fn generate<R: Rng>(&self, rng: &mut R) -> Result<Graph, GenerateError> {
        self.validate()?;

        let n = self.nodes;
        let half = self.neighbours / 2;
        let mut graph = Graph::new(n);

        // Ring lattice.
        for offset in 1..=half {
            for u in 0..n {
                graph.insert(Edge::new(u, (u + offset) % n))?;
            }
        }

        // Rewire one lattice layer at a time, nearest neighbours first.
        for offset in 1..=half {
            for u in 0..n {
                if rng.gen::<f64>() >= self.probability {
                    continue;
                }

                // No free endpoint left for u.
                if graph.degree(u) >= n - 1 {
                    trace!(node = u, offset, "node saturated, skipping rewire");
                    continue;
                }

                let mut w = rng.gen_range(0..n);
                while w == u || graph.contains(&Edge::new(u, w)) {
                    w = rng.gen_range(0..n);
                }

                graph.remove(&Edge::new(u, (u + offset) % n));
                graph.insert(Edge::new(u, w))?;
            }
        }

        Ok(graph)
    }
}

/// Generates an Erdős–Rényi graph on `n` nodes with edge probability `p`.
///
/// # Examples
///
/// ```
/// use rand::{rngs::SmallRng, SeedableRng};
/// use smallworld::generate::generate_random_graph;
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let graph = generate_random_graph(20, 0.2, &mut rng).unwrap();
/// assert_eq!(graph.node_count(), 20);
/// ```
pub fn generate_random_graph<R: Rng>(
    n: usize,
    p: f64,
    rng: &mut R,
) -> Result<Graph, GenerateError> {
    ErdosRenyi {
        nodes: n,
        probability: p,
    }
    .generate(rng)
}

/// Generates a Watts–Strogatz small-world graph on `n` nodes, each initially joined to its `k`
/// nearest neighbours, with rewiring probability `p`.
///
/// # Examples
///
/// ```
/// use rand::{rngs::SmallRng, SeedableRng};
/// use smallworld::generate::generate_small_world_graph;
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let graph = generate_small_world_graph(30, 4, 0.3, &mut rng).unwrap();
/// assert_eq!(graph.node_count(), 30);
/// assert_eq!(graph.edge_count(), 60);
/// ```
pub fn generate_small_world_graph<R: Rng>(
    n: usize,
    k: usize,
    p: f64,
    rng: &mut R,
) -> Result<Graph, GenerateError> {
    WattsStrogatz {
        nodes: n,
        neighbours: k,
        probability: p,
    }
    .generate(rng)
}

fn check_probability(p: f64) -> Result<(), GenerateError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(GenerateError::InvalidProbability(p))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::{rngs::SmallRng, SeedableRng};
    use rstest::rstest;

    use super::*;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn erdos_renyi_extremes() {
        let empty = generate_random_graph(10, 0.0, &mut rng()).unwrap();
        assert_eq!(empty.node_count(), 10);
        assert_eq!(empty.edge_count(), 0);

        let complete = generate_random_graph(10, 1.0, &mut rng()).unwrap();
        assert_eq!(complete.edge_count(), 45);
    }

    #[test]
    fn erdos_renyi_scenario() {
        let graph = generate_random_graph(20, 0.2, &mut rng()).unwrap();

        assert_eq!(graph.node_count(), 20);
        assert!(graph.edge_count() <= 190);
    }

    #[test]
    fn erdos_renyi_is_seeded() {
        let a = generate_random_graph(25, 0.3, &mut rng()).unwrap();
        let b = generate_random_graph(25, 0.3, &mut rng()).unwrap();

        assert_eq!(a.edges(), b.edges());
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn invalid_probability(#[case] p: f64) {
        assert!(matches!(
            generate_random_graph(5, p, &mut rng()),
            Err(GenerateError::InvalidProbability(_))
        ));
        assert!(matches!(
            generate_small_world_graph(5, 2, p, &mut rng()),
            Err(GenerateError::InvalidProbability(_))
        ));
    }

    #[rstest]
    #[case(10, 3, GenerateError::OddDegree(3))]
    #[case(4, 4, GenerateError::DegreeTooLarge { n: 4, k: 4 })]
    #[case(4, 6, GenerateError::DegreeTooLarge { n: 4, k: 6 })]
    fn invalid_watts_strogatz(#[case] n: usize, #[case] k: usize, #[case] expected: GenerateError) {
        assert_eq!(
            generate_small_world_graph(n, k, 0.2, &mut rng()).unwrap_err(),
            expected
        );
    }

    #[test]
    fn ring_lattice_without_rewiring() {
        let graph = generate_small_world_graph(10, 4, 0.0, &mut rng()).unwrap();

        assert_eq!(graph.edge_count(), 20);
        for u in graph.nodes() {
            assert!(graph.contains(&Edge::new(u, (u + 1) % 10)));
            assert!(graph.contains(&Edge::new(u, (u + 2) % 10)));
        }

        // 3(k - 2) / 4(k - 1) for a ring lattice.
        assert!((graph.average_clustering() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_degree_lattice_is_edgeless() {
        let graph = generate_small_world_graph(5, 0, 0.5, &mut rng()).unwrap();

        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn full_rewiring_keeps_edge_count() {
        let graph = generate_small_world_graph(50, 4, 1.0, &mut rng()).unwrap();

        assert_eq!(graph.node_count(), 50);
        assert_eq!(graph.edge_count(), 100);
    }

    #[test]
    fn saturated_nodes_stop_rewiring() {
        // n = 5, k = 4 is the complete graph, no node has a free endpoint.
        let graph = generate_small_world_graph(5, 4, 1.0, &mut rng()).unwrap();

        assert_eq!(graph.edge_count(), 10);
    }

    proptest! {
        #[test]
        fn small_world_shape(
            half in 0usize..4,
            extra in 1usize..30,
            p in 0.0f64..=1.0,
            seed in any::<u64>(),
        ) {
            let k = half * 2;
            let n = k + extra;
            let mut rng = SmallRng::seed_from_u64(seed);
            let graph = generate_small_world_graph(n, k, p, &mut rng).unwrap();

            prop_assert_eq!(graph.node_count(), n);
            prop_assert_eq!(graph.edge_count(), n * k / 2);
            prop_assert_eq!(graph.edge_count(), graph.edges().len());

            let clustering = graph.average_clustering();
            prop_assert!((0.0..=1.0).contains(&clustering));
        }

        #[test]
        fn random_graph_shape(n in 0usize..40, p in 0.0f64..=1.0, seed in any::<u64>()) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let graph = generate_random_graph(n, p, &mut rng).unwrap();

            prop_assert_eq!(graph.node_count(), n);
            prop_assert!(graph.edge_count() <= n * n.saturating_sub(1) / 2);

            let clustering = graph.average_clustering();
            prop_assert!((0.0..=1.0).contains(&clustering));
        }
    }
}
