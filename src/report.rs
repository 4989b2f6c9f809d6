//! Single-graph analysis.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::graph::{Graph, PathLengthError};

/// The label used in place of a path length when the graph is disconnected.
pub const NOT_CONNECTED: &str = "Not connected";

/// The average shortest path length of an analysed graph.
///
/// Being disconnected and having a path length of zero (a single node) are distinct states.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathLength {
    /// Rounded to three decimals.
    Connected(f64),
    NotConnected,
}

impl fmt::Display for PathLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected(value) => write!(f, "{value}"),
            Self::NotConnected => f.write_str(NOT_CONNECTED),
        }
    }
}

impl Serialize for PathLength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Connected(value) => serializer.serialize_f64(*value),
            Self::NotConnected => serializer.serialize_str(NOT_CONNECTED),
        }
    }
}

/// The descriptive statistics of a single graph.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Report {
    pub nodes: usize,
    pub edges: usize,
    /// Rounded to three decimals.
    pub avg_clustering: f64,
    pub avg_path_length: PathLength,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{nodes: {}, edges: {}, avg_clustering: {}, avg_path_length: {}}}",
            self.nodes, self.edges, self.avg_clustering, self.avg_path_length
        )
    }
}

/// Computes the node and edge counts, average clustering and average shortest path length of
/// `graph`.
///
/// # Errors
///
/// Only a disconnected graph is reported through [`PathLength::NotConnected`]; a graph without
/// nodes has no defined path length and fails with [`PathLengthError::NullGraph`].
///
/// # Examples
///
/// ```
/// use smallworld::graph::Graph;
/// use smallworld::report::{analyze_graph, PathLength};
///
/// let report = analyze_graph(&Graph::new(4)).unwrap();
///
/// assert_eq!(report.nodes, 4);
/// assert_eq!(report.edges, 0);
/// assert_eq!(report.avg_path_length, PathLength::NotConnected);
/// ```
pub fn analyze_graph(graph: &Graph) -> Result<Report, PathLengthError> {
    let avg_path_length = match graph.average_shortest_path_length() {
        Ok(length) => PathLength::Connected(round3(length)),
        Err(PathLengthError::Disconnected) => PathLength::NotConnected,
        Err(err) => return Err(err),
    };

    Ok(Report {
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        avg_clustering: round3(graph.average_clustering()),
        avg_path_length,
    })
}

/// Rounds to three decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
