//! A module for working with edges.

use std::fmt;

use crate::graph::NodeId;

/// A pair of nodes representing an undirected graph edge.
///
/// The endpoints are stored in ascending order so `(a, b)` and `(b, a)` are the same edge, both
/// for equality and hashing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    source: NodeId,
    target: NodeId,
}

impl Edge {
    /// Creates a new edge from two nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallworld::edge::Edge;
    ///
    /// let edge = Edge::new(3, 1);
    /// assert_eq!(edge, Edge::new(1, 3));
    /// ```
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self {
                source: a,
                target: b,
            }
        } else {
            Self {
                source: b,
                target: a,
            }
        }
    }

    /// Returns the lower of the two endpoints.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallworld::edge::Edge;
    ///
    /// assert_eq!(Edge::new(4, 2).source(), 2);
    /// ```
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Returns the higher of the two endpoints.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Whether both endpoints are the same node.
    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::hash_map::DefaultHasher,
        hash::{Hash, Hasher},
    };

    use super::*;

    #[test]
    fn new_orders_endpoints() {
        let edge = Edge::new(5, 2);

        assert_eq!(edge.source(), 2);
        assert_eq!(edge.target(), 5);
    }

    #[test]
    fn is_loop() {
        assert!(Edge::new(2, 2).is_loop());
        assert!(!Edge::new(2, 3).is_loop());
    }

    #[test]
    fn display() {
        assert_eq!(Edge::new(9, 4).to_string(), "4-9");
    }

    //
    // Trait implementations
    //

    #[test]
    fn partial_eq() {
        assert_eq!(Edge::new(0, 1), Edge::new(0, 1));
        assert_eq!(Edge::new(0, 1), Edge::new(1, 0));
        assert_ne!(Edge::new(0, 1), Edge::new(0, 2));
    }

    #[test]
    fn hash() {
        let mut h1 = DefaultHasher::new();
        let mut h2 = DefaultHasher::new();

        let k1 = Edge::new(0, 1);
        let k2 = Edge::new(1, 0);

        k1.hash(&mut h1);
        k2.hash(&mut h2);

        // Verify k1 == k2 => hash(k1) == hash(k2).
        assert_eq!(h1.finish(), h2.finish());
    }
}
