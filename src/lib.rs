//! Smallworld generates Erdős–Rényi and Watts–Strogatz graphs, measures their clustering and
//! average shortest path length, draws them, and sweeps the Watts–Strogatz rewiring probability
//! to show the small-world transition.
//!
//! # Basic usage
//!
//! The library is centered around the [`Graph`](graph::Graph) structure, built by the
//! generators in [`generate`]. Once constructed, a graph can be analysed into a
//! [`Report`](report::Report) or drawn with [`plot`].
//!
//! ```rust
//! use rand::{rngs::SmallRng, SeedableRng};
//!
//! use smallworld::generate::generate_small_world_graph;
//! use smallworld::report::analyze_graph;
//! use smallworld::sweep::{self, SweepConfig};
//!
//! let mut rng = SmallRng::seed_from_u64(1);
//!
//! // A ring lattice of 30 nodes with 4 neighbours each, 30% of edges rewired.
//! let graph = generate_small_world_graph(30, 4, 0.3, &mut rng).unwrap();
//! let report = analyze_graph(&graph).unwrap();
//! println!("{report}");
//! // ...outputs something like:
//! // {nodes: 30, edges: 60, avg_clustering: 0.241, avg_path_length: 2.687}
//!
//! // Clustering and path length for 20 rewiring probabilities over [0, 1].
//! let series = sweep::run(&SweepConfig::default(), &mut rng).unwrap();
//! assert_eq!(series.len(), 20);
//! ```

pub mod cli;
pub mod edge;
pub mod generate;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod plot;
pub mod report;
pub mod sweep;
pub mod viewer;
