//! Force-directed node placement for drawing graphs.

use nalgebra::Vector2;
use rand::Rng;

use crate::graph::Graph;

/// Number of Fruchterman–Reingold iterations used when drawing.
pub const DEFAULT_ITERATIONS: usize = 50;

/// Smallest distance considered between two nodes, keeps the forces finite.
const MIN_DISTANCE: f64 = 0.01;

/// Computes a Fruchterman–Reingold spring layout: connected nodes attract, all nodes repel,
/// and the step size cools linearly over `iterations`.
///
/// Positions start uniformly at random in the unit square and the result is centred on the
/// origin and scaled so the furthest coordinate lies on the `[-1, 1]` boundary. Index `i` of
/// the result is the position of node `i`.
///
/// # Examples
///
/// ```
/// use rand::{rngs::SmallRng, SeedableRng};
/// use smallworld::graph::Graph;
/// use smallworld::layout::spring_layout;
///
/// let mut rng = SmallRng::seed_from_u64(0);
/// let positions = spring_layout(&Graph::complete(5), 50, &mut rng);
///
/// assert_eq!(positions.len(), 5);
/// assert!(positions.iter().all(|p| p.x.abs() <= 1.0 && p.y.abs() <= 1.0));
/// ```
pub fn spring_layout<R: Rng>(graph: &Graph, iterations: usize, rng: &mut R) -> Vec<Vector2<f64>> {
    let n = graph.node_count();
    if n == 0 {
        return vec![];
    }

    let mut positions: Vec<Vector2<f64>> = (0..n)
        .map(|_| Vector2::new(rng.gen::<f64>(), rng.gen::<f64>()))
        .collect();

    // Optimal distance between nodes for a unit area.
    let k = (1.0 / n as f64).sqrt();
    let mut temperature = 0.1;
    let cooling = temperature / (iterations + 1) as f64;
    let adjacency = graph.adjacency_matrix();

    for _ in 0..iterations {
        let mut displacements = vec![Vector2::zeros(); n];

        for (i, displacement) in displacements.iter_mut().enumerate() {
            for j in 0..n {
                if i == j {
                    continue;
                }

                let delta = positions[i] - positions[j];
                let distance = delta.norm().max(MIN_DISTANCE);
                let repulsion = k * k / (distance * distance);
                let attraction = adjacency[(i, j)] * distance / k;

                *displacement += delta * (repulsion - attraction);
            }
        }

        for (position, displacement) in positions.iter_mut().zip(&displacements) {
            let length = displacement.norm().max(MIN_DISTANCE);
            *position += displacement * (temperature / length);
        }

        temperature -= cooling;
    }

    rescale(&mut positions);
    positions
}

/// Centres the positions on the origin and scales them into `[-1, 1]`.
fn rescale(positions: &mut [Vector2<f64>]) {
    if positions.is_empty() {
        return;
    }

    let mean = positions.iter().sum::<Vector2<f64>>() / positions.len() as f64;
    for position in positions.iter_mut() {
        *position -= mean;
    }

    let extent = positions
        .iter()
        .map(|position| position.amax())
        .fold(0.0, f64::max);

    if extent > 0.0 {
        for position in positions.iter_mut() {
            *position /= extent;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, SeedableRng};

    use super::*;
    use crate::edge::Edge;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(5)
    }

    #[test]
    fn empty_graph() {
        assert!(spring_layout(&Graph::new(0), DEFAULT_ITERATIONS, &mut rng()).is_empty());
    }

    #[test]
    fn single_node_is_centred() {
        let positions = spring_layout(&Graph::new(1), DEFAULT_ITERATIONS, &mut rng());

        assert_eq!(positions, vec![Vector2::zeros()]);
    }

    #[test]
    fn positions_are_normalised() {
        let mut graph = Graph::new(10);
        for u in 0..10 {
            graph.insert(Edge::new(u, (u + 1) % 10)).unwrap();
        }

        let positions = spring_layout(&graph, DEFAULT_ITERATIONS, &mut rng());
        let extent = positions.iter().map(|p| p.amax()).fold(0.0, f64::max);

        assert_eq!(positions.len(), 10);
        assert!((extent - 1.0).abs() < 1e-9);
        assert!(positions.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn connected_nodes_end_up_closer() {
        // Two nodes joined by an edge and one isolated node.
        let mut graph = Graph::new(3);
        graph.insert(Edge::new(0, 1)).unwrap();

        let positions = spring_layout(&graph, 200, &mut rng());
        let joined = (positions[0] - positions[1]).norm();
        let apart = (positions[0] - positions[2])
            .norm()
            .min((positions[1] - positions[2]).norm());

        assert!(joined < apart);
    }

    #[test]
    fn rescale_centres() {
        let mut positions = vec![Vector2::new(1.0, 1.0), Vector2::new(3.0, 1.0)];
        rescale(&mut positions);

        assert_eq!(positions, vec![Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0)]);
    }
}
