//! Sweeps the Watts–Strogatz rewiring probability and records how clustering and path length
//! respond.

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    generate::{Generate, GenerateError, WattsStrogatz},
    graph::PathLengthError,
};

/// Errors that abort a sweep. Disconnected samples never do.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum SweepError {
    /// At least one sample is needed.
    #[error("a sweep needs at least one step")]
    NoSteps,
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    PathLength(#[from] PathLengthError),
}

/// Parameters of a rewiring probability sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepConfig {
    /// Node count of every sampled graph.
    pub nodes: usize,
    /// Lattice degree of every sampled graph.
    pub neighbours: usize,
    /// Number of evenly spaced probabilities over `[0, 1]`.
    pub steps: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            nodes: 50,
            neighbours: 4,
            steps: 20,
        }
    }
}

/// The metrics recorded at each sampled probability; index `i` of each series corresponds to
/// `probabilities[i]`.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepSeries {
    pub probabilities: Vec<f64>,
    pub clustering: Vec<f64>,
    /// `NaN` where the sampled graph was disconnected.
    pub path_length: Vec<f64>,
}

impl SweepSeries {
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Returns the number of samples whose path length is undefined.
    pub fn disconnected_samples(&self) -> usize {
        self.path_length.iter().filter(|value| value.is_nan()).count()
    }
}

/// Returns `steps` evenly spaced values over `[start, end]`, both ends included. A single step
/// yields `start`.
///
/// # Examples
///
/// ```
/// use smallworld::sweep::linspace;
///
/// assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// assert_eq!(linspace(0.0, 1.0, 1), vec![0.0]);
/// assert!(linspace(0.0, 1.0, 0).is_empty());
/// ```
pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (steps - 1) as f64;
            let mut values: Vec<f64> = (0..steps).map(|i| start + step * i as f64).collect();

            // Pin the end point, accumulated rounding would otherwise miss it.
            values[steps - 1] = end;
            values
        }
    }
}

/// Generates one Watts–Strogatz graph per sampled rewiring probability and records its average
/// clustering and average shortest path length.
///
/// # Errors
///
/// Invalid graph parameters fail the sweep immediately. A disconnected sample records `NaN` as
/// its path length and the sweep carries on; no other failure is absorbed.
///
/// # Examples
///
/// ```
/// use rand::{rngs::SmallRng, SeedableRng};
/// use smallworld::sweep::{run, SweepConfig};
///
/// let mut rng = SmallRng::seed_from_u64(3);
/// let series = run(&SweepConfig { nodes: 20, neighbours: 4, steps: 5 }, &mut rng).unwrap();
///
/// assert_eq!(series.len(), 5);
/// assert_eq!(series.clustering.len(), 5);
/// assert_eq!(series.path_length.len(), 5);
/// ```
#[instrument(skip(rng))]
pub fn run<R: Rng>(config: &SweepConfig, rng: &mut R) -> Result<SweepSeries, SweepError> {
    if config.steps == 0 {
        return Err(SweepError::NoSteps);
    }

    let probabilities = linspace(0.0, 1.0, config.steps);
    let mut clustering = Vec::with_capacity(config.steps);
    let mut path_length = Vec::with_capacity(config.steps);

    for &probability in &probabilities {
        let graph = WattsStrogatz {
            nodes: config.nodes,
            neighbours: config.neighbours,
            probability,
        }
        .generate(rng)?;

        let coefficient = graph.average_clustering();
        let length = match graph.average_shortest_path_length() {
            Ok(length) => length,
            Err(PathLengthError::Disconnected) => {
                warn!(
                    probability,
                    components = graph.connected_components(),
                    "sampled graph is disconnected, path length undefined"
                );
                f64::NAN
            }
            Err(err) => return Err(err.into()),
        };

        debug!(probability, clustering = coefficient, path_length = length, "sampled");
        clustering.push(coefficient);
        path_length.push(length);
    }

    let series = SweepSeries {
        probabilities,
        clustering,
        path_length,
    };
    info!(
        samples = series.len(),
        disconnected = series.disconnected_samples(),
        "sweep complete"
    );

    Ok(series)
}
