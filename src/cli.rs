//! Command-line interface orchestration.
//!
//! Without a subcommand the binary runs the full demonstration: an Erdős–Rényi graph, a
//! Watts–Strogatz graph and a rewiring probability sweep. Each stage is also available on its
//! own with overridable parameters.

use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::{rngs::SmallRng, SeedableRng};
use thiserror::Error;
use tracing::{info, instrument};

use crate::{
    generate::{generate_random_graph, generate_small_world_graph, GenerateError},
    graph::{Graph, PathLengthError},
    plot::{render_sweep, visualize_graph, ImageFormat, Output, PlotError},
    report::analyze_graph,
    sweep::{self, SweepConfig, SweepError},
    viewer::Viewer,
};

const RANDOM_TITLE: &str = "Random Graph (Erdős–Rényi)";
const SMALL_WORLD_TITLE: &str = "Small-World Network (Watts–Strogatz)";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "smallworld",
    about = "Generate random and small-world graphs, report their metrics and plot the rewiring sweep."
)]
pub struct Cli {
    /// Stage to run; the full demonstration when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct GlobalArgs {
    /// Directory figures are written to, created if missing.
    #[arg(long, global = true, default_value = "results")]
    pub output_dir: PathBuf,

    /// Image format of the saved figures.
    #[arg(long, global = true, value_enum, default_value_t = ImageFormat::Svg)]
    pub format: ImageFormat,

    /// Seed for the random number generator, for reproducible runs.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Open every saved figure with the system viewer, waiting for it to close.
    #[arg(long, global = true)]
    pub show: bool,

    /// How single-graph reports are printed.
    #[arg(long, global = true, value_enum, default_value_t = ReportFormat::Human)]
    pub report: ReportFormat,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the random graph, small-world graph and sweep stages in turn.
    Demo,
    /// Generate, draw and report an Erdős–Rényi graph.
    Random(RandomArgs),
    /// Generate, draw and report a Watts–Strogatz graph.
    SmallWorld(SmallWorldArgs),
    /// Sweep the rewiring probability and plot clustering and path length.
    Sweep(SweepArgs),
}

/// Options accepted by the `random` command.
#[derive(Debug, Args, Clone)]
pub struct RandomArgs {
    /// Number of nodes.
    #[arg(short, long, default_value_t = 30)]
    pub nodes: usize,

    /// Probability of an edge between any pair of nodes.
    #[arg(short, long, default_value_t = 0.1)]
    pub probability: f64,
}

/// Options accepted by the `small-world` command.
#[derive(Debug, Args, Clone)]
pub struct SmallWorldArgs {
    /// Number of nodes.
    #[arg(short, long, default_value_t = 30)]
    pub nodes: usize,

    /// Number of nearest neighbours each node starts with, must be even.
    #[arg(short = 'k', long, default_value_t = 4)]
    pub neighbours: usize,

    /// Rewiring probability.
    #[arg(short, long, default_value_t = 0.1)]
    pub probability: f64,
}

/// Options accepted by the `sweep` command.
#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    /// Number of nodes of every sampled graph.
    #[arg(short, long, default_value_t = 50)]
    pub nodes: usize,

    /// Number of nearest neighbours of every sampled graph, must be even.
    #[arg(short = 'k', long, default_value_t = 4)]
    pub neighbours: usize,

    /// Number of evenly spaced probabilities over [0, 1].
    #[arg(short, long, default_value_t = 20)]
    pub steps: usize,
}

impl From<&SweepArgs> for SweepConfig {
    fn from(args: &SweepArgs) -> Self {
        Self {
            nodes: args.nodes,
            neighbours: args.neighbours,
            steps: args.steps,
        }
    }
}

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// A readable mapping of metric names to values.
    Human,
    /// One JSON object per report.
    Json,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    PathLength(#[from] PathLengthError),
    #[error(transparent)]
    Sweep(#[from] SweepError),
    #[error(transparent)]
    Plot(#[from] PlotError),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// State shared by the stages of one invocation.
struct Session<'w, W> {
    output: Output,
    report: ReportFormat,
    rng: SmallRng,
    out: &'w mut W,
}

/// Executes the command represented by `cli`, writing headers and reports to `out`.
///
/// # Errors
///
/// Returns [`CliError`] when generation, analysis, rendering or writing fails.
pub fn run_cli<W: Write>(cli: Cli, out: &mut W) -> Result<(), CliError> {
    let global = cli.global;
    let rng = match global.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let mut session = Session {
        output: Output {
            dir: global.output_dir,
            format: global.format,
            viewer: if global.show {
                Viewer::System
            } else {
                Viewer::Headless
            },
        },
        report: global.report,
        rng,
        out,
    };

    match cli.command.unwrap_or(Command::Demo) {
        Command::Demo => session.demo(),
        Command::Random(args) => session.random(&args),
        Command::SmallWorld(args) => session.small_world(&args),
        Command::Sweep(args) => session.sweep(&args),
    }
}

impl<W: Write> Session<'_, W> {
    #[instrument(skip(self))]
    fn demo(&mut self) -> Result<(), CliError> {
        writeln!(self.out, "=== Random Graph Simulation ===")?;
        self.random(&RandomArgs {
            nodes: 20,
            probability: 0.2,
        })?;

        writeln!(self.out, "\n=== Small-World Network Simulation ===")?;
        self.small_world(&SmallWorldArgs {
            nodes: 30,
            neighbours: 4,
            probability: 0.3,
        })?;

        writeln!(
            self.out,
            "\n=== Analyzing Small-World Properties for Different Rewiring Probabilities ==="
        )?;
        self.sweep(&SweepArgs {
            nodes: 50,
            neighbours: 4,
            steps: 20,
        })
    }

    #[instrument(skip(self))]
    fn random(&mut self, args: &RandomArgs) -> Result<(), CliError> {
        let graph = generate_random_graph(args.nodes, args.probability, &mut self.rng)?;
        self.draw_and_report(&graph, RANDOM_TITLE, "random_graph")
    }

    #[instrument(skip(self))]
    fn small_world(&mut self, args: &SmallWorldArgs) -> Result<(), CliError> {
        let graph = generate_small_world_graph(
            args.nodes,
            args.neighbours,
            args.probability,
            &mut self.rng,
        )?;
        self.draw_and_report(&graph, SMALL_WORLD_TITLE, "small_world")
    }

    #[instrument(skip(self))]
    fn sweep(&mut self, args: &SweepArgs) -> Result<(), CliError> {
        let series = sweep::run(&SweepConfig::from(args), &mut self.rng)?;
        render_sweep(&series, &self.output)?;
        Ok(())
    }

    fn draw_and_report(&mut self, graph: &Graph, title: &str, stem: &str) -> Result<(), CliError> {
        visualize_graph(graph, title, Some(stem), &self.output, &mut self.rng)?;

        let report = analyze_graph(graph)?;
        info!(
            nodes = report.nodes,
            edges = report.edges,
            connected = graph.is_connected(),
            "graph analysed"
        );

        match self.report {
            ReportFormat::Human => writeln!(self.out, "{report}")?,
            ReportFormat::Json => writeln!(self.out, "{}", serde_json::to_string(&report)?)?,
        }

        Ok(())
    }
}
