//! Rendering graphs and sweep results to image files.

use std::{
    error::Error as StdError,
    fs, io,
    path::{Path, PathBuf},
};

use nalgebra::Vector2;
use plotters::{coord::Shift, prelude::*};
use rand::Rng;
use thiserror::Error;
use tracing::{info, instrument};

use crate::{
    edge::Edge,
    graph::Graph,
    layout::{spring_layout, DEFAULT_ITERATIONS},
    sweep::SweepSeries,
    viewer::{Viewer, ViewerError},
};

/// File stem of the rewiring sweep figure.
pub const SWEEP_FILE_STEM: &str = "small_world_analysis";

const GRAPH_FIGURE_SIZE: (u32, u32) = (600, 600);
const SWEEP_FIGURE_SIZE: (u32, u32) = (800, 500);

const NODE_COLOUR: RGBColor = RGBColor(135, 206, 235);
const EDGE_COLOUR: RGBColor = RGBColor(128, 128, 128);
const NODE_RADIUS: i32 = 14;

const CLUSTERING_COLOUR: RGBColor = RGBColor(31, 119, 180);
const PATH_LENGTH_COLOUR: RGBColor = RGBColor(255, 127, 14);
const MARKER_SIZE: i32 = 4;

/// Errors raised while writing or showing a figure.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("failed to create output directory `{path}`: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The drawing backend failed, including failures to write the file.
    #[error("failed to render `{path}`: {message}")]
    Render { path: PathBuf, message: String },
    #[error(transparent)]
    View(#[from] ViewerError),
}

/// Image encodings supported for saved figures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ImageFormat {
    /// Vector output with titles, labels and legends.
    #[default]
    Svg,
    /// Bitmap output. No font is bundled for rasterising text, so bitmaps carry the drawing only.
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    /// Whether figures in this format include text.
    pub fn has_text(&self) -> bool {
        match self {
            Self::Svg => true,
            Self::Png => false,
        }
    }
}

/// Where and how figures are written and shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    pub dir: PathBuf,
    pub format: ImageFormat,
    pub viewer: Viewer,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
            format: ImageFormat::default(),
            viewer: Viewer::default(),
        }
    }
}

impl Output {
    /// Returns the path of the figure named `stem` in the output directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    ///
    /// use smallworld::plot::{ImageFormat, Output};
    ///
    /// let output = Output { format: ImageFormat::Png, ..Default::default() };
    /// assert_eq!(output.path_for("small_world"), Path::new("results/small_world.png"));
    /// ```
    pub fn path_for(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.{}", self.format.extension()))
    }
}

/// Creates `dir` and its parents if missing. Calling it on an existing directory is a no-op.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PlotError> {
    fs::create_dir_all(dir).map_err(|source| PlotError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Draws `graph` with a spring layout under `title`.
///
/// With a `filename` stem the figure is saved into the output directory and then shown through
/// the configured viewer; the written path is returned. Without one nothing is drawn, there
/// being nowhere to put the figure.
#[instrument(skip(graph, output, rng), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn visualize_graph<R: Rng>(
    graph: &Graph,
    title: &str,
    filename: Option<&str>,
    output: &Output,
    rng: &mut R,
) -> Result<Option<PathBuf>, PlotError> {
    let Some(stem) = filename else {
        return Ok(None);
    };

    let figure = GraphFigure {
        graph,
        positions: spring_layout(graph, DEFAULT_ITERATIONS, rng),
        title,
    };

    ensure_output_dir(&output.dir)?;
    let path = output.path_for(stem);
    save(&figure, &path, output.format)?;
    info!(path = %path.display(), "graph figure saved");

    output.viewer.show(&path)?;
    Ok(Some(path))
}

/// Plots the clustering and path length series against the rewiring probability, saves the
/// figure as [`SWEEP_FILE_STEM`] in the output directory and shows it.
#[instrument(skip(series, output), fields(samples = series.len()))]
pub fn render_sweep(series: &SweepSeries, output: &Output) -> Result<PathBuf, PlotError> {
    ensure_output_dir(&output.dir)?;
    let path = output.path_for(SWEEP_FILE_STEM);
    save(&SweepFigure { series }, &path, output.format)?;
    info!(path = %path.display(), "sweep figure saved");

    output.viewer.show(&path)?;
    Ok(path)
}

/// Splits a series into runs of consecutive finite points so undefined samples leave a gap in
/// the line.
///
/// # Examples
///
/// ```
/// use smallworld::plot::segments;
///
/// let xs = [0.0, 0.5, 1.0, 1.5];
/// let ys = [1.0, f64::NAN, 2.0, 3.0];
///
/// assert_eq!(segments(&xs, &ys), vec![vec![(0.0, 1.0)], vec![(1.0, 2.0), (1.5, 3.0)]]);
/// ```
pub fn segments(xs: &[f64], ys: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = vec![];
    let mut current = vec![];

    for (&x, &y) in xs.iter().zip(ys) {
        if y.is_finite() {
            current.push((x, y));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

//
// Figures
//

/// Something that can be drawn onto any plotters backend.
trait Figure {
    fn size(&self) -> (u32, u32);

    /// Draws the figure. Without `text` no caption, label or legend is drawn, since the backend
    /// has no font to render them with.
    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        text: bool,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>;
}

struct GraphFigure<'a> {
    graph: &'a Graph,
    positions: Vec<Vector2<f64>>,
    title: &'a str,
}

impl Figure for GraphFigure<'_> {
    fn size(&self) -> (u32, u32) {
        GRAPH_FIGURE_SIZE
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        text: bool,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;

        let mut builder = ChartBuilder::on(root);
        builder.margin(20);
        if text {
            builder.caption(self.title, ("sans-serif", 22));
        }
        // Leave room around the unit square for the node discs.
        let mut chart = builder.build_cartesian_2d(-1.15f64..1.15f64, -1.15f64..1.15f64)?;

        let point = |node: usize| (self.positions[node].x, self.positions[node].y);

        // Sorted so repeated renders of the same graph are identical.
        let mut edges: Vec<&Edge> = self.graph.edges().iter().collect();
        edges.sort_unstable();

        chart.draw_series(edges.into_iter().map(|edge| {
            PathElement::new(
                vec![point(edge.source()), point(edge.target())],
                EDGE_COLOUR.stroke_width(1),
            )
        }))?;

        chart.draw_series(self.graph.nodes().map(|node| {
            Circle::new(point(node), NODE_RADIUS, NODE_COLOUR.filled())
        }))?;

        if text {
            chart.draw_series(self.graph.nodes().map(|node| {
                EmptyElement::at(point(node))
                    + Text::new(node.to_string(), (-5, -6), ("sans-serif", 12).into_font())
            }))?;
        }

        Ok(())
    }
}

struct SweepFigure<'a> {
    series: &'a SweepSeries,
}

impl Figure for SweepFigure<'_> {
    fn size(&self) -> (u32, u32) {
        SWEEP_FIGURE_SIZE
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        text: bool,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;

        let series = self.series;
        let y_max = series
            .clustering
            .iter()
            .chain(&series.path_length)
            .copied()
            .filter(|value| value.is_finite())
            .fold(1.0, f64::max)
            * 1.05;

        let mut builder = ChartBuilder::on(root);
        builder.margin(15);
        if text {
            builder
                .caption("Small-World Network Analysis", ("sans-serif", 24))
                .x_label_area_size(45)
                .y_label_area_size(55);
        }
        let mut chart = builder.build_cartesian_2d(-0.05f64..1.05f64, 0f64..y_max)?;

        // The mesh doubles as the grid.
        let mut mesh = chart.configure_mesh();
        if text {
            mesh.x_desc("Rewiring Probability (p)").y_desc("Metric Value");
        } else {
            // Tick labels are drawn with the axes.
            mesh.disable_axes();
        }
        mesh.draw()?;

        let clustering_style = CLUSTERING_COLOUR.stroke_width(2);
        for segment in segments(&series.probabilities, &series.clustering) {
            chart.draw_series(LineSeries::new(segment, clustering_style))?;
        }
        chart
            .draw_series(
                series
                    .probabilities
                    .iter()
                    .zip(&series.clustering)
                    .filter(|(_, y)| y.is_finite())
                    .map(|(&x, &y)| Circle::new((x, y), MARKER_SIZE, clustering_style.filled())),
            )?
            .label("Clustering Coefficient")
            .legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(-10, 0), (10, 0)], clustering_style)
                    + Circle::new((0, 0), MARKER_SIZE, clustering_style.filled())
            });

        let path_style = PATH_LENGTH_COLOUR.stroke_width(2);
        for segment in segments(&series.probabilities, &series.path_length) {
            chart.draw_series(LineSeries::new(segment, path_style))?;
        }
        chart
            .draw_series(
                series
                    .probabilities
                    .iter()
                    .zip(&series.path_length)
                    .filter(|(_, y)| y.is_finite())
                    .map(|(&x, &y)| {
                        EmptyElement::at((x, y))
                            + Rectangle::new(
                                [(-MARKER_SIZE, -MARKER_SIZE), (MARKER_SIZE, MARKER_SIZE)],
                                path_style.filled(),
                            )
                    }),
            )?
            .label("Average Path Length")
            .legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(-10, 0), (10, 0)], path_style)
                    + Rectangle::new(
                        [(-MARKER_SIZE, -MARKER_SIZE), (MARKER_SIZE, MARKER_SIZE)],
                        path_style.filled(),
                    )
            });

        if text {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        Ok(())
    }
}

//
// Backends
//

fn save<F: Figure>(figure: &F, path: &Path, format: ImageFormat) -> Result<(), PlotError> {
    let size = figure.size();
    let text = format.has_text();

    match format {
        ImageFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            figure.draw(&root, text).map_err(|err| render_error(path, err))?;
            root.present().map_err(|err| render_error(path, err))
        }
        ImageFormat::Png => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            figure.draw(&root, text).map_err(|err| render_error(path, err))?;
            root.present().map_err(|err| render_error(path, err))
        }
    }
}

fn render_error<E: StdError + Send + Sync>(path: &Path, err: DrawingAreaErrorKind<E>) -> PlotError {
    PlotError::Render {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, SeedableRng};
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::generate::generate_small_world_graph;

    fn output(dir: &TempDir, format: ImageFormat) -> Output {
        Output {
            dir: dir.path().join("results"),
            format,
            viewer: Viewer::Headless,
        }
    }

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn series() -> SweepSeries {
        SweepSeries {
            probabilities: vec![0.0, 0.5, 1.0],
            clustering: vec![0.5, 0.2, 0.05],
            path_length: vec![6.6, f64::NAN, 3.1],
        }
    }

    #[test]
    fn ensure_output_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let results = dir.path().join("results");

        ensure_output_dir(&results).unwrap();
        ensure_output_dir(&results).unwrap();

        assert!(results.is_dir());
    }

    #[test]
    fn ensure_output_dir_fails_on_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("occupied");
        fs::write(&file, b"").unwrap();

        assert!(matches!(
            ensure_output_dir(&file),
            Err(PlotError::CreateDir { .. })
        ));
    }

    #[rstest]
    #[case(ImageFormat::Svg, "svg")]
    #[case(ImageFormat::Png, "png")]
    fn extension(#[case] format: ImageFormat, #[case] expected: &str) {
        assert_eq!(format.extension(), expected);
    }

    #[test]
    fn segments_skip_undefined_values() {
        let runs = segments(&[0.0, 1.0, 2.0, 3.0], &[f64::NAN, f64::NAN, 1.0, f64::NAN]);

        assert_eq!(runs, vec![vec![(2.0, 1.0)]]);
        assert!(segments(&[0.0], &[f64::NAN]).is_empty());
    }

    #[rstest]
    #[case(ImageFormat::Svg)]
    #[case(ImageFormat::Png)]
    fn renders_sweep(#[case] format: ImageFormat) {
        let dir = TempDir::new().unwrap();
        let output = output(&dir, format);

        let path = render_sweep(&series(), &output).unwrap();

        assert_eq!(path, output.path_for(SWEEP_FILE_STEM));
        assert!(fs::metadata(&path).unwrap().len() > 0);

        // Rendering again overwrites the figure.
        render_sweep(&series(), &output).unwrap();
    }

    #[rstest]
    #[case(ImageFormat::Svg, true)]
    #[case(ImageFormat::Png, false)]
    fn has_text(#[case] format: ImageFormat, #[case] expected: bool) {
        assert_eq!(format.has_text(), expected);
    }

    #[test]
    fn png_figures_are_encoded_bitmaps() {
        let dir = TempDir::new().unwrap();
        let output = output(&dir, ImageFormat::Png);
        let mut rng = SmallRng::seed_from_u64(4);
        let graph = generate_small_world_graph(10, 4, 0.2, &mut rng).unwrap();

        let sweep = render_sweep(&series(), &output).unwrap();
        let drawn = visualize_graph(&graph, "Small world", Some("small_world"), &output, &mut rng)
            .unwrap()
            .unwrap();

        for path in [sweep, drawn] {
            let bytes = fs::read(&path).unwrap();
            assert!(bytes.starts_with(PNG_SIGNATURE), "{} isn't a PNG", path.display());
            assert!(bytes.len() > PNG_SIGNATURE.len());
        }
    }

    fn draw_without_text<F: Figure>(figure: &F) -> Vec<u8> {
        let (width, height) = figure.size();
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            figure.draw(&root, false).unwrap();
            root.present().unwrap();
        }

        buffer
    }

    #[test]
    fn sweep_draws_without_text() {
        let series = series();
        let buffer = draw_without_text(&SweepFigure { series: &series });

        // Line and marker colours are on the canvas.
        assert!(buffer
            .chunks_exact(3)
            .any(|pixel| pixel == [31, 119, 180]));
        assert!(buffer
            .chunks_exact(3)
            .any(|pixel| pixel == [255, 127, 14]));
    }

    #[test]
    fn graph_draws_without_text() {
        let graph = Graph::complete(5);
        let mut rng = SmallRng::seed_from_u64(2);
        let figure = GraphFigure {
            graph: &graph,
            positions: spring_layout(&graph, DEFAULT_ITERATIONS, &mut rng),
            title: "K5",
        };

        let buffer = draw_without_text(&figure);

        assert!(buffer
            .chunks_exact(3)
            .any(|pixel| pixel == [135, 206, 235]));
    }

    #[rstest]
    #[case(ImageFormat::Svg)]
    #[case(ImageFormat::Png)]
    fn renders_graph(#[case] format: ImageFormat) {
        let dir = TempDir::new().unwrap();
        let output = output(&dir, format);
        let mut rng = SmallRng::seed_from_u64(9);
        let graph = generate_small_world_graph(12, 4, 0.3, &mut rng).unwrap();

        let path = visualize_graph(&graph, "Small world", Some("small_world"), &output, &mut rng)
            .unwrap()
            .unwrap();

        assert_eq!(path, output.dir.join(format!("small_world.{}", format.extension())));
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn svg_contains_labels() {
        let dir = TempDir::new().unwrap();
        let output = output(&dir, ImageFormat::Svg);

        let path = render_sweep(&series(), &output).unwrap();
        let svg = fs::read_to_string(path).unwrap();

        assert!(svg.contains("Small-World Network Analysis"));
        assert!(svg.contains("Clustering Coefficient"));
        assert!(svg.contains("Average Path Length"));
    }

    #[test]
    fn graph_without_filename_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output = output(&dir, ImageFormat::Svg);
        let mut rng = SmallRng::seed_from_u64(9);

        let path = visualize_graph(&Graph::complete(4), "K4", None, &output, &mut rng).unwrap();

        assert_eq!(path, None);
        assert!(!output.dir.exists());
    }
}
