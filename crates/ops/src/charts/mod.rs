//! Bar charts rendered to standalone SVG files.
//!
//! A [`BarChart`] is plain data; [`BarChart::render`] lays it out on a fixed
//! canvas and fills the `charts/bar_chart.svg` template. [`ChartWriter`]
//! saves the result under the configured chart directory.

use std::path::{Path, PathBuf};

use askama::Template;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors that can occur while producing a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    /// Template rendering error.
    #[error("template error: {0}")]
    Render(#[from] askama::Error),

    /// The SVG could not be written.
    #[error("failed to write chart: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Model
// =============================================================================

/// How multiple series share a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Series side by side.
    Grouped,
    /// Series on top of each other, first series at the bottom.
    Stacked,
}

/// One named, coloured run of values, one per category.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: String,
    pub values: Vec<f64>,
}

impl Series {
    #[must_use]
    pub fn new(name: impl Into<String>, color: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            values,
        }
    }
}

/// A bar chart over labelled categories.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub layout: Layout,
}

impl BarChart {
    #[must_use]
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            categories: Vec::new(),
            series: Vec::new(),
            layout: Layout::Grouped,
        }
    }

    #[must_use]
    pub fn categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    #[must_use]
    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    #[must_use]
    pub const fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Render the chart as an SVG document.
    ///
    /// # Errors
    ///
    /// Returns `ChartError::Render` if the template fails.
    pub fn render(&self) -> Result<String, ChartError> {
        Ok(self.layout_svg().render()?)
    }

    /// Largest value the y axis must reach. Negative values draw as empty
    /// bars.
    fn data_max(&self) -> f64 {
        let value = |s: &Series, i: usize| s.values.get(i).copied().unwrap_or(0.0).max(0.0);
        (0..self.categories.len())
            .map(|i| match self.layout {
                Layout::Grouped => self.series.iter().map(|s| value(s, i)).fold(0.0, f64::max),
                Layout::Stacked => self.series.iter().map(|s| value(s, i)).sum(),
            })
            .fold(0.0, f64::max)
    }

    fn layout_svg(&self) -> BarChartSvg<'_> {
        let y_max = nice_max(self.data_max());
        let plot_bottom = TOP + PLOT_HEIGHT;
        let scale = |v: f64| v.max(0.0) / y_max * PLOT_HEIGHT;

        let ticks = (0..=TICK_INTERVALS)
            .map(|i| {
                let value = y_max * f64::from(i) / f64::from(TICK_INTERVALS);
                Tick {
                    y: round1(plot_bottom - scale(value)),
                    label: format_tick(value),
                }
            })
            .collect();

        let band = if self.categories.is_empty() {
            PLOT_WIDTH
        } else {
            PLOT_WIDTH / count(self.categories.len())
        };
        let series_count = self.series.len().max(1);

        let mut bars = Vec::new();
        let mut labels = Vec::with_capacity(self.categories.len());
        for (i, category) in self.categories.iter().enumerate() {
            let band_left = LEFT + band * count(i);
            let inner_left = band_left + band * BAND_PADDING;
            let inner_width = band * (1.0 - 2.0 * BAND_PADDING);

            let mut stacked_top = plot_bottom;
            for (s, series) in self.series.iter().enumerate() {
                let value = series.values.get(i).copied().unwrap_or(0.0);
                let height = scale(value);
                let (x, width, y) = match self.layout {
                    Layout::Grouped => {
                        let width = inner_width / count(series_count);
                        (inner_left + width * count(s), width, plot_bottom - height)
                    }
                    Layout::Stacked => {
                        stacked_top -= height;
                        (inner_left, inner_width, stacked_top)
                    }
                };
                bars.push(Bar {
                    x: round1(x),
                    y: round1(y),
                    width: round1(width),
                    height: round1(height),
                    color: &series.color,
                    tooltip: format!("{category} / {}: {}", series.name, format_tick(value)),
                });
            }

            labels.push(CategoryLabel {
                x: round1(band_left + band / 2.0),
                y: round1(plot_bottom + 12.0),
                text: category,
            });
        }

        let legend = self
            .series
            .iter()
            .enumerate()
            .map(|(i, s)| LegendEntry {
                y: round1(TOP + 20.0 * count(i)),
                color: &s.color,
                name: &s.name,
            })
            .collect();

        BarChartSvg {
            width: WIDTH,
            height: HEIGHT,
            title: &self.title,
            x_label: &self.x_label,
            y_label: &self.y_label,
            plot_left: LEFT,
            plot_right: LEFT + PLOT_WIDTH,
            plot_top: TOP,
            plot_bottom,
            title_x: round1(LEFT + PLOT_WIDTH / 2.0),
            x_label_y: HEIGHT - 16.0,
            y_label_y: round1(TOP + PLOT_HEIGHT / 2.0),
            legend_x: LEFT + PLOT_WIDTH + 20.0,
            ticks,
            bars,
            labels,
            legend,
        }
    }
}

// =============================================================================
// Geometry
// =============================================================================

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 680.0;
const LEFT: f64 = 90.0;
const TOP: f64 = 60.0;
const PLOT_WIDTH: f64 = 700.0;
const PLOT_HEIGHT: f64 = 440.0;
/// Fraction of each category band left empty on either side.
const BAND_PADDING: f64 = 0.1;
const TICK_INTERVALS: u8 = 4;

/// Round an axis maximum up to 1, 2, 2.5 or 5 times a power of ten. Empty or
/// non-positive data gets an axis up to 1.
fn nice_max(max: f64) -> f64 {
    if !max.is_finite() || max <= 0.0 {
        return 1.0;
    }
    #[allow(clippy::cast_possible_truncation)]
    let magnitude = 10_f64.powi(max.log10().floor() as i32);
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .map(|step| step * magnitude)
        .find(|candidate| *candidate >= max)
        .unwrap_or(10.0 * magnitude)
}

#[allow(clippy::cast_precision_loss)]
fn count(n: usize) -> f64 {
    n as f64
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        let s = format!("{value:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

// =============================================================================
// Template
// =============================================================================

struct Tick {
    y: f64,
    label: String,
}

struct Bar<'a> {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    color: &'a str,
    tooltip: String,
}

struct CategoryLabel<'a> {
    x: f64,
    y: f64,
    text: &'a str,
}

struct LegendEntry<'a> {
    y: f64,
    color: &'a str,
    name: &'a str,
}

#[derive(Template)]
#[template(path = "charts/bar_chart.svg", escape = "html")]
struct BarChartSvg<'a> {
    width: f64,
    height: f64,
    title: &'a str,
    x_label: &'a str,
    y_label: &'a str,
    plot_left: f64,
    plot_right: f64,
    plot_top: f64,
    plot_bottom: f64,
    title_x: f64,
    x_label_y: f64,
    y_label_y: f64,
    legend_x: f64,
    ticks: Vec<Tick>,
    bars: Vec<Bar<'a>>,
    labels: Vec<CategoryLabel<'a>>,
    legend: Vec<LegendEntry<'a>>,
}

// =============================================================================
// Writer
// =============================================================================

/// Writes rendered charts into one directory.
#[derive(Debug, Clone)]
pub struct ChartWriter {
    dir: PathBuf,
}

impl ChartWriter {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render `chart` and write it to `<dir>/<file_stem>.svg`, creating the
    /// directory if needed. Returns the written path.
    ///
    /// # Errors
    ///
    /// Returns `ChartError::Render` if rendering fails, `ChartError::Io` if
    /// the file cannot be written.
    #[instrument(skip(self, chart), fields(dir = %self.dir.display()))]
    pub async fn write(&self, chart: &BarChart, file_stem: &str) -> Result<PathBuf, ChartError> {
        let svg = chart.render()?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{}.svg", sanitize_stem(file_stem)));
        tokio::fs::write(&path, svg).await?;
        debug!(path = %path.display(), "Chart written");
        Ok(path)
    }
}

/// Keep ASCII alphanumerics, `-` and `_`; replace everything else with `_`.
fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "chart".to_string() } else { cleaned }
}
