//! Export encoders: chart to PNG, interest table to CSV
//!
//! Both encoders are pure functions of their input and return bytes; handing
//! the bytes to a user (HTTP download, file on disk) is left to the caller.
//!
//! The chart is rasterized with plotters' bitmap backend into an RGB buffer
//! and PNG-encoded with `image`. Text needs a TrueType font registered with
//! plotters; without one the chart is drawn as bare series lines.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{NaiveDateTime, Timelike};
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::FontStyle;
use thiserror::Error;

use crate::config::ChartConfig;
use crate::i18n::t;
use crate::models::{InterestRow, InterestTable, PARTIAL_COLUMN};
use crate::present::ChartImage;

/// File name of the chart download
pub const PNG_FILENAME: &str = "tendencias.png";
pub const PNG_MIME: &str = "image/png";

/// File name of the data download
pub const CSV_FILENAME: &str = "tendencias.csv";
pub const CSV_MIME: &str = "text/csv";

/// Header of the date index column
pub const DATE_COLUMN: &str = "date";

const DAY_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Family name fonts are registered under
const FONT_FAMILY: &str = "sans-serif";

/// Fallback font locations, tried in order when none is configured
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Line colors, one per keyword (at most five keywords per query)
const SERIES_COLORS: [RGBColor; 5] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
];

/// Errors raised while encoding exports
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Chart rendering failed: {0}")]
    Render(String),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid CSV: {0}")]
    InvalidCsv(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn render_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> ExportError {
    ExportError::Render(err.to_string())
}

/// A file offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Localized button/link label
    pub label: String,
    pub filename: &'static str,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn png(bytes: Vec<u8>, locale: &str) -> Self {
        Self {
            label: t!("download.png", locale = locale).to_string(),
            filename: PNG_FILENAME,
            mime: PNG_MIME,
            bytes,
        }
    }

    pub fn csv(bytes: Vec<u8>, locale: &str) -> Self {
        Self {
            label: t!("download.csv", locale = locale).to_string(),
            filename: CSV_FILENAME,
            mime: CSV_MIME,
            bytes,
        }
    }

    /// Write the download into a directory under its file name
    pub fn save(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

// ============================================================================
// PNG
// ============================================================================

/// Font lookup result, remembered per configured path
#[derive(Debug, Default)]
struct FontCache {
    resolved: Option<(Option<PathBuf>, bool)>,
}

impl FontCache {
    /// Run `load` only when the configured path differs from the last one
    fn resolve(
        &mut self,
        configured: Option<&Path>,
        load: impl FnOnce(Option<&Path>) -> bool,
    ) -> bool {
        match &self.resolved {
            Some((path, ready)) if path.as_deref() == configured => *ready,
            _ => {
                let ready = load(configured);
                self.resolved = Some((configured.map(Path::to_path_buf), ready));
                ready
            }
        }
    }
}

static FONTS: Mutex<FontCache> = Mutex::new(FontCache { resolved: None });

/// Make sure a TrueType font is registered with plotters
///
/// The lookup is repeated whenever the configured font path changes.
/// Returns whether text can be drawn.
fn ensure_font(configured: Option<&Path>) -> bool {
    let mut fonts = FONTS.lock().unwrap_or_else(PoisonError::into_inner);
    fonts.resolve(configured, load_font)
}

/// Register the first readable font: the configured one, then the fallbacks
fn load_font(configured: Option<&Path>) -> bool {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(FONT_CANDIDATES.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        // plotters keeps registered fonts for the life of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        if plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok() {
            tracing::info!(font = %path.display(), "Registered chart font");
            return true;
        }
        tracing::warn!(font = %path.display(), "Unusable chart font");
    }

    tracing::warn!("No TrueType font found, charts are drawn without text");
    false
}

/// Date format for axis ticks: time of day only matters for hourly data
fn axis_date_format(dates: &[NaiveDateTime]) -> &'static str {
    if dates.iter().all(|d| d.hour() == 0 && d.minute() == 0) {
        DAY_FORMAT
    } else {
        "%m-%d %H:%M"
    }
}

/// Render the chart to PNG bytes
///
/// # Errors
///
/// `ExportError::Render` if drawing fails, `ExportError::Image` if PNG
/// encoding fails.
pub fn encode_png(chart: &ChartImage, style: &ChartConfig) -> Result<Vec<u8>, ExportError> {
    let (width, height) = (style.width, style.height);
    let with_text = ensure_font(style.font_path.as_deref());
    let mut buffer = vec![255u8; width as usize * height as usize * 3];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_chart(&root, chart, with_text)?;
        root.present().map_err(render_error)?;
    }

    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| ExportError::Render("pixel buffer size mismatch".to_string()))?;
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;

    let bytes = png.into_inner();
    tracing::debug!(width, height, bytes = bytes.len(), with_text, "Encoded chart PNG");
    Ok(bytes)
}

fn draw_chart(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    chart: &ChartImage,
    with_text: bool,
) -> Result<(), ExportError> {
    root.fill(&WHITE).map_err(render_error)?;

    let dates = chart.dates();
    let x_max = dates.len().saturating_sub(1).max(1) as f64;
    let y_max = f64::from(chart.max_value().max(100));

    let mut builder = ChartBuilder::on(root);
    builder.margin(20);
    if with_text {
        builder
            .caption(&chart.title, (FONT_FAMILY, 24).into_font())
            .x_label_area_size(45)
            .y_label_area_size(55);
    }
    let mut ctx = builder
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)
        .map_err(render_error)?;

    if with_text {
        let date_format = axis_date_format(&dates);
        let formatter = |x: &f64| {
            let idx = x.round().max(0.0) as usize;
            dates
                .get(idx)
                .map(|d| d.format(date_format).to_string())
                .unwrap_or_default()
        };

        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_labels(6)
            .y_labels(6)
            .x_label_formatter(&formatter)
            .axis_desc_style((FONT_FAMILY, 16))
            .label_style((FONT_FAMILY, 12))
            .draw()
            .map_err(render_error)?;
    }

    for (idx, series) in chart.series.iter().enumerate() {
        let color = SERIES_COLORS[idx % SERIES_COLORS.len()];
        let points = series
            .points
            .iter()
            .enumerate()
            .map(|(i, (_, value))| (i as f64, f64::from(*value)));

        let anno = ctx
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(render_error)?;
        if with_text {
            anno.label(series.label.as_str()).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        }
    }

    if with_text && !chart.series.is_empty() {
        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font((FONT_FAMILY, 14))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_error)?;
    }

    Ok(())
}

// ============================================================================
// CSV
// ============================================================================

/// Date format for the CSV index: time of day only when some row has one
fn csv_date_format(table: &InterestTable) -> &'static str {
    let all_midnight = table
        .rows()
        .iter()
        .all(|r| r.date.num_seconds_from_midnight() == 0);
    if all_midnight {
        DAY_FORMAT
    } else {
        DATETIME_FORMAT
    }
}

/// Serialize the full interest table (date index first, partial marker last)
///
/// # Errors
///
/// `ExportError::Csv` or `ExportError::Io` if writing fails.
pub fn encode_csv(table: &InterestTable) -> Result<Vec<u8>, ExportError> {
    let date_format = csv_date_format(table);
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = Vec::with_capacity(table.columns().len() + 2);
    header.push(DATE_COLUMN);
    header.extend(table.columns().iter().map(String::as_str));
    header.push(PARTIAL_COLUMN);
    writer.write_record(&header)?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(row.values.len() + 2);
        record.push(row.date.format(date_format).to_string());
        record.extend(row.values.iter().map(u32::to_string));
        record.push(if row.is_partial { "True" } else { "False" }.to_string());
        writer.write_record(&record)?;
    }

    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

fn parse_date(field: &str) -> Result<NaiveDateTime, ExportError> {
    NaiveDateTime::parse_from_str(field, DATETIME_FORMAT)
        .or_else(|_| {
            chrono::NaiveDate::parse_from_str(field, DAY_FORMAT)
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|_| ExportError::InvalidCsv(format!("invalid date: {field}")))
}

fn parse_partial(field: &str) -> Result<bool, ExportError> {
    match field {
        "True" | "true" => Ok(true),
        "False" | "false" => Ok(false),
        other => Err(ExportError::InvalidCsv(format!("invalid {PARTIAL_COLUMN} value: {other}"))),
    }
}

/// Decode bytes produced by [`encode_csv`] back into an interest table
///
/// # Errors
///
/// `ExportError::InvalidCsv` when the header or a field does not match the
/// exported layout, `ExportError::Csv` on malformed CSV.
pub fn decode_csv(bytes: &[u8]) -> Result<InterestTable, ExportError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes);

    let headers = reader.headers()?.clone();
    let width = headers.len();
    if width < 2 || headers.get(0) != Some(DATE_COLUMN) || headers.get(width - 1) != Some(PARTIAL_COLUMN) {
        return Err(ExportError::InvalidCsv(format!(
            "expected header `{DATE_COLUMN},...,{PARTIAL_COLUMN}`"
        )));
    }
    let columns: Vec<String> = headers.iter().skip(1).take(width - 2).map(String::from).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let values = record
            .iter()
            .skip(1)
            .take(width - 2)
            .map(|v| {
                v.parse::<u32>()
                    .map_err(|_| ExportError::InvalidCsv(format!("invalid value: {v}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        rows.push(InterestRow {
            date: parse_date(&record[0])?,
            values,
            is_partial: parse_partial(&record[width - 1])?,
        });
    }

    InterestTable::from_rows(columns, rows).map_err(|e| ExportError::InvalidCsv(e.to_string()))
}
