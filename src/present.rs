//! Result presentation
//!
//! Restricts the interest table to the requested keywords and describes
//! the line chart drawn from it. Only series membership, order and labels
//! are fixed here; pixels are the export encoder's business.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::i18n::t;
use crate::models::{InterestTable, QueryRequest, RelatedQueries};

/// Errors raised while presenting a result
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PresentError {
    #[error("Keyword column not found in interest table: {0}")]
    MissingColumn(String),
}

/// Localized chart captions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl ChartLabels {
    /// Captions in the given locale (`en` or `es`)
    pub fn for_locale(locale: &str) -> Self {
        Self {
            title: t!("chart.title", locale = locale).to_string(),
            x_label: t!("chart.x_label", locale = locale).to_string(),
            y_label: t!("chart.y_label", locale = locale).to_string(),
        }
    }
}

impl Default for ChartLabels {
    fn default() -> Self {
        Self::for_locale("en")
    }
}

/// One row of the tabular view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRow {
    pub date: NaiveDateTime,
    pub values: Vec<u32>,
}

/// Interest table restricted to the requested keyword columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularView {
    pub columns: Vec<String>,
    pub rows: Vec<ViewRow>,
}

/// One line of the chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<(NaiveDateTime, u32)>,
}

/// Multi-series line chart over a shared date axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartImage {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
}

impl ChartImage {
    /// Legend entries in drawing order
    pub fn series_labels(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.label.as_str()).collect()
    }

    /// Shared date axis
    pub fn dates(&self) -> Vec<NaiveDateTime> {
        self.series
            .first()
            .map(|s| s.points.iter().map(|(d, _)| *d).collect())
            .unwrap_or_default()
    }

    /// Largest value across all series
    pub fn max_value(&self) -> u32 {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|(_, v)| *v))
            .max()
            .unwrap_or(0)
    }
}

/// Build the table view and chart for the requested keywords
///
/// The partial-data marker never becomes a column or a series.
///
/// # Errors
///
/// `PresentError::MissingColumn` if a requested keyword is not a table column.
pub fn present(
    table: &InterestTable,
    keywords: &[String],
    labels: &ChartLabels,
) -> Result<(TabularView, ChartImage), PresentError> {
    let indices = keywords
        .iter()
        .map(|kw| {
            table
                .column_index(kw)
                .ok_or_else(|| PresentError::MissingColumn(kw.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let view = TabularView {
        columns: keywords.to_vec(),
        rows: table
            .rows()
            .iter()
            .map(|row| ViewRow {
                date: row.date,
                values: indices.iter().map(|&i| row.values[i]).collect(),
            })
            .collect(),
    };

    let series = keywords
        .iter()
        .zip(&indices)
        .map(|(kw, &i)| ChartSeries {
            label: kw.clone(),
            points: table.rows().iter().map(|row| (row.date, row.values[i])).collect(),
        })
        .collect();

    let chart = ChartImage {
        title: labels.title.clone(),
        x_label: labels.x_label.clone(),
        y_label: labels.y_label.clone(),
        series,
    };

    tracing::debug!(
        columns = view.columns.len(),
        rows = view.rows.len(),
        "Presented interest table"
    );
    Ok((view, chart))
}

// ============================================================================
// Plain text
// ============================================================================

/// Header shown before a query runs
pub fn request_text(request: &QueryRequest, locale: &str) -> String {
    format!(
        "{}\n{:=<32}\n  Keywords: {}\n  Geo: {}\n  Timeframe: {}\n",
        t!("app.title", locale = locale),
        "",
        request.keywords.join(", "),
        request.geo,
        request.timeframe
    )
}

/// Fixed-width table of the view, one line per date
pub fn table_text(view: &TabularView, locale: &str) -> String {
    let widths: Vec<usize> = view.columns.iter().map(|c| c.chars().count().max(5)).collect();

    let mut out = format!("{}\n", t!("table.heading", locale = locale));
    out.push_str(&format!("{:<19}", t!("table.date", locale = locale)));
    for (column, width) in view.columns.iter().zip(&widths) {
        out.push_str(&format!("  {column:>width$}"));
    }
    out.push('\n');

    for row in &view.rows {
        out.push_str(&format!("{:<19}", row.date.format("%Y-%m-%d %H:%M")));
        for (value, width) in row.values.iter().zip(&widths) {
            out.push_str(&format!("  {value:>width$}"));
        }
        out.push('\n');
    }
    out
}

/// Ranked related queries per keyword, or the "none found" notice
pub fn related_text(related: &RelatedQueries, locale: &str) -> String {
    let mut out = format!("{}\n", t!("related.heading", locale = locale));

    if related.is_empty() {
        out.push_str(&format!("  {}\n", t!("related.none", locale = locale)));
    }

    for entry in related.iter() {
        out.push_str(&format!(
            "  {}\n",
            t!("related.keyword", locale = locale, keyword = entry.keyword)
        ));
        for (i, ranked) in entry.top.iter().enumerate() {
            out.push_str(&format!("  {:>2}. {} ({})\n", i + 1, ranked.query, ranked.value));
        }
    }
    out
}
