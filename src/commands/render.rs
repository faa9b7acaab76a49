use anyhow::{Context, Result};
use std::path::Path;

use tendencia::config::Config;
use tendencia::export::{decode_csv, encode_png};
use tendencia::flow::PresentSettings;
use tendencia::present::present;

/// Redraw the chart of an exported CSV
pub fn render(config: &Config, csv: &Path, output: &Path) -> Result<()> {
    let bytes =
        std::fs::read(csv).with_context(|| format!("Failed to read CSV file: {}", csv.display()))?;
    let table = decode_csv(&bytes).context("Failed to decode CSV")?;

    let settings = PresentSettings::new(config.chart.clone(), config.locale());
    let keywords = table.columns().to_vec();
    let (_, chart) = present(&table, &keywords, &settings.labels)?;
    let png = encode_png(&chart, &settings.chart).context("Failed to render chart")?;

    std::fs::write(output, &png)
        .with_context(|| format!("Failed to write PNG: {}", output.display()))?;

    tracing::info!(rows = table.len(), series = keywords.len(), "Chart rendered");
    println!("Chart written to {}", output.display());
    Ok(())
}
