use anyhow::{Context, Result};
use std::path::PathBuf;

use tendencia::config::Config;
use tendencia::flow::{submit, PresentSettings, SubmissionOutcome};
use tendencia::models::{Country, Timeframe};
use tendencia::normalize::QueryForm;
use tendencia::present::request_text;
use tendencia::trends::GoogleTrendsClient;

/// Arguments of the `query` command
pub struct QueryParams {
    pub keywords: String,
    pub country: Country,
    pub timeframe: Timeframe,
    pub region: String,
    pub output_dir: PathBuf,
}

pub async fn query(config: &Config, params: QueryParams) -> Result<()> {
    let QueryParams {
        keywords,
        country,
        timeframe,
        region,
        output_dir,
    } = params;

    let locale = config.locale();
    let client =
        GoogleTrendsClient::from_config(&config.trends).context("Failed to create trends client")?;
    let settings = PresentSettings::new(config.chart.clone(), locale);

    let form = QueryForm {
        keywords,
        country,
        timeframe,
        region,
    };
    let request = form.to_request();

    println!("{}", request_text(&request, locale));

    let report = submit(&client, &form, &settings).await;
    tracing::debug!(transitions = ?report.transitions, "Submission finished");

    match report.outcome {
        SubmissionOutcome::NoData { message, .. } => {
            println!("{message}");
            Ok(())
        }
        SubmissionOutcome::Failed { message, .. } => anyhow::bail!(message),
        SubmissionOutcome::Presented(presentation) => {
            std::fs::create_dir_all(&output_dir).with_context(|| {
                format!("Failed to create output directory: {}", output_dir.display())
            })?;
            for download in [&presentation.png, &presentation.csv] {
                let path = download
                    .save(&output_dir)
                    .with_context(|| format!("Failed to write {}", download.filename))?;
                println!("{}: {}", download.label, path.display());
            }

            println!();
            print!("{}", presentation.to_text(locale));
            Ok(())
        }
    }
}
