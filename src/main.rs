use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tendencia::config::Config;
use tendencia::models::{Country, Timeframe};

mod commands;

#[derive(Parser)]
#[command(
    name = "tendencia",
    version,
    about = "Search interest dashboard backed by Google Trends",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Configuration file (TOML); environment variables are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one trends query and write the chart and CSV
    Query {
        /// Comma-separated keywords, at most five are used
        #[arg(short, long, default_value = tendencia::normalize::DEFAULT_KEYWORDS)]
        keywords: String,

        /// Country code
        #[arg(long, default_value = "MX")]
        country: Country,

        /// Time range (now 7-d, today 3-m, today 12-m, today 5-y)
        #[arg(short, long, default_value = "now 7-d")]
        timeframe: Timeframe,

        /// Region code overriding the country, e.g. MX-CMX
        #[arg(short, long, default_value = "")]
        region: String,

        /// Directory receiving tendencias.png and tendencias.csv
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Start the web dashboard
    Serve {
        /// Address to listen on, overrides the configuration
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Draw the chart of a previously downloaded CSV
    Render {
        /// CSV file written by `query` or the dashboard
        #[arg(long)]
        csv: PathBuf,

        /// Output PNG path
        #[arg(short, long, default_value = "tendencias.png")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    // Initialize tracing/logging
    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    tracing::info!(locale = config.locale(), "tendencia starting");

    match cli.command {
        Commands::Query {
            keywords,
            country,
            timeframe,
            region,
            output_dir,
        } => {
            tracing::info!(
                keywords = %keywords,
                country = %country,
                timeframe = %timeframe,
                region = %region,
                "Starting query command"
            );
            commands::query(
                &config,
                commands::QueryParams {
                    keywords,
                    country,
                    timeframe,
                    region,
                    output_dir,
                },
            )
            .await?;
        }

        Commands::Serve { bind } => {
            tracing::info!(bind = ?bind, "Starting serve command");
            commands::serve(&config, bind).await?;
        }

        Commands::Render { csv, output } => {
            tracing::info!(
                csv = %csv.display(),
                output = %output.display(),
                "Starting render command"
            );
            commands::render(&config, &csv, &output)?;
        }
    }

    tracing::info!("tendencia completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("tendencia=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("tendencia={level},warn")))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
