use anyhow::{Context, Result};
use std::sync::Arc;

use tendencia::config::Config;
use tendencia::dashboard::{DashboardConfig, DashboardServer};
use tendencia::trends::GoogleTrendsClient;

/// Start the dashboard until Ctrl+C
pub async fn serve(config: &Config, bind: Option<String>) -> Result<()> {
    let mut dashboard = DashboardConfig::from(config);
    if let Some(addr) = bind {
        dashboard.bind_address = addr
            .parse()
            .with_context(|| format!("Invalid bind address: {addr}"))?;
    }

    let client =
        GoogleTrendsClient::from_config(&config.trends).context("Failed to create trends client")?;
    let server =
        DashboardServer::new(dashboard, Arc::new(client)).context("Failed to create dashboard")?;

    println!("{}", server.info().display());
    println!();
    println!("Endpoints:");
    println!("  GET  /                          - Query form");
    println!("  POST /query                     - Submit a query");
    println!("  GET  /download/tendencias.png   - Last chart");
    println!("  GET  /download/tendencias.csv   - Last table");
    println!("  POST /api/query                 - Submit a query (JSON)");
    println!("  GET  /api/health                - Health check");
    println!();
    println!("Press Ctrl+C to stop.\n");

    server
        .start_with_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                }
                Err(e) => {
                    tracing::error!("Failed to wait for Ctrl+C: {}", e);
                }
            }
        })
        .await?;

    println!("Dashboard stopped.");
    Ok(())
}
