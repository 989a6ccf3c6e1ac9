/*
 * Uniswap Trader - swap execution service
 * Main entry point for the application
 */

use anyhow::Context;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uniswap_trader::{
    api,
    config::{Config, LogFormat},
    metrics::SwapMetrics,
    service::SwapEngine,
};

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing(&config);

    info!("Starting Uniswap Trader");
    info!(chain_id = config.chain.chain_id, "Configuration loaded successfully");

    let metrics = Arc::new(SwapMetrics::new()?);
    let engine = SwapEngine::connect(&config, metrics.clone())
        .await
        .map_err(|e| {
            error!("Failed to initialize swap engine: {}", e);
            e
        })?
        .with_cancellation(shutdown_signal());

    let api_state = api::ApiState {
        engine: Arc::new(engine),
        metrics,
    };

    info!("Starting API server on {}:{}", config.server.host, config.server.port);

    let figment = rocket::Config::figment()
        .merge(("address", config.server.host.clone()))
        .merge(("port", config.server.port));

    api::create_rocket(api_state)
        .configure(figment)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("API server failed: {e}"))?;

    Ok(())
}

/// Flips to `true` on Ctrl-C so in-flight receipt waits end as `Failed`.
fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested, abandoning pending receipt waits");
            let _ = tx.send(true);
        }
    });
    rx
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("uniswap_trader={}", config.server.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
