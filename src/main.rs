//! Fraud Risk Scoring - Main Entry Point
//!
//! Loads the classifier once, then serves `POST /analyze-risk` over HTTP.

use anyhow::{Context, Result};
use fraud_risk_scoring::{
    config::{AppConfig, LoggingConfig},
    currency::ExchangeRateTable,
    metrics::MetricsReporter,
    models::inference::ClassifierAdapter,
    pipeline::RiskScorer,
    server::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("Starting Fraud Risk Scoring service");

    let rates = Arc::new(ExchangeRateTable::from_rates(config.rates.clone())?);
    info!(currencies = config.rates.len(), "Exchange rate table loaded");

    let classifier = ClassifierAdapter::load(&config.model);
    if !classifier.is_available() {
        warn!("Running without a classifier; scores will not reflect fraud risk");
    }

    let scorer = RiskScorer::new(rates, classifier);
    let state = AppState::new(scorer);
    let metrics = state.metrics.clone();

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let app = create_router(state, Some(Path::new(&config.server.static_dir)));

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Service shutting down...");
    metrics.print_summary();

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!(
            "fraud_risk_scoring={level},tower_http={level}",
            level = logging.level
        ))
        .context("Invalid logging level")?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
