mod config;
mod fetcher;
mod helpers;
mod listing;
mod routes;
mod telemetry;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;

use crate::config::Config;
use crate::fetcher::prismic::PrismicClient;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Could not listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // initialize tracing
    let tracing_config =
        telemetry::tracing_config("TRACING_").context("Failed to load tracing config")?;
    telemetry::initialize_tracing(&tracing_config)?;

    // load config
    let config = envy::from_env::<Config>().context("Failed to load config")?;

    let client = PrismicClient::from_config(&config)?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid HOST or PORT")?;
    let app = routes::app(config, client);

    info!("listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry::shutdown_tracer_provider();
    Ok(())
}
