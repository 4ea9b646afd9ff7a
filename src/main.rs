use anyhow::Context;
use clap::Parser;
use donate_flash::app::{
    self,
    config::{Cli, Config},
    state::AppState,
};
use donate_flash::services::clock::SystemClock;
use donate_flash::services::{CountdownEngine, OverlayService, OverlayStore, StorePolicy};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli).context("loading configuration")?;
    info!("Starting DonateFlash overlay server on port {}", config.server_port);

    let share_base = Url::parse(&config.base_url())
        .with_context(|| format!("invalid public base url {}", config.base_url()))?;

    let policy = StorePolicy {
        locale: config.locale,
        accepted_methods: config.payment_methods.clone(),
    };
    let store = OverlayStore::new(Arc::new(SystemClock), policy, config.event_buffer_size);
    let overlay_service = Arc::new(OverlayService::new(store, share_base));

    let countdown = CountdownEngine::new(
        overlay_service.clone(),
        Duration::from_millis(config.tick_interval_ms.max(1)),
    )
    .spawn();

    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = Arc::new(AppState::new(overlay_service, config));
    let app = app::router::build(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    countdown.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
