/// Main application entry point
mod clients;
mod config;
mod domain;
mod errors;
mod handlers;
mod middleware;
mod repo;
mod routes;
mod services;
mod utils;
mod validation;

use crate::config::{AppConfig, TextBackend};
use crate::handlers::AppState;
use crate::routes::build_router;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // Load configuration
    let config = AppConfig::from_env()?;
    info!(environment = %config.environment, "Configuration loaded successfully");
    log_upstreams(&config);

    let port = config.port;
    let state = AppState::from_config(config)?;
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Fake News Detection API listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

fn log_upstreams(config: &AppConfig) {
    match config.text_backend {
        TextBackend::Microservice => info!("Text service: {}/predict", config.text_service_url),
        TextBackend::RapidApi => info!(
            key_configured = !config.rapidapi.api_key.is_empty(),
            "Text service: RapidAPI {}",
            config.rapidapi.url
        ),
    }
    info!("Image service: {}/predict", config.image_service_url);
    info!("Video service: {}/predict", config.video_service_url);
    info!(origin = ?config.cors_origin, "CORS origin");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        _ = terminate => info!("SIGTERM received, shutting down gracefully"),
    }
}
