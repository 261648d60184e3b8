//! dynui-gateway server entry point.
//!
//! Starts the Axum HTTP server with the page and JSON endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::StatusCode;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use dynui_gateway::api;
use dynui_gateway::build_state;
use dynui_gateway::config::{GatewayConfig, LogFormat};
use dynui_gateway::rate_limit::RateLimiter;
use dynui_gateway::upstream::CerebrasClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(addr = %config.listen_addr, models = ?config.models, "starting dynui-gateway");
    if config.api_key.is_none() {
        tracing::warn!("CEREBRAS_API_KEY not set; generation requests will fail");
    }

    // Build upstream client
    let client = CerebrasClient::new(
        &config.upstream_base_url,
        config.api_key.clone(),
        config.upstream_timeout(),
        config.upstream_max_tokens,
    )
    .context("failed to build upstream client")?;

    // Build rate limiter and application state
    let rate_limiter = RateLimiter::from_config(&config).await;
    let app_state = build_state(&config, Arc::new(client), rate_limiter)
        .context("failed to build application state")?;

    // Build router
    let app = api::build_router(app_state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
