//! Serve command - run the HTTP API

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::args::ServeArgs;
use crate::commands::predict::build_services;
use crate::config::AppConfig;
use crate::http::{AppState, build_router};

pub async fn execute(args: ServeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());

    let services = build_services(&config).await?;

    tracing::info!(
        provider = services.pipeline.recommender().provider(),
        locale = %services.pipeline.recommender().locale(),
        recommendations_enabled = services.pipeline.recommendations_enabled(),
        persistence = if services.history.is_durable() { "sqlite" } else { "ephemeral" },
        upload_dir = %config.server.upload_dir.display(),
        "Services ready"
    );

    let state = Arc::new(AppState {
        services,
        max_upload_bytes: config.server.max_upload_bytes,
    });

    let cors = cors_layer(&config.server.allowed_origins)?;
    let router = build_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    let addr = listener.local_addr()?;
    tracing::info!(addr = %addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if allowed_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid origin: {}", origin))
        })
        .collect::<Result<Vec<HeaderValue>>>()?;

    tracing::debug!(origins = ?origins, "Allowed origins");
    Ok(layer.allow_origin(origins))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
