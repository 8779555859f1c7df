//! HTTP server facade for the bookstore: Axum router, middleware, error
//! envelope, bearer-token guard and OpenAPI document.

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};

use bookstore_kernel::{settings::Settings, ModuleRegistry};

pub mod auth;
pub mod error;
pub mod extract;
pub mod router;

use error::AppError;
use router::RouterBuilder;

/// Bind, serve until Ctrl-C / SIGTERM, then return so the caller can stop
/// modules.
pub async fn start_server(registry: Arc<ModuleRegistry>, settings: &Settings) -> anyhow::Result<()> {
    let app = build_router(registry, settings);

    let address = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {address}"))?;

    tracing::info!("HTTP server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server drained");
    Ok(())
}

/// Main router: health probe, every module under `/api/{name}`, OpenAPI,
/// then the middleware stack.
pub fn build_router(registry: Arc<ModuleRegistry>, settings: &Settings) -> Router {
    let mut router_builder = RouterBuilder::new();

    let probe = registry.clone();
    router_builder = router_builder.route(
        "/healthz",
        get(move || {
            let registry = probe.clone();
            async move { health_check(&registry).await }
        }),
    );

    for module in registry.modules() {
        tracing::info!(
            module = module.name(),
            "mounting module routes under /api/{}",
            module.name()
        );
        router_builder = router_builder.mount_module(module.name(), module.routes());
    }

    router_builder
        .with_openapi(&registry)
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms)
        .build()
}

async fn health_check(registry: &ModuleRegistry) -> Result<&'static str, AppError> {
    let failing = registry.unhealthy_modules().await;
    if failing.is_empty() {
        Ok("ok")
    } else {
        Err(AppError::unavailable(format!(
            "unhealthy modules: {}",
            failing.join(", ")
        )))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
