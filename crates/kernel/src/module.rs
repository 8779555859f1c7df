use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// Context handed to modules while the application boots
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

impl<'a> InitCtx<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }
}

/// A schema change contributed by a module.
///
/// `id` must be unique within the owning module; ids are applied in
/// lexicographic order, so prefix them with a zero-padded sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// Contract every bookstore module implements.
///
/// Core modules (storage, identity) and feature modules (books, account)
/// share this trait; the [`ModuleRegistry`](crate::ModuleRegistry) decides
/// the order in which the hooks run.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name, also used as the mount point `/api/{name}`
    fn name(&self) -> &'static str;

    /// Runs once at startup, before migrations are applied
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// HTTP routes of this module, relative to `/api/{name}`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` + `components.schemas`) merged into the
    /// service document
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// SQL migrations owned by this module
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Runs after migrations, right before the server accepts traffic
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Readiness probe used by `/healthz`
    async fn health(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Releases resources during shutdown
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
