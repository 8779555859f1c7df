use async_trait::async_trait;
use bookstore_kernel::{InitCtx, Module};

use crate::Database;

/// Core module owning the storage handle: probes it for `/healthz` and
/// closes the pool on shutdown.
pub struct DatabaseModule {
    database: Database,
}

impl DatabaseModule {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Module for DatabaseModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.database.ping().await?;
        tracing::info!(
            module = self.name(),
            backend = self.database.backend_name(),
            environment = ?ctx.settings.environment,
            "database module initialized"
        );
        Ok(())
    }

    async fn health(&self) -> anyhow::Result<()> {
        self.database.ping().await
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.database.close().await;
        tracing::info!(module = self.name(), "database module stopped");
        Ok(())
    }
}
