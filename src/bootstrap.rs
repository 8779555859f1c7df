//! Wires settings, storage and modules into a runnable application.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookstore_authz::{IdentityModule, IdentityProvider, PasswordPolicy, TokenService};
use bookstore_db::{Database, DatabaseModule};
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

pub struct Application {
    settings: Settings,
    database: Database,
    registry: Arc<ModuleRegistry>,
}

impl Application {
    /// Connect to the configured backend and register every module
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let database = Database::connect(&settings.database)
            .await
            .context("failed to open the database")?;
        Ok(Self::assemble(settings, database))
    }

    /// Register every module against an already opened database
    pub fn assemble(settings: Settings, database: Database) -> Self {
        let tokens = TokenService::new(&settings.auth);
        let identity = IdentityProvider::new(
            database.users(),
            tokens,
            PasswordPolicy::from(settings.auth.password.clone()),
        );

        let mut registry = ModuleRegistry::new();
        registry.register_core(Arc::new(DatabaseModule::new(database.clone())));
        registry.register_core(Arc::new(IdentityModule));
        modules::register_all(&mut registry, &settings, &database, &identity);

        tracing::debug!(
            core = registry.core_module_count(),
            custom = registry.custom_module_count(),
            "modules registered"
        );

        Self {
            settings,
            database,
            registry: Arc::new(registry),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> Arc<ModuleRegistry> {
        self.registry.clone()
    }

    /// The full HTTP router, middleware included
    pub fn router(&self) -> Router {
        bookstore_http::build_router(self.registry.clone(), &self.settings)
    }

    /// Apply pending module migrations; returns how many ran
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        let migrations = self.registry.collect_migrations();
        let applied = self
            .database
            .migrate(&migrations)
            .await
            .context("failed to apply migrations")?;
        tracing::info!(
            backend = self.database.backend_name(),
            available = migrations.len(),
            applied,
            "migrations complete"
        );
        Ok(applied)
    }

    /// Init, migrate, start, serve until a shutdown signal, then stop every
    /// module.
    pub async fn serve(self) -> anyhow::Result<()> {
        let ctx = InitCtx::new(&self.settings);
        self.registry.init_all(&ctx).await?;
        self.migrate().await?;
        self.registry.start_all(&ctx).await?;

        let served = bookstore_http::start_server(self.registry.clone(), &self.settings).await;
        let stopped = self.registry.stop_all().await;

        served?;
        stopped?;
        tracing::info!("bookstore stopped");
        Ok(())
    }
}
