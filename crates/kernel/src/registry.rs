use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Migration, Module};

/// Core modules are brought up in this order and torn down in reverse.
/// Feature modules always run after every core module.
const CORE_MODULE_ORDER: &[&str] = &[
    "db",    // Storage backend
    "authz", // Identity provider, needs the user store
];

/// A migration tagged with the module that owns it
#[derive(Debug, Clone)]
pub struct ModuleMigration {
    pub module: &'static str,
    pub migration: Migration,
}

/// Holds every registered module and drives their lifecycle
#[derive(Default)]
pub struct ModuleRegistry {
    core_modules: Vec<Arc<dyn Module>>,
    custom_modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an infrastructure module (see [`CORE_MODULE_ORDER`])
    pub fn register_core(&mut self, module: Arc<dyn Module>) {
        if !CORE_MODULE_ORDER.contains(&module.name()) {
            tracing::warn!(
                module = module.name(),
                "core module is not listed in the boot order and will never be initialized"
            );
        }
        self.core_modules.push(module);
    }

    /// Register a feature module
    pub fn register_custom(&mut self, module: Arc<dyn Module>) {
        self.custom_modules.push(module);
    }

    /// All modules, core first
    pub fn modules(&self) -> impl Iterator<Item = &Arc<dyn Module>> {
        self.core_modules.iter().chain(self.custom_modules.iter())
    }

    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules().find(|module| module.name() == name)
    }

    pub fn core_module_count(&self) -> usize {
        self.core_modules.len()
    }

    pub fn custom_module_count(&self) -> usize {
        self.custom_modules.len()
    }

    fn ordered_core(&self) -> impl DoubleEndedIterator<Item = &Arc<dyn Module>> {
        CORE_MODULE_ORDER.iter().filter_map(|&name| {
            self.core_modules
                .iter()
                .find(|module| module.name() == name)
        })
    }

    /// Run `init` on core modules, then on feature modules
    pub async fn init_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in self.ordered_core().chain(self.custom_modules.iter()) {
            tracing::info!(module = module.name(), "initializing module");
            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }
        Ok(())
    }

    /// Run `start` on core modules, then on feature modules
    pub async fn start_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in self.ordered_core().chain(self.custom_modules.iter()) {
            tracing::info!(module = module.name(), "starting module");
            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }
        Ok(())
    }

    /// Stop feature modules (reverse registration order), then core
    /// modules (reverse boot order). Every module is stopped even if an
    /// earlier one fails; the first error is returned.
    pub async fn stop_all(&self) -> anyhow::Result<()> {
        let mut first_error = None;

        for module in self
            .custom_modules
            .iter()
            .rev()
            .chain(self.ordered_core().rev())
        {
            tracing::info!(module = module.name(), "stopping module");
            if let Err(err) = module.stop().await {
                tracing::error!(module = module.name(), error = %err, "module failed to stop");
                first_error
                    .get_or_insert(err.context(format!("failed to stop module '{}'", module.name())));
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Probe every module; returns the names of the unhealthy ones
    pub async fn unhealthy_modules(&self) -> Vec<&'static str> {
        let mut failing = Vec::new();
        for module in self.modules() {
            if let Err(err) = module.health().await {
                tracing::warn!(module = module.name(), error = %err, "health probe failed");
                failing.push(module.name());
            }
        }
        failing
    }

    /// Collect all migrations, sorted by module name then migration id
    pub fn collect_migrations(&self) -> Vec<ModuleMigration> {
        let mut migrations: Vec<ModuleMigration> = self
            .modules()
            .flat_map(|module| {
                let owner = module.name();
                module
                    .migrations()
                    .into_iter()
                    .map(move |migration| ModuleMigration {
                        module: owner,
                        migration,
                    })
            })
            .collect();

        migrations.sort_by(|a, b| {
            a.module
                .cmp(b.module)
                .then_with(|| a.migration.id.cmp(b.migration.id))
        });

        migrations
    }
}
