pub mod account;
pub mod books;

use bookstore_authz::IdentityProvider;
use bookstore_db::Database;
use bookstore_kernel::{settings::Settings, ModuleRegistry};

/// Register the feature modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    settings: &Settings,
    database: &Database,
    identity: &IdentityProvider,
) {
    registry.register_custom(account::create_module(identity.clone()));

    let tokens = if settings.auth.require_token {
        Some(identity.tokens().clone())
    } else {
        tracing::warn!("auth.require_token is off; books endpoints accept anonymous requests");
        None
    };
    registry.register_custom(books::create_module(database.books(), tokens));
}
