use async_trait::async_trait;
use bookstore_kernel::settings::{Environment, DEV_JWT_SECRET};
use bookstore_kernel::{InitCtx, Module};

/// Core module for the identity provider; refuses to boot a production
/// environment on the development signing secret.
pub struct IdentityModule;

#[async_trait]
impl Module for IdentityModule {
    fn name(&self) -> &'static str {
        "authz"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let auth = &ctx.settings.auth;
        if auth.jwt_secret == DEV_JWT_SECRET {
            if ctx.settings.environment == Environment::Production {
                anyhow::bail!("refusing to start: development JWT secret in production");
            }
            tracing::warn!(
                module = self.name(),
                "using the development JWT secret; set auth.jwt_secret"
            );
        }

        tracing::info!(
            module = self.name(),
            issuer = %auth.jwt_issuer,
            audience = %auth.jwt_audience,
            token_ttl_minutes = auth.token_ttl_minutes,
            require_token = auth.require_token,
            "identity module initialized"
        );
        Ok(())
    }
}
