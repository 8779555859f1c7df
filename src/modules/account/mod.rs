pub mod models;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookstore_authz::IdentityProvider;
use bookstore_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use repository::AccountRepository;

/// Signup and login, mounted at `/api/account`
pub struct AccountModule {
    repository: AccountRepository,
}

impl AccountModule {
    pub fn new(identity: IdentityProvider) -> Self {
        Self {
            repository: AccountRepository::new(identity),
        }
    }
}

#[async_trait]
impl Module for AccountModule {
    fn name(&self) -> &'static str {
        "account"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            min_password_length = ctx.settings.auth.password.min_length,
            "account module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router()
            .route("/health", get(|| async { "account module is healthy" }))
            .with_state(self.repository.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };

        Some(json!({
            "paths": {
                "/signup": {
                    "post": {
                        "summary": "Register an account",
                        "tags": ["Account"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": { "schema": { "$ref": "#/components/schemas/SignUp" } }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Account created",
                                "content": { "application/json": { "schema": { "type": "boolean" } } }
                            },
                            "409": error("Email already registered"),
                            "422": error("Invalid form or weak password")
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Exchange credentials for a bearer token",
                        "tags": ["Account"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": { "schema": { "$ref": "#/components/schemas/SignIn" } }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "JWT bearer token",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            },
                            "401": error("Invalid email or password")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Account health check",
                        "tags": ["Account"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "SignUp": {
                        "type": "object",
                        "properties": {
                            "firstName": { "type": "string" },
                            "lastName": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string", "format": "password" },
                            "confirmPassword": { "type": "string", "format": "password" }
                        },
                        "required": ["firstName", "lastName", "email", "password", "confirmPassword"]
                    },
                    "SignIn": {
                        "type": "object",
                        "properties": {
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string", "format": "password" }
                        },
                        "required": ["email", "password"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_users",
            up: r#"
                CREATE TABLE IF NOT EXISTS users (
                    id               UUID PRIMARY KEY,
                    email            TEXT NOT NULL,
                    normalized_email TEXT NOT NULL,
                    first_name       TEXT NOT NULL,
                    last_name        TEXT NOT NULL,
                    password_hash    TEXT NOT NULL,
                    created_at       TIMESTAMPTZ NOT NULL DEFAULT now()
                );
                CREATE UNIQUE INDEX IF NOT EXISTS users_normalized_email_key
                    ON users (normalized_email);
                "#,
        }]
    }
}

pub fn create_module(identity: IdentityProvider) -> Arc<dyn Module> {
    Arc::new(AccountModule::new(identity))
}
