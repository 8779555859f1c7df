pub mod models;
pub mod patch;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{middleware, routing::get, Router};
use bookstore_authz::TokenService;
use bookstore_db::BookStore;
use bookstore_http::auth::require_bearer;
use bookstore_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use repository::BooksRepository;

/// Books catalogue mounted at `/api/books`
pub struct BooksModule {
    repository: BooksRepository,
    /// `None` leaves the CRUD routes open
    tokens: Option<TokenService>,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>, tokens: Option<TokenService>) -> Self {
        Self {
            repository: BooksRepository::new(store),
            tokens,
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            protected = self.tokens.is_some(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        let mut router = routes::router();
        if let Some(tokens) = &self.tokens {
            router = router.route_layer(middleware::from_fn_with_state(
                tokens.clone(),
                require_bearer,
            ));
        }

        router
            .route("/health", get(health_check))
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
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int32" }
        }]);
        let id_body = json!({
            "content": { "application/json": { "schema": { "type": "integer", "format": "int32" } } }
        });
        let book_body = json!({
            "required": true,
            "content": {
                "application/json": { "schema": { "$ref": "#/components/schemas/BookInput" } }
            }
        });
        let security = json!([{ "bearerAuth": [] }]);

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "security": security,
                        "responses": {
                            "200": {
                                "description": "All books ordered by id",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "401": error("Missing or invalid bearer token")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "security": security,
                        "requestBody": book_body,
                        "responses": {
                            "201": {
                                "description": "Created; `Location` points at the new book",
                                "content": id_body["content"]
                            },
                            "401": error("Missing or invalid bearer token"),
                            "422": error("Invalid book"),
                            "500": error("Store failure")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "security": security,
                        "parameters": id_param,
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "404": error("No such book")
                        }
                    },
                    "put": {
                        "summary": "Replace title and description",
                        "tags": ["Books"],
                        "security": security,
                        "parameters": id_param,
                        "requestBody": book_body,
                        "responses": {
                            "200": { "description": "Updated id", "content": id_body["content"] },
                            "404": error("No such book"),
                            "422": error("Invalid book"),
                            "500": error("Store failure")
                        }
                    },
                    "patch": {
                        "summary": "Apply a JSON Patch",
                        "tags": ["Books"],
                        "security": security,
                        "parameters": id_param,
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/PatchOperation" }
                                    }
                                }
                            }
                        },
                        "responses": {
                            "200": { "description": "Patched id", "content": id_body["content"] },
                            "404": error("No such book"),
                            "409": error("A `test` operation failed"),
                            "422": error("Invalid patch document"),
                            "500": error("Store failure")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "security": security,
                        "parameters": id_param,
                        "responses": {
                            "200": {
                                "description": "Removed",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            },
                            "404": error("No such book"),
                            "500": error("Store failure")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
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
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int32" },
                            "title": { "type": "string" },
                            "description": { "type": "string" }
                        },
                        "required": ["id", "title", "description"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 1 },
                            "description": { "type": "string" }
                        },
                        "required": ["title"]
                    },
                    "PatchOperation": {
                        "type": "object",
                        "properties": {
                            "op": {
                                "type": "string",
                                "enum": ["add", "remove", "replace", "move", "copy", "test"]
                            },
                            "path": { "type": "string", "example": "/title" },
                            "value": {},
                            "from": { "type": "string" }
                        },
                        "required": ["op", "path"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id          SERIAL PRIMARY KEY,
                    title       TEXT NOT NULL CHECK (title <> ''),
                    description TEXT NOT NULL DEFAULT ''
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

pub fn create_module(store: Arc<dyn BookStore>, tokens: Option<TokenService>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store, tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_db::memory::InMemoryStore;

    #[test]
    fn openapi_fragment_covers_every_route() {
        let module = BooksModule::new(Arc::new(InMemoryStore::new()), None);
        let doc = module.openapi().unwrap();
        for method in ["get", "post"] {
            assert!(doc["paths"]["/"][method].is_object(), "missing {method} /");
        }
        for method in ["get", "put", "patch", "delete"] {
            assert!(doc["paths"]["/{id}"][method].is_object(), "missing {method} /{{id}}");
        }
        assert!(doc["components"]["schemas"]["Book"].is_object());
    }

    #[test]
    fn migration_creates_books_table() {
        let module = BooksModule::new(Arc::new(InMemoryStore::new()), None);
        let migrations = module.migrations();
        assert_eq!(migrations.len(), 1);
        assert!(migrations[0].up.contains("CREATE TABLE IF NOT EXISTS books"));
    }
}
