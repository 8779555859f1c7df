//! Postgres-backed store.
//!
//! Schema comes from module migrations (see [`PostgresStore::apply_migrations`]);
//! this file only issues single-statement queries, so every write is atomic
//! on its own and the pool handles concurrency. The connection URL may hold
//! credentials and is never logged.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use bookstore_kernel::registry::ModuleMigration;
use bookstore_kernel::settings::DatabaseSettings;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::{BookId, BookRecord, BookStore, NewBook, StoreResult, UserRecord, UserStore};

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        module     TEXT        NOT NULL,
        id         TEXT        NOT NULL,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (module, id)
    )
"#;

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        let options = PgConnectOptions::from_str(&settings.url)
            .context("invalid postgres connection url")?;
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms))
            .connect_with(options)
            .await
            .context("failed to connect to postgres")?;
        Ok(Self { pool })
    }

    /// Runs every migration not yet recorded in `_migrations`, each in its
    /// own transaction together with its bookkeeping row.
    pub async fn apply_migrations(&self, migrations: &[ModuleMigration]) -> anyhow::Result<usize> {
        sqlx::raw_sql(MIGRATIONS_TABLE)
            .execute(&self.pool)
            .await
            .context("failed to create migrations table")?;

        let mut applied = 0;
        for entry in migrations {
            let already: Option<(String,)> =
                sqlx::query_as("SELECT id FROM _migrations WHERE module = $1 AND id = $2")
                    .bind(entry.module)
                    .bind(entry.migration.id)
                    .fetch_optional(&self.pool)
                    .await?;
            if already.is_some() {
                continue;
            }

            let mut tx = self.pool.begin().await?;
            sqlx::raw_sql(entry.migration.up)
                .execute(&mut *tx)
                .await
                .with_context(|| {
                    format!(
                        "migration {}/{} failed",
                        entry.module, entry.migration.id
                    )
                })?;
            sqlx::query("INSERT INTO _migrations (module, id) VALUES ($1, $2)")
                .bind(entry.module)
                .bind(entry.migration.id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            tracing::info!(
                module = entry.module,
                migration = entry.migration.id,
                "applied migration"
            );
            applied += 1;
        }

        Ok(applied)
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("postgres ping failed")?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl BookStore for PostgresStore {
    async fn list_books(&self) -> StoreResult<Vec<BookRecord>> {
        let rows = sqlx::query_as::<_, BookRecord>(
            "SELECT id, title, description FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_book(&self, id: BookId) -> StoreResult<Option<BookRecord>> {
        let row = sqlx::query_as::<_, BookRecord>(
            "SELECT id, title, description FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_book(&self, book: NewBook) -> StoreResult<BookRecord> {
        let row = sqlx::query_as::<_, BookRecord>(
            "INSERT INTO books (title, description) VALUES ($1, $2) \
             RETURNING id, title, description",
        )
        .bind(book.title)
        .bind(book.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_book(&self, book: &BookRecord) -> StoreResult<Option<BookRecord>> {
        let row = sqlx::query_as::<_, BookRecord>(
            "UPDATE books SET title = $2, description = $3 WHERE id = $1 \
             RETURNING id, title, description",
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.description)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_book(&self, id: BookId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn find_user_by_email(&self, normalized_email: &str) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, normalized_email, first_name, last_name, password_hash, created_at \
             FROM users WHERE normalized_email = $1",
        )
        .bind(normalized_email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_user(&self, user: UserRecord) -> StoreResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users \
             (id, email, normalized_email, first_name, last_name, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, email, normalized_email, first_name, last_name, password_hash, created_at",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.normalized_email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
