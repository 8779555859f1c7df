//! Storage layer for the bookstore.
//!
//! Repositories talk to the [`BookStore`] and [`UserStore`] traits only. Two
//! backends implement them:
//! - [`memory::InMemoryStore`]: process-local maps, the default for local
//!   runs and tests.
//! - [`postgres::PostgresStore`]: durable storage through a `sqlx` pool.
//!
//! [`Database::connect`] picks the backend from [`DatabaseSettings`].

use std::sync::Arc;

use async_trait::async_trait;
use bookstore_kernel::settings::{DatabaseBackend, DatabaseSettings};
use bookstore_kernel::registry::ModuleMigration;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

pub mod memory;
pub mod module;
pub mod postgres;

pub use module::DatabaseModule;

pub type BookId = i32;

/// A persisted book row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BookRecord {
    pub id: BookId,
    pub title: String,
    pub description: String,
}

/// Columns supplied on insert; the id is always assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub description: String,
}

/// A persisted user credential row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    /// Upper-cased email, the uniqueness key
    pub normalized_email: String,
    pub first_name: String,
    pub last_name: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            _ => StoreError::Unexpected(anyhow::Error::new(err)),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books ordered by id
    async fn list_books(&self) -> StoreResult<Vec<BookRecord>>;
    async fn get_book(&self, id: BookId) -> StoreResult<Option<BookRecord>>;
    async fn insert_book(&self, book: NewBook) -> StoreResult<BookRecord>;
    /// Overwrites title and description of `book.id`; `None` if the row is gone
    async fn update_book(&self, book: &BookRecord) -> StoreResult<Option<BookRecord>>;
    /// `false` if no row matched
    async fn delete_book(&self, id: BookId) -> StoreResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, normalized_email: &str) -> StoreResult<Option<UserRecord>>;
    /// Fails with [`StoreError::Conflict`] when the normalized email is taken
    async fn insert_user(&self, user: UserRecord) -> StoreResult<UserRecord>;
}

#[derive(Clone)]
enum Backend {
    Memory,
    Postgres(postgres::PostgresStore),
}

/// Handle over the configured backend
#[derive(Clone)]
pub struct Database {
    books: Arc<dyn BookStore>,
    users: Arc<dyn UserStore>,
    backend: Backend,
}

impl Database {
    pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        match settings.backend {
            DatabaseBackend::Memory => {
                tracing::info!(backend = "memory", "using in-memory store; data is not durable");
                Ok(Self::in_memory())
            }
            DatabaseBackend::Postgres => {
                let store = postgres::PostgresStore::connect(settings).await?;
                tracing::info!(
                    backend = "postgres",
                    max_connections = settings.max_connections,
                    "connected to postgres"
                );
                Ok(Self {
                    books: Arc::new(store.clone()),
                    users: Arc::new(store.clone()),
                    backend: Backend::Postgres(store),
                })
            }
        }
    }

    pub fn in_memory() -> Self {
        let store = memory::InMemoryStore::new();
        Self {
            books: Arc::new(store.clone()),
            users: Arc::new(store),
            backend: Backend::Memory,
        }
    }

    pub fn books(&self) -> Arc<dyn BookStore> {
        self.books.clone()
    }

    pub fn users(&self) -> Arc<dyn UserStore> {
        self.users.clone()
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Memory => "memory",
            Backend::Postgres(_) => "postgres",
        }
    }

    /// Applies pending migrations; returns how many ran. The memory backend
    /// has no schema and applies nothing.
    pub async fn migrate(&self, migrations: &[ModuleMigration]) -> anyhow::Result<usize> {
        match &self.backend {
            Backend::Memory => {
                tracing::debug!(
                    available = migrations.len(),
                    "memory backend ignores migrations"
                );
                Ok(0)
            }
            Backend::Postgres(store) => store.apply_migrations(migrations).await,
        }
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        match &self.backend {
            Backend::Memory => Ok(()),
            Backend::Postgres(store) => store.ping().await,
        }
    }

    pub async fn close(&self) {
        if let Backend::Postgres(store) = &self.backend {
            store.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};

    #[derive(Debug)]
    struct FakeDbError(ErrorKind);

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("duplicate key value violates unique constraint")
        }
    }

    impl std::error::Error for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    #[test]
    fn unique_violation_becomes_conflict() {
        let err = StoreError::from(sqlx::Error::Database(Box::new(FakeDbError(
            ErrorKind::UniqueViolation,
        ))));
        assert!(matches!(err, StoreError::Conflict(message) if message.contains("unique")));
    }

    #[test]
    fn other_database_errors_are_unexpected() {
        let err = StoreError::from(sqlx::Error::Database(Box::new(FakeDbError(ErrorKind::Other))));
        assert!(matches!(err, StoreError::Unexpected(_)));

        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Unexpected(_)));
    }

    #[tokio::test]
    async fn memory_database_ignores_migrations() {
        let database = Database::in_memory();
        assert_eq!(database.backend_name(), "memory");
        assert_eq!(database.migrate(&[]).await.unwrap(), 0);
        database.ping().await.unwrap();
    }
}
