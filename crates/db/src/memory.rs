//! In-memory store.
//!
//! Books live in a `BTreeMap` keyed by id so listing is ordered; users are
//! keyed by normalized email. Ids come from a per-store counter starting at
//! 1 and are never reused, which matches a Postgres `SERIAL` column. State is
//! lost on restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    BookId, BookRecord, BookStore, NewBook, StoreError, StoreResult, UserRecord, UserStore,
};

#[derive(Debug, Default)]
struct BookTable {
    last_id: BookId,
    rows: BTreeMap<BookId, BookRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    books: Arc<RwLock<BookTable>>,
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for InMemoryStore {
    async fn list_books(&self) -> StoreResult<Vec<BookRecord>> {
        let table = self.books.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn get_book(&self, id: BookId) -> StoreResult<Option<BookRecord>> {
        let table = self.books.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn insert_book(&self, book: NewBook) -> StoreResult<BookRecord> {
        let mut table = self.books.write().await;
        let id = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Unexpected(anyhow::anyhow!("book id sequence exhausted")))?;
        table.last_id = id;

        let record = BookRecord {
            id,
            title: book.title,
            description: book.description,
        };
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update_book(&self, book: &BookRecord) -> StoreResult<Option<BookRecord>> {
        let mut table = self.books.write().await;
        Ok(table.rows.get_mut(&book.id).map(|row| {
            row.title.clone_from(&book.title);
            row.description.clone_from(&book.description);
            row.clone()
        }))
    }

    async fn delete_book(&self, id: BookId) -> StoreResult<bool> {
        let mut table = self.books.write().await;
        Ok(table.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_user_by_email(&self, normalized_email: &str) -> StoreResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(normalized_email).cloned())
    }

    async fn insert_user(&self, user: UserRecord) -> StoreResult<UserRecord> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.normalized_email) {
            return Err(StoreError::Conflict(format!(
                "user with email '{}' already exists",
                user.email
            )));
        }
        users.insert(user.normalized_email.clone(), user.clone());
        Ok(user)
    }
}
