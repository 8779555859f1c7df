use std::sync::Arc;

use bookstore_db::{BookStore, StoreError};
use bookstore_http::error::AppError;
use serde_json::{json, Value};
use thiserror::Error;

use super::models::{Book, BookId, BookInput};
use super::patch::{self, PatchError};

#[derive(Debug, Error)]
pub enum BooksError {
    #[error("book {0} not found")]
    NotFound(BookId),

    #[error("invalid patch: {0}")]
    InvalidPatch(PatchError),

    #[error("patch precondition failed on '{0}'")]
    PatchTestFailed(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PatchError> for BooksError {
    fn from(err: PatchError) -> Self {
        match err {
            PatchError::TestFailed(path) => BooksError::PatchTestFailed(path),
            other => BooksError::InvalidPatch(other),
        }
    }
}

impl From<BooksError> for AppError {
    fn from(err: BooksError) -> Self {
        match err {
            BooksError::NotFound(id) => AppError::not_found(format!("book {id} not found")),
            BooksError::InvalidPatch(reason) => AppError::validation(
                vec![json!({ "error": reason.to_string() })],
                "patch document rejected",
            ),
            BooksError::PatchTestFailed(path) => AppError::conflict(
                vec![json!({ "path": path })],
                "patch test operation failed",
            ),
            BooksError::Store(store) => AppError::from(store),
        }
    }
}

/// Books use cases on top of a [`BookStore`]
#[derive(Clone)]
pub struct BooksRepository {
    store: Arc<dyn BookStore>,
}

impl BooksRepository {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn get_all_books(&self) -> Result<Vec<Book>, BooksError> {
        let books = self.store.list_books().await?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    pub async fn get_book(&self, id: BookId) -> Result<Option<Book>, BooksError> {
        Ok(self.store.get_book(id).await?.map(Book::from))
    }

    /// Returns the id assigned by the store
    pub async fn add_new_book(&self, input: BookInput) -> Result<BookId, BooksError> {
        let created = self.store.insert_book(input.into()).await?;
        tracing::info!(book_id = created.id, "book created");
        Ok(created.id)
    }

    pub async fn update_book(&self, input: BookInput, id: BookId) -> Result<BookId, BooksError> {
        let mut record = self
            .store
            .get_book(id)
            .await?
            .ok_or(BooksError::NotFound(id))?;

        record.title = input.title;
        record.description = input.description;

        let saved = self
            .store
            .update_book(&record)
            .await?
            .ok_or(BooksError::NotFound(id))?;
        tracing::info!(book_id = saved.id, "book updated");
        Ok(saved.id)
    }

    /// `document` is the raw request body; it is decoded only once the book
    /// is known to exist.
    pub async fn update_book_patch(
        &self,
        document: &Value,
        id: BookId,
    ) -> Result<BookId, BooksError> {
        let record = self
            .store
            .get_book(id)
            .await?
            .ok_or(BooksError::NotFound(id))?;

        let operations = patch::parse(document)?;
        let patched = patch::apply(&record, &operations)?;

        let saved = self
            .store
            .update_book(&patched)
            .await?
            .ok_or(BooksError::NotFound(id))?;
        tracing::info!(
            book_id = saved.id,
            operations = operations.len(),
            "book patched"
        );
        Ok(saved.id)
    }

    pub async fn delete_book(&self, id: BookId) -> Result<(), BooksError> {
        if !self.store.delete_book(id).await? {
            return Err(BooksError::NotFound(id));
        }
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }
}
