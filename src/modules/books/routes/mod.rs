use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use bookstore_http::{
    error::AppError,
    extract::{JsonBody, PathParam},
};
use serde_json::Value;

use super::models::{Book, BookId, BookInput};
use super::repository::BooksRepository;

/// CRUD routes, relative to `/api/books`
pub fn router() -> Router<BooksRepository> {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book)
                .put(update_book)
                .patch(patch_book)
                .delete(delete_book),
        )
}

fn validate(input: &BookInput) -> Result<(), AppError> {
    let problems = input.problems();
    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation(problems, "invalid book"))
    }
}

async fn list_books(State(repo): State<BooksRepository>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(repo.get_all_books().await?))
}

async fn get_book(
    State(repo): State<BooksRepository>,
    PathParam(id): PathParam<BookId>,
) -> Result<Json<Book>, AppError> {
    repo.get_book(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("book {id} not found")))
}

async fn create_book(
    State(repo): State<BooksRepository>,
    JsonBody(input): JsonBody<BookInput>,
) -> Result<impl IntoResponse, AppError> {
    validate(&input)?;
    let id = repo.add_new_book(input).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/books/{id}"))],
        Json(id),
    ))
}

async fn update_book(
    State(repo): State<BooksRepository>,
    PathParam(id): PathParam<BookId>,
    JsonBody(input): JsonBody<BookInput>,
) -> Result<Json<BookId>, AppError> {
    validate(&input)?;
    Ok(Json(repo.update_book(input, id).await?))
}

async fn patch_book(
    State(repo): State<BooksRepository>,
    PathParam(id): PathParam<BookId>,
    JsonBody(document): JsonBody<Value>,
) -> Result<Json<BookId>, AppError> {
    Ok(Json(repo.update_book_patch(&document, id).await?))
}

async fn delete_book(
    State(repo): State<BooksRepository>,
    PathParam(id): PathParam<BookId>,
) -> Result<&'static str, AppError> {
    repo.delete_book(id).await?;
    Ok("Item is removed successfully")
}
