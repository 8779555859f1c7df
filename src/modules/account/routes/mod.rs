use axum::{extract::State, routing::post, Json, Router};
use bookstore_http::{error::AppError, extract::JsonBody};

use super::models::{SignIn, SignUp};
use super::repository::AccountRepository;

/// Routes relative to `/api/account`
pub fn router() -> Router<AccountRepository> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/login", post(login))
}

async fn sign_up(
    State(repo): State<AccountRepository>,
    JsonBody(form): JsonBody<SignUp>,
) -> Result<Json<bool>, AppError> {
    form.validate()
        .map_err(|problems| AppError::validation(problems, "invalid signup form"))?;
    repo.sign_up(form).await?;
    Ok(Json(true))
}

async fn login(
    State(repo): State<AccountRepository>,
    JsonBody(credentials): JsonBody<SignIn>,
) -> Result<String, AppError> {
    repo.login(credentials)
        .await?
        .ok_or_else(|| AppError::unauthorized("invalid email or password"))
}
