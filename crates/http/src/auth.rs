//! Bearer-token guard for protected routers

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use bookstore_authz::TokenService;

use crate::error::AppError;

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|token| !token.is_empty())
}

/// Middleware: validates the bearer token and stores its
/// [`Claims`](bookstore_authz::Claims) in the request extensions.
///
/// Mount with `axum::middleware::from_fn_with_state(tokens, require_bearer)`.
pub async fn require_bearer(
    State(tokens): State<TokenService>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or_else(|| AppError::unauthorized("missing bearer token"))?;
    let claims = tokens
        .validate(token)
        .map_err(|err| AppError::unauthorized(err.to_string()))?;

    tracing::debug!(subject = %claims.sub, "bearer token accepted");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
