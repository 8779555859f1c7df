#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bookstore_app::Application;
use bookstore_db::Database;
use bookstore_kernel::settings::Settings;
use serde_json::json;
use tower::ServiceExt;

pub const PASSWORD: &str = "Passw0rd!";

pub fn app(require_token: bool) -> Router {
    let mut settings = Settings::default();
    settings.auth.require_token = require_token;
    Application::assemble(settings, Database::in_memory()).router()
}

pub fn json_request(
    method: &str,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub async fn read_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8")
}

pub fn signup_body(email: &str, password: &str, confirm: &str) -> serde_json::Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": email,
        "password": password,
        "confirmPassword": confirm
    })
}

/// Registers a fresh account and returns its bearer token
pub async fn login_token(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/account/signup",
            signup_body("reader@example.com", PASSWORD, PASSWORD),
            None,
        ))
        .await
        .expect("signup");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/account/login",
            json!({ "email": "reader@example.com", "password": PASSWORD }),
            None,
        ))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::OK);
    read_text(response).await
}
