// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use travel_planner::config::Config;
use travel_planner::db::Database;
use travel_planner::routes::create_router;
use travel_planner::AppState;

/// Create a test app backed by a fresh in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(Config::test_default()).await
}

/// Same as [`create_test_app`] with a customised configuration.
#[allow(dead_code)]
pub async fn create_test_app_with(config: Config) -> (Router, Arc<AppState>) {
    let db = Database::in_memory()
        .await
        .expect("Failed to open in-memory database");
    let state = Arc::new(AppState::new(config, db).expect("Failed to build app state"));

    (create_router(state.clone()), state)
}

/// Build a request, optionally with a bearer token and a JSON body.
#[allow(dead_code)]
pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and decode the JSON response body (`Null` when empty).
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    };
    (status, body)
}

/// Register an account and log in. Returns `(token, user_id)`.
#[allow(dead_code)]
pub async fn register_and_login(app: &Router, email: &str, password: &str) -> (String, String) {
    let (status, user) = send(
        app,
        request(
            Method::POST,
            "/api/users",
            None,
            Some(serde_json::json!({ "email": email, "name": "Test User", "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", user);

    let (status, login) = send(
        app,
        request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", login);

    (
        login["token"].as_str().unwrap().to_string(),
        user["id"].as_str().unwrap().to_string(),
    )
}

/// A plan body with every required field.
#[allow(dead_code)]
pub fn plan_body(destination: &str) -> Value {
    serde_json::json!({
        "destination": destination,
        "budget": 2000,
        "duration": 5,
        "interests": ["art"],
        "start_date": "2025-01-01",
        "end_date": "2025-01-06"
    })
}

/// Create a plan and return its id.
#[allow(dead_code)]
pub async fn create_plan(app: &Router, token: &str, destination: &str) -> String {
    let (status, plan) = send(
        app,
        request(
            Method::POST,
            "/api/travel-plans",
            Some(token),
            Some(plan_body(destination)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "plan creation failed: {}", plan);
    plan["id"].as_str().unwrap().to_string()
}

/// Serve `router` on an ephemeral local port, standing in for an upstream
/// API. Returns its base URL.
#[allow(dead_code)]
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
