// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod activities;
pub mod auth;
pub mod expenses;
pub mod maps;
pub mod plans;
pub mod planner;

use crate::error::{AppError, Result};
use crate::middleware::auth::require_auth;
use crate::AppState;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::{middleware, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Endpoints advertised by the index route.
const ENDPOINTS: &[&str] = &[
    "/api/users (POST)",
    "/api/auth/login (POST)",
    "/api/auth/me (GET)",
    "/api/travel-plans (GET, POST)",
    "/api/travel-plans/{id} (GET, PUT, DELETE)",
    "/api/generate-itinerary (POST)",
    "/api/places/search (GET)",
    "/api/directions (POST)",
    "/api/activities (GET, POST)",
    "/api/activities/{id} (PUT, DELETE)",
    "/api/expenses (GET, POST)",
    "/api/expenses/{id} (PUT, DELETE)",
];

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Service description returned by `/`.
#[derive(Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub endpoints: &'static [&'static str],
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// `?plan_id=` query used by the sub-resource list routes.
#[derive(Debug, Deserialize)]
pub struct PlanScope {
    pub plan_id: Option<String>,
}

impl PlanScope {
    pub fn plan_id(&self) -> Result<&str> {
        self.plan_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::BadRequest("plan_id parameter required".to_string()))
    }
}

/// Unwrap a required request field.
pub(crate) fn required<T>(value: Option<T>) -> Result<T> {
    value.ok_or_else(AppError::missing_fields)
}

/// Health check; 503 when the database does not answer.
async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                build_id,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    build_id,
                }),
            )
        }
    }
}

async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "AI Travel Planner API",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        endpoints: ENDPOINTS,
    })
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .merge(auth::public_routes())
        .merge(maps::routes());

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(plans::routes())
        .merge(planner::routes())
        .merge(activities::routes())
        .merge(expenses::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
