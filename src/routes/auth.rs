// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login and current-user routes.

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::models::PublicUser;
use crate::routes::required;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Routes that need no token.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", post(register))
        .route("/api/auth/login", post(login))
}

/// Routes behind `require_auth` (applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/me", get(me))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Successful login.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Create an account.
async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>)> {
    let email = required(body.email.as_deref())?;
    let name = required(body.name.as_deref())?;
    let password = required(body.password.as_deref())?;
    body.validate()?;

    let user = state.credentials.register(email, name, password).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Exchange email and password for a session token.
async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let email = required(body.email.as_deref())?;
    let password = required(body.password.as_deref())?;

    let user = state.credentials.authenticate(email, password).await?;
    let token = state.tokens.issue(&user.id)?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// Get the current user.
async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PublicUser>> {
    let user = state.credentials.get(&user.user_id).await?;
    Ok(Json(user.into()))
}
