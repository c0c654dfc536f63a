// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token authentication middleware.

use crate::error::AppError;
use crate::services::AuthError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated user extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Pull the token out of an `Authorization` header value.
fn bearer_token(header_value: Option<&str>) -> Result<&str, AuthError> {
    let value = header_value.ok_or(AuthError::TokenMissing)?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::TokenMalformed)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::TokenMissing);
    }
    Ok(token)
}

/// Middleware that requires a valid bearer token.
///
/// Identity comes from the token alone; no database lookup happens here.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = match request.headers().get(header::AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::TokenMalformed)?),
        None => None,
    };
    let token = bearer_token(header_value)?;
    let user_id = state.tokens.validate(token)?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}
