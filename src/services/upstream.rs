// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared plumbing for calls to third-party HTTP APIs.

use serde::de::DeserializeOwned;
use std::time::Duration;

/// Why an upstream call produced no usable answer. Never shown to clients.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    Parse(String),
}

/// Build the HTTP client shared by all upstream services.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("travel-planner/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Check response status and parse the JSON body.
pub async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 429 {
            tracing::warn!("Upstream rate limit hit (429)");
        }
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| UpstreamError::Parse(format!("JSON parse error: {}", e)))
}
