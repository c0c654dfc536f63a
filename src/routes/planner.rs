// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Itinerary generation route.

use crate::error::Result;
use crate::extract::ApiJson;
use crate::models::GeneratedItinerary;
use crate::routes::required;
use crate::services::ItineraryRequest;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Longest trip the generator will plan.
pub const MAX_DURATION_DAYS: u32 = 60;

/// Planner routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/generate-itinerary", post(generate_itinerary))
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateItineraryRequest {
    #[validate(length(min = 1))]
    pub destination: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub budget: Option<f64>,
    #[validate(range(min = 1, max = MAX_DURATION_DAYS))]
    pub duration: Option<u32>,
    pub interests: Option<Vec<String>>,
}

/// Draft an itinerary. Always succeeds once the input is valid: upstream
/// failures produce the fallback itinerary.
async fn generate_itinerary(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<GenerateItineraryRequest>,
) -> Result<Json<GeneratedItinerary>> {
    body.validate()?;
    let request = ItineraryRequest {
        destination: required(body.destination)?,
        budget: required(body.budget)?,
        duration: required(body.duration)?,
        interests: required(body.interests)?,
    };

    Ok(Json(state.itinerary.generate(&request).await))
}
