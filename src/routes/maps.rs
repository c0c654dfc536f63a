// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Place search and directions routes (public).

use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiQuery};
use crate::models::{Coordinates, Place};
use crate::services::openroute::{parse_bbox, parse_location, parse_profile};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/places/search", get(search_places))
        .route("/api/directions", post(get_directions))
}

#[derive(Debug, Deserialize)]
pub struct PlaceSearchParams {
    pub query: Option<String>,
    /// `lat,lng` to bias results towards
    pub location: Option<String>,
    /// `min_lng,min_lat,max_lng,max_lat`
    pub bbox: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DirectionsRequest {
    #[validate(nested)]
    pub start: Option<Coordinates>,
    #[validate(nested)]
    pub end: Option<Coordinates>,
    pub profile: Option<String>,
}

/// Search places. Upstream failures produce an empty list.
async fn search_places(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<PlaceSearchParams>,
) -> Result<Json<Vec<Place>>> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::BadRequest("Query parameter required".to_string()))?;

    let focus = params.location.as_deref().map(parse_location).transpose()?;
    let bbox = params.bbox.as_deref().map(parse_bbox).transpose()?;

    let places = state.openroute.search_places(query, focus, bbox).await;
    Ok(Json(places))
}

/// Route between two points. Upstream failures produce `{}`.
async fn get_directions(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<DirectionsRequest>,
) -> Result<Json<serde_json::Value>> {
    let (Some(start), Some(end)) = (body.start, body.end) else {
        return Err(AppError::BadRequest(
            "Start and end coordinates required".to_string(),
        ));
    };
    body.validate()?;
    let profile = parse_profile(body.profile.as_deref())?;

    let route = state.openroute.get_directions(start, end, profile).await;
    Ok(Json(route))
}
