// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OpenRouteService client for place search and directions.
//!
//! Both calls are lossy-but-available: any transport, status or parse
//! failure is logged and turned into an empty result instead of an error.

use crate::error::AppError;
use crate::models::{Coordinates, Place};
use crate::services::upstream::{check_response_json, UpstreamError};
use geo::{coord, Point, Rect};
use geojson::GeoJson;

/// Routing profiles published by the provider.
pub const PROFILES: &[&str] = &[
    "driving-car",
    "driving-hgv",
    "cycling-regular",
    "cycling-road",
    "cycling-mountain",
    "cycling-electric",
    "foot-walking",
    "foot-hiking",
    "wheelchair",
];

pub const DEFAULT_PROFILE: &str = "driving-car";

/// Resolve a requested profile against [`PROFILES`].
///
/// The profile becomes a URL path segment, so anything outside the
/// published set is rejected.
pub fn parse_profile(raw: Option<&str>) -> Result<&'static str, AppError> {
    let requested = raw.map(str::trim).filter(|p| !p.is_empty());
    match requested {
        None => Ok(DEFAULT_PROFILE),
        Some(profile) => PROFILES
            .iter()
            .copied()
            .find(|known| *known == profile)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown routing profile: {}", profile))),
    }
}

/// Parse `min_lng,min_lat,max_lng,max_lat`.
pub fn parse_bbox(raw: &str) -> Result<Rect<f64>, AppError> {
    let invalid = || AppError::BadRequest("Invalid bbox format".to_string());

    let values = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;

    let [min_lng, min_lat, max_lng, max_lat] = values.as_slice() else {
        return Err(invalid());
    };
    if values.iter().any(|v| !v.is_finite()) {
        return Err(invalid());
    }

    Ok(Rect::new(
        coord! { x: *min_lng, y: *min_lat },
        coord! { x: *max_lng, y: *max_lat },
    ))
}

/// Parse a `lat,lng` focus point.
pub fn parse_location(raw: &str) -> Result<Coordinates, AppError> {
    let invalid = || AppError::BadRequest("Invalid location format".to_string());

    let (lat, lng) = raw.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(invalid());
    }
    Ok(Coordinates::new(lat, lng))
}

/// OpenRouteService API client.
#[derive(Clone)]
pub struct OpenRouteService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenRouteService {
    /// Without an API key requests go out unauthenticated, which suits a
    /// self-hosted instance.
    pub fn new(http: reqwest::Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Search places by free text, optionally biased to a point and
    /// restricted to a bounding box. Failures yield an empty list.
    pub async fn search_places(
        &self,
        query: &str,
        focus: Option<Coordinates>,
        bbox: Option<Rect<f64>>,
    ) -> Vec<Place> {
        match self.try_search_places(query, focus, bbox).await {
            Ok(places) => places,
            Err(e) => {
                tracing::warn!(error = %e, "Place search failed");
                Vec::new()
            }
        }
    }

    /// Route between two points. Failures yield `{}`.
    pub async fn get_directions(
        &self,
        start: Coordinates,
        end: Coordinates,
        profile: &str,
    ) -> serde_json::Value {
        match self.try_get_directions(start, end, profile).await {
            Ok(route) => route,
            Err(e) => {
                tracing::warn!(error = %e, profile, "Directions request failed");
                serde_json::json!({})
            }
        }
    }

    async fn try_search_places(
        &self,
        query: &str,
        focus: Option<Coordinates>,
        bbox: Option<Rect<f64>>,
    ) -> Result<Vec<Place>, UpstreamError> {
        let url = format!("{}/geocode/search", self.base_url);

        let mut params = vec![("text", query.to_string())];
        if let Some(focus) = focus {
            params.push(("focus.point.lat", focus.lat.to_string()));
            params.push(("focus.point.lon", focus.lng.to_string()));
        }
        if let Some(rect) = bbox {
            params.push(("boundary.rect.min_lon", rect.min().x.to_string()));
            params.push(("boundary.rect.min_lat", rect.min().y.to_string()));
            params.push(("boundary.rect.max_lon", rect.max().x.to_string()));
            params.push(("boundary.rect.max_lat", rect.max().y.to_string()));
        }

        let response = self.authorize(self.http.get(&url)).query(&params).send().await?;
        let body: serde_json::Value = check_response_json(response).await?;

        let places = parse_places(body)?;
        tracing::debug!(count = places.len(), "Place search results");
        Ok(places)
    }

    async fn try_get_directions(
        &self,
        start: Coordinates,
        end: Coordinates,
        profile: &str,
    ) -> Result<serde_json::Value, UpstreamError> {
        let url = format!("{}/v2/directions/{}", self.base_url, profile);
        let body = serde_json::json!({
            "coordinates": [start.to_lng_lat(), end.to_lng_lat()],
        });

        let response = self.authorize(self.http.post(&url)).json(&body).send().await?;
        check_response_json(response).await
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

/// Map a geocoding FeatureCollection to places. Features without a name or
/// a point geometry are skipped.
fn parse_places(body: serde_json::Value) -> Result<Vec<Place>, UpstreamError> {
    let geojson =
        GeoJson::from_json_value(body).map_err(|e| UpstreamError::Parse(e.to_string()))?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(UpstreamError::Parse(
            "expected a FeatureCollection".to_string(),
        ));
    };

    let mut places = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(name) = feature.property("name").and_then(|v| v.as_str()) else {
            continue;
        };
        let name = name.to_string();

        let address = feature
            .property("label")
            .or_else(|| feature.property("formatted"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        let category = feature
            .property("category")
            .or_else(|| feature.property("layer"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        let Some(geometry) = feature.geometry else {
            continue;
        };
        let Ok(point) = Point::<f64>::try_from(geometry.value) else {
            continue;
        };

        places.push(Place {
            name,
            address,
            coordinates: Coordinates::new(point.y(), point.x()),
            category,
        });
    }

    Ok(places)
}
