// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity routes. Every operation goes through the parent plan's owner.

use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::AuthUser;
use crate::models::activity::{DEFAULT_DAY, DEFAULT_DURATION_HOURS, DEFAULT_TIME_SLOT};
use crate::models::{Activity, ActivityCategory, ActivityPatch, Coordinates, NewActivity};
use crate::routes::{required, MessageResponse, PlanScope};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

const PLAN_NOT_FOUND: &str = "Travel plan not found";
const NOT_FOUND: &str = "Activity not found";

/// Activity routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(list_activities).post(create_activity))
        .route(
            "/api/activities/{id}",
            put(update_activity).delete(delete_activity),
        )
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateActivityRequest {
    pub plan_id: Option<String>,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(nested)]
    pub location: Option<Coordinates>,
    #[validate(range(min = 0.0))]
    pub cost: Option<f64>,
    #[validate(range(min = 1))]
    pub duration: Option<u32>,
    pub category: Option<ActivityCategory>,
    #[validate(range(min = 1))]
    pub day: Option<u32>,
    #[validate(length(min = 1))]
    pub time_slot: Option<String>,
}

impl CreateActivityRequest {
    /// Apply defaults for everything but the plan and the name.
    fn into_new_activity(self) -> Result<NewActivity> {
        if self.plan_id.as_deref().map_or(true, str::is_empty) {
            return Err(AppError::BadRequest("plan_id required".to_string()));
        }
        self.validate()?;

        Ok(NewActivity {
            plan_id: required(self.plan_id)?,
            name: required(self.name)?,
            description: self.description.unwrap_or_default(),
            location: self.location,
            cost: self.cost.unwrap_or(0.0),
            duration: self.duration.unwrap_or(DEFAULT_DURATION_HOURS),
            category: self.category.unwrap_or_default(),
            day: self.day.unwrap_or(DEFAULT_DAY),
            time_slot: self
                .time_slot
                .unwrap_or_else(|| DEFAULT_TIME_SLOT.to_string()),
        })
    }
}

/// List a plan's activities in schedule order.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(scope): ApiQuery<PlanScope>,
) -> Result<Json<Vec<Activity>>> {
    let plan_id = scope.plan_id()?;
    let activities = state
        .db
        .list_activities(&user.user_id, plan_id)
        .await?
        .or_not_found(PLAN_NOT_FOUND)?;
    Ok(Json(activities))
}

async fn create_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<CreateActivityRequest>,
) -> Result<(StatusCode, Json<Activity>)> {
    let new_activity = body.into_new_activity()?;
    let activity = state
        .db
        .create_activity(&user.user_id, new_activity)
        .await?
        .or_not_found(PLAN_NOT_FOUND)?;
    Ok((StatusCode::CREATED, Json(activity)))
}

async fn update_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ActivityPatch>,
) -> Result<Json<Activity>> {
    patch.validate()?;

    let activity = state
        .db
        .update_activity(&user.user_id, &id, patch)
        .await?
        .or_not_found(NOT_FOUND)?;
    Ok(Json(activity))
}

async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state
        .db
        .delete_activity(&user.user_id, &id)
        .await?
        .or_not_found(NOT_FOUND)?;
    Ok(Json(MessageResponse::new("Activity deleted successfully")))
}
