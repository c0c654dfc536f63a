// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Travel plan routes.

use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::AuthUser;
use crate::models::plan::REVERSED_DATES;
use crate::models::{NewPlan, PlanPatch, TravelPlan};
use crate::routes::{required, MessageResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

const NOT_FOUND: &str = "Travel plan not found";

/// Plan routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/travel-plans", get(list_plans).post(create_plan))
        .route(
            "/api/travel-plans/{id}",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
}

#[derive(Debug, Deserialize)]
pub struct ListPlansParams {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlanRequest {
    #[validate(length(min = 1))]
    pub destination: Option<String>,
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    #[validate(range(min = 1))]
    pub duration: Option<u32>,
    pub interests: Option<Vec<String>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl CreatePlanRequest {
    fn into_new_plan(self) -> Result<NewPlan> {
        self.validate()?;
        Ok(NewPlan {
            destination: required(self.destination)?,
            budget: required(self.budget)?,
            duration: required(self.duration)?,
            interests: required(self.interests)?,
            start_date: required(self.start_date)?,
            end_date: required(self.end_date)?,
        })
    }
}

/// List the caller's plans, newest first.
///
/// `user_id` may be given but must name the caller.
async fn list_plans(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<ListPlansParams>,
) -> Result<Json<Vec<TravelPlan>>> {
    if let Some(requested) = params.user_id {
        if requested != user.user_id {
            tracing::warn!(user_id = %user.user_id, "Attempt to list another user's plans");
            return Err(AppError::Forbidden(
                "Cannot access another user's plans".to_string(),
            ));
        }
    }

    let plans = state.db.list_plans(&user.user_id).await?;
    Ok(Json(plans))
}

async fn create_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<CreatePlanRequest>,
) -> Result<(StatusCode, Json<TravelPlan>)> {
    let new_plan = body.into_new_plan()?;
    if new_plan.end_date < new_plan.start_date {
        return Err(AppError::BadRequest(REVERSED_DATES.to_string()));
    }

    let plan = state.db.create_plan(&user.user_id, new_plan).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn get_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<TravelPlan>> {
    let plan = state
        .db
        .get_plan(&user.user_id, &id)
        .await?
        .or_not_found(NOT_FOUND)?;
    Ok(Json(plan))
}

/// Partially update a plan. Unrecognized fields are ignored, and the
/// resulting date range must still be in order.
async fn update_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<PlanPatch>,
) -> Result<Json<TravelPlan>> {
    patch.validate()?;

    let plan = state
        .db
        .update_plan(&user.user_id, &id, patch)
        .await?
        .or_not_found(NOT_FOUND)?;
    Ok(Json(plan))
}

/// Delete a plan and everything attached to it.
async fn delete_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state
        .db
        .delete_plan(&user.user_id, &id)
        .await?
        .or_not_found(NOT_FOUND)?;

    Ok(Json(MessageResponse::new("Travel plan deleted successfully")))
}
