// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Expense routes. Every operation goes through the parent plan's owner.

use crate::error::Result;
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::AuthUser;
use crate::models::{Expense, ExpensePatch, NewExpense};
use crate::routes::{required, MessageResponse, PlanScope};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

const PLAN_NOT_FOUND: &str = "Travel plan not found";
const NOT_FOUND: &str = "Expense not found";

/// Expense routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/expenses", get(list_expenses).post(create_expense))
        .route(
            "/api/expenses/{id}",
            put(update_expense).delete(delete_expense),
        )
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpenseRequest {
    #[validate(length(min = 1))]
    pub plan_id: Option<String>,
    #[validate(length(min = 1))]
    pub category: Option<String>,
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl CreateExpenseRequest {
    fn into_new_expense(self) -> Result<NewExpense> {
        self.validate()?;
        Ok(NewExpense {
            plan_id: required(self.plan_id)?,
            category: required(self.category)?,
            amount: required(self.amount)?,
            description: required(self.description)?,
            date: required(self.date)?,
        })
    }
}

/// List a plan's expenses, most recent date first.
async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(scope): ApiQuery<PlanScope>,
) -> Result<Json<Vec<Expense>>> {
    let plan_id = scope.plan_id()?;
    let expenses = state
        .db
        .list_expenses(&user.user_id, plan_id)
        .await?
        .or_not_found(PLAN_NOT_FOUND)?;
    Ok(Json(expenses))
}

async fn create_expense(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>)> {
    let new_expense = body.into_new_expense()?;
    let expense = state
        .db
        .create_expense(&user.user_id, new_expense)
        .await?
        .or_not_found(PLAN_NOT_FOUND)?;
    Ok((StatusCode::CREATED, Json(expense)))
}

async fn update_expense(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ExpensePatch>,
) -> Result<Json<Expense>> {
    patch.validate()?;

    let expense = state
        .db
        .update_expense(&user.user_id, &id, patch)
        .await?
        .or_not_found(NOT_FOUND)?;
    Ok(Json(expense))
}

async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state
        .db
        .delete_expense(&user.user_id, &id)
        .await?
        .or_not_found(NOT_FOUND)?;
    Ok(Json(MessageResponse::new("Expense deleted successfully")))
}
