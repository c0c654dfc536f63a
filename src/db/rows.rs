// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Raw table rows and their conversion into models.
//!
//! Dates, timestamps and JSON documents are stored as text and decoded on
//! every read. Anything that fails to decode is reported as an internal
//! error rather than silently defaulted.

use crate::error::AppError;
use crate::models::{
    Activity, ActivityCategory, Coordinates, Expense, TravelPlan, User,
};
use crate::time_utils::{parse_date, parse_timestamp};
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PlanRow {
    pub id: String,
    pub user_id: String,
    pub destination: String,
    pub budget: f64,
    pub duration: u32,
    pub interests: String,
    pub start_date: String,
    pub end_date: String,
    pub itinerary: String,
    pub total_cost: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ActivityRow {
    pub id: String,
    pub plan_id: String,
    pub name: String,
    pub description: String,
    pub location: Option<String>,
    pub cost: f64,
    pub duration: u32,
    pub category: String,
    pub day: u32,
    pub time_slot: String,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ExpenseRow {
    pub id: String,
    pub plan_id: String,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub date: String,
    pub created_at: String,
}

fn corrupt(what: &str, raw: &str) -> AppError {
    AppError::Internal(anyhow::anyhow!("Corrupt stored {}: {:?}", what, raw))
}

fn timestamp(raw: &str) -> Result<DateTime<Utc>, AppError> {
    parse_timestamp(raw).ok_or_else(|| corrupt("timestamp", raw))
}

fn date(raw: &str) -> Result<NaiveDate, AppError> {
    parse_date(raw).ok_or_else(|| corrupt("date", raw))
}

/// Decode a stored location. Rows written by the previous backend use `{}`
/// for "no location", which reads back as `None`.
fn location(raw: Option<&str>) -> Result<Option<Coordinates>, AppError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value: serde_json::Value = serde_json::from_str(raw)?;
    match &value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) if map.is_empty() => Ok(None),
        _ => Ok(Some(serde_json::from_value(value)?)),
    }
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            created_at: timestamp(&row.created_at)?,
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
        })
    }
}

impl TryFrom<PlanRow> for TravelPlan {
    type Error = AppError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        Ok(TravelPlan {
            interests: serde_json::from_str(&row.interests)?,
            itinerary: serde_json::from_str(&row.itinerary)?,
            start_date: date(&row.start_date)?,
            end_date: date(&row.end_date)?,
            created_at: timestamp(&row.created_at)?,
            updated_at: timestamp(&row.updated_at)?,
            id: row.id,
            user_id: row.user_id,
            destination: row.destination,
            budget: row.budget,
            duration: row.duration,
            total_cost: row.total_cost,
        })
    }
}

impl TryFrom<ActivityRow> for Activity {
    type Error = AppError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        Ok(Activity {
            location: location(row.location.as_deref())?,
            category: ActivityCategory::parse(&row.category),
            id: row.id,
            plan_id: row.plan_id,
            name: row.name,
            description: row.description,
            cost: row.cost,
            duration: row.duration,
            day: row.day,
            time_slot: row.time_slot,
        })
    }
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = AppError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        Ok(Expense {
            date: date(&row.date)?,
            created_at: timestamp(&row.created_at)?,
            id: row.id,
            plan_id: row.plan_id,
            category: row.category,
            amount: row.amount,
            description: row.description,
        })
    }
}

/// Convert a batch of rows, failing on the first corrupt one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, AppError>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}
