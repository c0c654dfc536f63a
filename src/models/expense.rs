// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Expense model for storage and API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Money spent against a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    pub id: String,
    pub plan_id: String,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub plan_id: String,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub date: NaiveDate,
}

/// Partial update of an expense. The parent plan cannot be changed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ExpensePatch {
    #[validate(length(min = 1))]
    pub category: Option<String>,
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.amount.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }
}
