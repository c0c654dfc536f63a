// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Travel plan model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Rejection message for a plan that would end before it starts.
pub const REVERSED_DATES: &str = "end_date must not be before start_date";

/// A user's trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelPlan {
    pub id: String,
    /// Owning user; never changes
    pub user_id: String,
    pub destination: String,
    pub budget: f64,
    /// Length in days
    pub duration: u32,
    /// Interest tags in the order the user gave them
    pub interests: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Free-form itinerary document, `{}` until one is saved
    pub itinerary: serde_json::Value,
    pub total_cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new plan.
#[derive(Debug, Clone)]
pub struct NewPlan {
    pub destination: String,
    pub budget: f64,
    pub duration: u32,
    pub interests: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Partial update of a plan. Absent members are left untouched; unknown
/// input keys are ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PlanPatch {
    #[validate(length(min = 1))]
    pub destination: Option<String>,
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    #[validate(range(min = 1))]
    pub duration: Option<u32>,
    pub interests: Option<Vec<String>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub itinerary: Option<serde_json::Value>,
    #[validate(range(min = 0.0))]
    pub total_cost: Option<f64>,
}

impl PlanPatch {
    pub fn is_empty(&self) -> bool {
        self.destination.is_none()
            && self.budget.is_none()
            && self.duration.is_none()
            && self.interests.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.itinerary.is_none()
            && self.total_cost.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_ignores_unknown_keys() {
        let patch: PlanPatch = serde_json::from_value(json!({
            "user_id": "someone-else",
            "id": "other",
            "budget": 250.0
        }))
        .unwrap();

        assert_eq!(patch.budget, Some(250.0));
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_empty_patch() {
        let patch: PlanPatch = serde_json::from_value(json!({ "created_at": "x" })).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_patch_validation() {
        let patch = PlanPatch {
            duration: Some(0),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = PlanPatch {
            destination: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
