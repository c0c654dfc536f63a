// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity model for storage and API.

use super::place::Coordinates;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub const DEFAULT_DURATION_HOURS: u32 = 1;
pub const DEFAULT_DAY: u32 = 1;
pub const DEFAULT_TIME_SLOT: &str = "09:00";

/// Kind of activity. Values outside the known set read back as `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Sightseeing,
    Dining,
    Entertainment,
    Shopping,
    Culture,
    #[default]
    #[serde(other)]
    Other,
}

impl ActivityCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityCategory::Sightseeing => "sightseeing",
            ActivityCategory::Dining => "dining",
            ActivityCategory::Entertainment => "entertainment",
            ActivityCategory::Shopping => "shopping",
            ActivityCategory::Culture => "culture",
            ActivityCategory::Other => "other",
        }
    }

    /// Lenient parse used when reading stored rows.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "sightseeing" => ActivityCategory::Sightseeing,
            "dining" => ActivityCategory::Dining,
            "entertainment" => ActivityCategory::Entertainment,
            "shopping" => ActivityCategory::Shopping,
            "culture" => ActivityCategory::Culture,
            _ => ActivityCategory::Other,
        }
    }
}

/// Stored activity attached to a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub id: String,
    pub plan_id: String,
    pub name: String,
    pub description: String,
    pub location: Option<Coordinates>,
    pub cost: f64,
    /// Length in hours
    pub duration: u32,
    pub category: ActivityCategory,
    /// 1-based day of the trip
    pub day: u32,
    /// Start time, `HH:MM`
    pub time_slot: String,
}

/// Input for a new activity, defaults already applied.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub plan_id: String,
    pub name: String,
    pub description: String,
    pub location: Option<Coordinates>,
    pub cost: f64,
    pub duration: u32,
    pub category: ActivityCategory,
    pub day: u32,
    pub time_slot: String,
}

/// Partial update of an activity. The parent plan cannot be changed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ActivityPatch {
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

impl ActivityPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.cost.is_none()
            && self.duration.is_none()
            && self.category.is_none()
            && self.day.is_none()
            && self.time_slot.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_category_is_other() {
        let category: ActivityCategory = serde_json::from_str("\"skydiving\"").unwrap();
        assert_eq!(category, ActivityCategory::Other);
        assert_eq!(ActivityCategory::parse("skydiving"), ActivityCategory::Other);
    }

    #[test]
    fn test_category_round_trip() {
        for category in [
            ActivityCategory::Sightseeing,
            ActivityCategory::Dining,
            ActivityCategory::Entertainment,
            ActivityCategory::Shopping,
            ActivityCategory::Culture,
            ActivityCategory::Other,
        ] {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            assert_eq!(ActivityCategory::parse(category.as_str()), category);
        }
    }

    #[test]
    fn test_patch_rejects_bad_location() {
        let patch = ActivityPatch {
            location: Some(Coordinates::new(95.0, 0.0)),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
