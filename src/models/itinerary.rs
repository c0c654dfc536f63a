// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Day-by-day itinerary document produced by the generator.

use super::activity::ActivityCategory;
use super::place::Coordinates;
use serde::{Deserialize, Serialize};

/// A full itinerary draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDocument {
    pub days: Vec<ItineraryDay>,
    pub total_estimated_cost: f64,
    pub budget_breakdown: BudgetBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day: u32,
    pub activities: Vec<PlannedActivity>,
}

/// One entry in a day of the itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedActivity {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Start time, `HH:MM`
    pub time: String,
    /// Hours
    pub duration: f64,
    pub cost: f64,
    #[serde(default)]
    pub category: ActivityCategory,
    #[serde(default)]
    pub location: Option<Coordinates>,
}

/// How the budget splits across spending categories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub accommodation: f64,
    pub food: f64,
    pub activities: f64,
    pub transportation: f64,
}

impl BudgetBreakdown {
    pub fn total(&self) -> f64 {
        self.accommodation + self.food + self.activities + self.transportation
    }
}

/// Where a generated itinerary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItinerarySource {
    /// Parsed from the language model's reply
    Ai,
    /// Synthesized locally
    Fallback,
}

/// Generator output as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedItinerary {
    #[serde(flatten)]
    pub document: ItineraryDocument,
    pub source: ItinerarySource,
}
