// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod expense;
pub mod itinerary;
pub mod place;
pub mod plan;
pub mod user;

pub use activity::{Activity, ActivityCategory, ActivityPatch, NewActivity};
pub use expense::{Expense, ExpensePatch, NewExpense};
pub use itinerary::{
    BudgetBreakdown, GeneratedItinerary, ItineraryDay, ItineraryDocument, ItinerarySource,
    PlannedActivity,
};
pub use place::{Coordinates, Place};
pub use plan::{NewPlan, PlanPatch, TravelPlan};
pub use user::{PublicUser, User};
