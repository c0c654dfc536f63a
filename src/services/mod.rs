// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod credentials;
pub mod itinerary;
pub mod openroute;
pub mod password;
pub mod token;
pub mod upstream;

pub use credentials::CredentialStore;
pub use itinerary::{ItineraryRequest, ItineraryService};
pub use openroute::OpenRouteService;
pub use password::PasswordHasher;
pub use token::{AuthError, TokenService};
