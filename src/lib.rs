// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Travel Planner: accounts, trip plans, activities and expenses
//!
//! This crate provides the backend API for a travel-planning app, with
//! itinerary drafting through a generative model and place search and
//! routing through OpenRouteService.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::{
    upstream::http_client, CredentialStore, ItineraryService, OpenRouteService, PasswordHasher,
    TokenService,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub tokens: TokenService,
    pub credentials: CredentialStore,
    pub itinerary: ItineraryService,
    pub openroute: OpenRouteService,
}

impl AppState {
    /// Wire up every service from configuration and an open database.
    pub fn new(config: Config, db: Database) -> anyhow::Result<Self> {
        let http = http_client(config.http_timeout)?;
        let hasher = PasswordHasher::new(config.password_hash_iterations)?;

        Ok(Self {
            tokens: TokenService::new(&config.jwt_signing_key, config.token_ttl_hours),
            credentials: CredentialStore::new(db.clone(), hasher),
            itinerary: ItineraryService::new(
                http.clone(),
                config.gemini_base_url.clone(),
                config.gemini_model.clone(),
                config.gemini_api_key.clone(),
            ),
            openroute: OpenRouteService::new(
                http,
                config.ors_base_url.clone(),
                config.ors_api_key.clone(),
            ),
            db,
            config,
        })
    }
}
