// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Travel Planner API Server
//!
//! Serves accounts, travel plans, activities and expenses, plus itinerary
//! drafting and place search backed by external APIs.

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use travel_planner::{config::Config, db::Database, routes::create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(port = config.port, "Starting Travel Planner API");

    // Open the database and bring the schema up to date
    let db = Database::connect(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to open database")?;
    db.migrate().await.context("Failed to run migrations")?;
    tracing::info!("Database migrations applied");

    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set, itineraries will use the fallback template");
    }
    if config.ors_api_key.is_none() {
        tracing::warn!("ORS_API_KEY not set, OpenRouteService requests are unauthenticated");
    }

    // Build shared state
    let port = config.port;
    let state = Arc::new(AppState::new(config, db)?);

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("travel_planner=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
