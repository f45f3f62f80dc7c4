// src/lib.rs

use axum::{routing::get, Router};
use sqlx::SqlitePool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod aggregate;
pub mod charts;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod report;
pub mod routes;

pub use error::{KpiError, Result};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

/// Dashboard page plus the JSON endpoints behind it.
pub fn build_router(state: AppState) -> Router {
    // The JSON API is read-only; allow any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // health
        .route("/health", get(routes::health::health))
        // interactive page
        .route("/", get(routes::dashboard::index))
        // json
        .route("/api/v1/departments", get(routes::kpi::list_departments))
        .route("/api/v1/kpi", get(routes::kpi::get_kpi))
        // state & middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
