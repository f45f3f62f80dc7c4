// src/routes/health.rs

use axum::{extract::State, Json};
use serde::Serialize;
use sqlx::query_scalar;
use tracing::warn;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResp {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResp> {
    let database = match query_scalar::<_, i64>("SELECT 1").fetch_one(&state.pool).await {
        Ok(_) => "ok",
        Err(e) => {
            warn!(error = %e, "health probe could not reach the data source");
            "unavailable"
        }
    };
    Json(HealthResp { status: "ok", version: "v1", database })
}
