// src/routes/kpi.rs

use axum::{extract::{Query, State}, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::aggregate::{compute_views, department_options, filter_rows, DepartmentFilter};
use crate::{db, error::KpiError, models::KpiViews, AppState};
use super::internal_error;

#[derive(Debug, Default, Deserialize)]
pub struct KpiQ {
    pub department: Option<String>,
}

impl KpiQ {
    pub fn filter(&self) -> DepartmentFilter {
        DepartmentFilter::from_param(self.department.as_deref())
    }
}

/// Reloads the joined table and recomputes every view for `filter`.
/// Also returns the dropdown options, taken from the unfiltered rows.
pub async fn load_views(
    pool: &SqlitePool,
    filter: &DepartmentFilter,
) -> Result<(Vec<String>, KpiViews), KpiError> {
    let dataset = db::load_dataset(pool).await?;
    let options = department_options(&dataset.rows);
    let rows = filter_rows(&dataset.rows, filter);
    debug!(department = filter.label(), rows = rows.len(), "recomputing views");
    Ok((options, compute_views(&rows)))
}

/// GET /api/v1/kpi?department=
pub async fn get_kpi(
    State(state): State<AppState>,
    Query(q): Query<KpiQ>,
) -> Result<Json<KpiViews>, (axum::http::StatusCode, String)> {
    let (_, views) = load_views(&state.pool, &q.filter()).await.map_err(internal_error)?;
    Ok(Json(views))
}

/// GET /api/v1/departments
pub async fn list_departments(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, (axum::http::StatusCode, String)> {
    let dataset = db::load_dataset(&state.pool).await.map_err(internal_error)?;
    Ok(Json(department_options(&dataset.rows)))
}
