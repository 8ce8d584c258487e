//! Work entry handlers, plus the daily allocation summary view.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{CreateWorkEntry, DailySummary, UpdateWorkEntry, WorkEntry, WorkEntryFilter},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct DailySummaryQuery {
    pub date: NaiveDate,
}

pub async fn create_work_entry(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkEntry>,
) -> Result<(StatusCode, Json<WorkEntry>), AppError> {
    let entry = state.db.create_work_entry(payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_work_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<UpdateWorkEntry>,
) -> Result<Json<WorkEntry>, AppError> {
    let entry = state.db.update_work_entry(entry_id, payload).await?;
    Ok(Json(entry))
}

pub async fn delete_work_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.db.delete_work_entry(entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_work_entries(
    State(state): State<AppState>,
    Query(filter): Query<WorkEntryFilter>,
) -> Result<Json<Vec<WorkEntry>>, AppError> {
    let entries = state.db.list_work_entries(&filter).await?;
    Ok(Json(entries))
}

pub async fn daily_summary(
    State(state): State<AppState>,
    Query(query): Query<DailySummaryQuery>,
) -> Result<Json<Vec<DailySummary>>, AppError> {
    let summaries = state.db.daily_summary(query.date).await?;
    Ok(Json(summaries))
}
