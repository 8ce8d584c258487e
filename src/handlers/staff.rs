//! Staff roster handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{CreateStaff, StaffMember, UpdateStaff},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListStaffQuery {
    #[serde(default)]
    pub active_only: bool,
}

pub async fn create_staff(
    State(state): State<AppState>,
    Json(payload): Json<CreateStaff>,
) -> Result<(StatusCode, Json<StaffMember>), AppError> {
    let member = state.db.create_staff(payload).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn get_staff(
    State(state): State<AppState>,
    Path(staff_id): Path<Uuid>,
) -> Result<Json<StaffMember>, AppError> {
    let member = state.db.get_staff(staff_id).await?;
    Ok(Json(member))
}

pub async fn update_staff(
    State(state): State<AppState>,
    Path(staff_id): Path<Uuid>,
    Json(payload): Json<UpdateStaff>,
) -> Result<Json<StaffMember>, AppError> {
    let member = state.db.update_staff(staff_id, payload).await?;
    Ok(Json(member))
}

pub async fn list_staff(
    State(state): State<AppState>,
    Query(query): Query<ListStaffQuery>,
) -> Result<Json<Vec<StaffMember>>, AppError> {
    let staff = state.db.list_staff(query.active_only).await?;
    Ok(Json(staff))
}
