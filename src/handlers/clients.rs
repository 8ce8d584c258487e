//! Client roster handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Client, CreateClient},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListClientsQuery {
    #[serde(default)]
    pub active_only: bool,
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<CreateClient>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    let client = state.db.create_client(payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Client>, AppError> {
    let client = state.db.get_client(client_id).await?;
    Ok(Json(client))
}

pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ListClientsQuery>,
) -> Result<Json<Vec<Client>>, AppError> {
    let clients = state.db.list_clients(query.active_only).await?;
    Ok(Json(clients))
}
