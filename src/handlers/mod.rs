//! HTTP handlers. Thin adapters over the store: extract, delegate,
//! serialize. All business rules live in the services layer.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

pub mod clients;
pub mod invoices;
pub mod staff;
pub mod wages;
pub mod work_entries;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": state.config.service_name })),
    )
}
