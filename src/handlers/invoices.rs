//! Invoice lifecycle handlers.

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
    models::{
        AdditionalCost, CreateAdditionalCost, CreateInvoice, Invoice, InvoiceLineItem,
        InvoicePayment, ListInvoicesFilter,
    },
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct SweepOverdueQuery {
    pub as_of: NaiveDate,
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoice>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    let invoice = state.db.create_invoice(payload).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = state.db.get_invoice(invoice_id).await?;
    Ok(Json(invoice))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(filter): Query<ListInvoicesFilter>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    let invoices = state.db.list_invoices(&filter).await?;
    Ok(Json(invoices))
}

pub async fn list_line_items(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<Vec<InvoiceLineItem>>, AppError> {
    let items = state.db.list_line_items(invoice_id).await?;
    Ok(Json(items))
}

pub async fn remove_line_item(
    State(state): State<AppState>,
    Path((invoice_id, line_item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = state.db.remove_line_item(invoice_id, line_item_id).await?;
    Ok(Json(invoice))
}

pub async fn list_additional_costs(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<Vec<AdditionalCost>>, AppError> {
    let costs = state.db.list_additional_costs(invoice_id).await?;
    Ok(Json(costs))
}

pub async fn add_additional_cost(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<CreateAdditionalCost>,
) -> Result<(StatusCode, Json<AdditionalCost>), AppError> {
    let cost = state.db.add_additional_cost(invoice_id, payload).await?;
    Ok((StatusCode::CREATED, Json(cost)))
}

pub async fn remove_additional_cost(
    State(state): State<AppState>,
    Path((invoice_id, cost_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = state.db.remove_additional_cost(invoice_id, cost_id).await?;
    Ok(Json(invoice))
}

pub async fn issue_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = state.db.issue_invoice(invoice_id).await?;
    Ok(Json(invoice))
}

pub async fn record_payment(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<InvoicePayment>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = state.db.record_invoice_payment(invoice_id, payload).await?;
    Ok(Json(invoice))
}

pub async fn cancel_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = state.db.cancel_invoice(invoice_id).await?;
    Ok(Json(invoice))
}

/// Periodic overdue sweep, exposed for the scheduler to call.
pub async fn sweep_overdue(
    State(state): State<AppState>,
    Query(query): Query<SweepOverdueQuery>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    let flipped = state.db.sweep_overdue(query.as_of).await?;
    Ok(Json(flipped))
}
