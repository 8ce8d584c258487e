//! Wage settlement handlers.

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
        PaymentRunOutcome, RecordWagePayment, StaffWagesSummary, WagePaymentRecord,
        WagePaymentStatus,
    },
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListWagePaymentsQuery {
    pub staff_id: Option<Uuid>,
    pub status: Option<WagePaymentStatus>,
}

pub async fn wages_summary(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<StaffWagesSummary>>, AppError> {
    let summaries = state
        .db
        .wages_summary(query.period_start, query.period_end)
        .await?;
    Ok(Json(summaries))
}

pub async fn generate_payments(
    State(state): State<AppState>,
    Json(payload): Json<PeriodQuery>,
) -> Result<(StatusCode, Json<PaymentRunOutcome>), AppError> {
    let outcome = state
        .db
        .generate_payments_for_period(payload.period_start, payload.period_end)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn list_wage_payments(
    State(state): State<AppState>,
    Query(query): Query<ListWagePaymentsQuery>,
) -> Result<Json<Vec<WagePaymentRecord>>, AppError> {
    let records = state
        .db
        .list_wage_payments(query.staff_id, query.status)
        .await?;
    Ok(Json(records))
}

pub async fn record_wage_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<RecordWagePayment>,
) -> Result<Json<WagePaymentRecord>, AppError> {
    let record = state.db.record_wage_payment(payment_id, payload).await?;
    Ok(Json(record))
}

pub async fn cancel_wage_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<WagePaymentRecord>, AppError> {
    let record = state.db.cancel_wage_payment(payment_id).await?;
    Ok(Json(record))
}
