//! Wage payment record and settlement summary models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wage payment record status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WagePaymentStatus {
    Pending,
    PartiallyPaid,
    Paid,
    Cancelled,
}

impl WagePaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WagePaymentStatus::Pending => "pending",
            WagePaymentStatus::PartiallyPaid => "partially_paid",
            WagePaymentStatus::Paid => "paid",
            WagePaymentStatus::Cancelled => "cancelled",
        }
    }

}

/// Wages owed to a staff member for a period, and what has been paid
/// against them. Carries the contributing work entries for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WagePaymentRecord {
    pub payment_id: Uuid,
    pub staff_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub amount_due: Decimal,
    pub amount_paid: Decimal,
    pub status: WagePaymentStatus,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub work_entry_ids: Vec<Uuid>,
    pub created_utc: DateTime<Utc>,
}

/// Input for recording a (possibly partial) payment against a wage record.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordWagePayment {
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_reference: Option<String>,
}

/// Per-staff wage reconciliation over a period.
#[derive(Debug, Clone, Serialize)]
pub struct StaffWagesSummary {
    pub staff_id: Uuid,
    pub staff_name: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_hours_worked: Decimal,
    pub total_wages_due: Decimal,
    pub total_paid: Decimal,
    /// May be negative when overpaid; deliberately not clamped.
    pub total_outstanding: Decimal,
    pub last_payment_date: Option<NaiveDate>,
    pub work_entries_count: usize,
}

/// A per-staff failure inside a payment generation run.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRunFailure {
    pub staff_id: Uuid,
    pub reason: String,
}

/// Outcome of a payment generation run: creations that succeeded stand
/// even when other staff members failed.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRunOutcome {
    pub created: Vec<WagePaymentRecord>,
    pub failures: Vec<PaymentRunFailure>,
}
