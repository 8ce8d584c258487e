//! Daily allocation summary model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Per-staff rollup of a day's logged work against contracted hours.
/// A derived, read-only view; one row per active staff member.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub staff_id: Uuid,
    pub staff_name: String,
    pub date: NaiveDate,
    pub total_tasks: u32,
    pub total_hours: Decimal,
    pub allocated_hours: Decimal,
    pub total_cost: Decimal,
    pub hours_variance: Decimal,
    pub over_allocated: bool,
    pub under_allocated: bool,
}
