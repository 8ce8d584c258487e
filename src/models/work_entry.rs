//! Work entry model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A logged unit of labor. Cost figures are derived at create/update time
/// from the staff member's pay structure; once a non-cancelled invoice
/// snapshots the entry, later edits never touch that snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkEntry {
    pub entry_id: Uuid,
    pub staff_id: Uuid,
    pub client_id: Uuid,
    pub job_id: Option<Uuid>,
    pub date: NaiveDate,
    pub task_description: String,
    pub hours_worked: Decimal,
    pub overtime_hours: Decimal,
    /// Whether the staff pay override was requested for this entry.
    pub use_pay_override: bool,
    pub labor_cost: Decimal,
    /// Client-facing fixed price, when agreed.
    pub override_cost: Option<Decimal>,
    pub client_cost: Decimal,
    pub margin_amount: Decimal,
    pub margin_percentage: Decimal,
    pub notes: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Input for logging a work entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkEntry {
    pub staff_id: Uuid,
    pub client_id: Uuid,
    #[serde(default)]
    pub job_id: Option<Uuid>,
    pub date: NaiveDate,
    pub task_description: String,
    pub hours_worked: Decimal,
    #[serde(default)]
    pub overtime_hours: Decimal,
    #[serde(default)]
    pub use_pay_override: bool,
    #[serde(default)]
    pub override_cost: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Input for editing a work entry. `None` keeps the stored value, except
/// `override_cost` which replaces it outright (passing `None` clears it).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWorkEntry {
    pub date: Option<NaiveDate>,
    pub task_description: Option<String>,
    pub hours_worked: Option<Decimal>,
    pub overtime_hours: Option<Decimal>,
    pub use_pay_override: Option<bool>,
    #[serde(default)]
    pub override_cost: Option<Decimal>,
    pub notes: Option<String>,
}

/// Filter parameters for listing work entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkEntryFilter {
    pub date: Option<NaiveDate>,
    pub staff_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
