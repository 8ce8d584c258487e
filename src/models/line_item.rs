//! Invoice line item and additional cost models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot of a work entry's figures at the moment it was attached to an
/// invoice. Never recomputed, even if the work entry is later edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    pub line_item_id: Uuid,
    pub invoice_id: Uuid,
    pub work_entry_id: Uuid,
    /// Base plus overtime hours at attach time.
    pub hours_worked: Decimal,
    pub labor_cost: Decimal,
    pub client_cost: Decimal,
    pub created_utc: DateTime<Utc>,
}

/// Extra billable cost on an invoice (materials, travel, and so on).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditionalCost {
    pub cost_id: Uuid,
    pub invoice_id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
    pub created_utc: DateTime<Utc>,
}

/// Input for adding an additional cost to a draft invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdditionalCost {
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
}
