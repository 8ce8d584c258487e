//! Staff member model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a staff member is paid. The rate is interpreted per the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PayStructure {
    /// A flat amount per contracted working day.
    PerDay { rate: Decimal },
    /// A monthly salary, converted to a day rate over the working-day
    /// constant in `services::costing`.
    PerMonth { rate: Decimal },
}

/// Staff member record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub staff_id: Uuid,
    pub name: String,
    pub pay: PayStructure,
    pub allocated_daily_hours: Decimal,
    pub overtime_multiplier: Decimal,
    /// Fixed amount that replaces the computed labor cost when a work
    /// entry asks for it.
    pub pay_override: Option<Decimal>,
    pub active: bool,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a staff member.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStaff {
    pub name: String,
    pub pay: PayStructure,
    pub allocated_daily_hours: Decimal,
    #[serde(default = "default_overtime_multiplier")]
    pub overtime_multiplier: Decimal,
    #[serde(default)]
    pub pay_override: Option<Decimal>,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Input for updating a staff member. `None` keeps the stored value,
/// except `pay_override` which replaces it outright.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStaff {
    pub name: Option<String>,
    pub pay: Option<PayStructure>,
    pub allocated_daily_hours: Option<Decimal>,
    pub overtime_multiplier: Option<Decimal>,
    #[serde(default)]
    pub pay_override: Option<Decimal>,
    pub active: Option<bool>,
}

fn default_overtime_multiplier() -> Decimal {
    Decimal::ONE
}

fn default_active() -> bool {
    true
}
