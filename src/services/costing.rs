//! Cost calculator: pay structure plus hours worked to labor cost, client
//! cost and margin.
//!
//! All figures are rounded to 2 decimal places, half-to-even. Degenerate
//! inputs (zero hours, zero allocated hours) yield zero cost rather than an
//! error, because callers compute speculatively while an entry is being
//! composed.

use rust_decimal::Decimal;

use crate::models::{PayStructure, StaffMember};

/// Working days assumed per month when converting a monthly salary to a
/// day rate. Fixed for now; per-staff or per-calendar configurability is an
/// open product decision.
pub const MONTHLY_WORKING_DAYS: u32 = 22;

const MONEY_DP: u32 = 2;

/// Derived cost figures for a single work entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryCosts {
    pub labor_cost: Decimal,
    pub client_cost: Decimal,
    pub margin_amount: Decimal,
    pub margin_percentage: Decimal,
}

/// Effective hourly rate for a staff member.
pub fn hourly_rate(staff: &StaffMember) -> Decimal {
    if staff.allocated_daily_hours <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match staff.pay {
        PayStructure::PerDay { rate } => rate / staff.allocated_daily_hours,
        PayStructure::PerMonth { rate } => {
            rate / (Decimal::from(MONTHLY_WORKING_DAYS) * staff.allocated_daily_hours)
        }
    }
}

/// Labor cost for the given hours. When `use_pay_override` is set and the
/// staff member carries an override amount, that amount replaces the
/// computed cost wholesale. Overtime hours are paid at the staff member's
/// overtime multiplier.
pub fn labor_cost(
    staff: &StaffMember,
    hours_worked: Decimal,
    overtime_hours: Decimal,
    use_pay_override: bool,
) -> Decimal {
    if use_pay_override {
        if let Some(amount) = staff.pay_override {
            return amount.round_dp(MONEY_DP);
        }
    }

    let rate = hourly_rate(staff);
    let base = hours_worked.max(Decimal::ZERO) * rate;
    let overtime = overtime_hours.max(Decimal::ZERO) * rate * staff.overtime_multiplier;
    (base + overtime).round_dp(MONEY_DP)
}

/// Client-facing cost: the override price when set and positive, otherwise
/// the labor cost (zero-margin default).
pub fn client_cost(labor_cost: Decimal, override_cost: Option<Decimal>) -> Decimal {
    match override_cost {
        Some(price) if price > Decimal::ZERO => price.round_dp(MONEY_DP),
        _ => labor_cost,
    }
}

/// Margin amount and percentage. Percentage is zero when the client cost
/// is not positive.
pub fn margin(labor_cost: Decimal, client_cost: Decimal) -> (Decimal, Decimal) {
    let amount = (client_cost - labor_cost).round_dp(MONEY_DP);
    let percentage = if client_cost > Decimal::ZERO {
        (amount * Decimal::ONE_HUNDRED / client_cost).round_dp(MONEY_DP)
    } else {
        Decimal::ZERO
    };
    (amount, percentage)
}

/// Full cost derivation for a work entry.
pub fn entry_costs(
    staff: &StaffMember,
    hours_worked: Decimal,
    overtime_hours: Decimal,
    override_cost: Option<Decimal>,
    use_pay_override: bool,
) -> EntryCosts {
    let labor = labor_cost(staff, hours_worked, overtime_hours, use_pay_override);
    let client = client_cost(labor, override_cost);
    let (margin_amount, margin_percentage) = margin(labor, client);
    EntryCosts {
        labor_cost: labor,
        client_cost: client,
        margin_amount,
        margin_percentage,
    }
}
