//! Allocation aggregator: per-staff, per-day rollups of logged hours
//! against contracted daily hours.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{DailySummary, StaffMember, WorkEntry};

/// Build one summary per staff member for `date`, even for staff with no
/// entries that day. `entries` is expected to already be restricted to the
/// date; entries for unknown staff are ignored.
///
/// Over-allocation is flagged when the variance exceeds a 0.1h tolerance
/// band (absorbs rounding noise in logged fractions of hours).
/// Under-allocation is flagged only for staff who actually logged time; a
/// silent staff member keeps the raw negative variance without the alert.
pub fn daily_summaries(
    date: NaiveDate,
    staff: &[StaffMember],
    entries: &[WorkEntry],
) -> Vec<DailySummary> {
    let tolerance = Decimal::new(1, 1); // 0.1

    let mut summaries: Vec<DailySummary> = staff
        .iter()
        .map(|member| {
            let member_entries = entries
                .iter()
                .filter(|e| e.staff_id == member.staff_id && e.date == date);

            let mut total_tasks = 0u32;
            let mut total_hours = Decimal::ZERO;
            let mut total_cost = Decimal::ZERO;
            for entry in member_entries {
                total_tasks += 1;
                total_hours += entry.hours_worked;
                total_cost += entry.client_cost;
            }

            let hours_variance = total_hours - member.allocated_daily_hours;
            DailySummary {
                staff_id: member.staff_id,
                staff_name: member.name.clone(),
                date,
                total_tasks,
                total_hours,
                allocated_hours: member.allocated_daily_hours,
                total_cost,
                hours_variance,
                over_allocated: hours_variance > tolerance,
                under_allocated: hours_variance < -tolerance && total_hours > Decimal::ZERO,
            }
        })
        .collect();

    summaries.sort_by(|a, b| a.staff_name.cmp(&b.staff_name));
    summaries
}
