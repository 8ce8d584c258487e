//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use fieldops_billing::models::{
    Client, CreateClient, CreateInvoice, CreateStaff, CreateWorkEntry, PayStructure, StaffMember,
};
use fieldops_billing::services::Database;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn per_day_staff(name: &str, rate: Decimal, allocated_daily_hours: Decimal) -> CreateStaff {
    CreateStaff {
        name: name.to_string(),
        pay: PayStructure::PerDay { rate },
        allocated_daily_hours,
        overtime_multiplier: Decimal::ONE,
        pay_override: None,
        active: true,
    }
}

pub fn per_month_staff(name: &str, rate: Decimal, allocated_daily_hours: Decimal) -> CreateStaff {
    CreateStaff {
        name: name.to_string(),
        pay: PayStructure::PerMonth { rate },
        allocated_daily_hours,
        overtime_multiplier: Decimal::ONE,
        pay_override: None,
        active: true,
    }
}

pub fn new_client(name: &str) -> CreateClient {
    CreateClient {
        name: name.to_string(),
        active: true,
    }
}

pub fn work_entry(
    staff_id: Uuid,
    client_id: Uuid,
    date: NaiveDate,
    hours: Decimal,
) -> CreateWorkEntry {
    CreateWorkEntry {
        staff_id,
        client_id,
        job_id: None,
        date,
        task_description: "Routine maintenance visit".to_string(),
        hours_worked: hours,
        overtime_hours: Decimal::ZERO,
        use_pay_override: false,
        override_cost: None,
        notes: None,
    }
}

pub fn draft_invoice(
    client_id: Uuid,
    period_start: NaiveDate,
    period_end: NaiveDate,
    vat_rate: Decimal,
) -> CreateInvoice {
    CreateInvoice {
        client_id,
        period_start,
        period_end,
        issue_date: period_end,
        due_date: None,
        vat_rate,
        notes: None,
    }
}

/// A database seeded with one per-day staff member (160/day over 8h, so
/// 20/h) and one active client.
pub async fn seeded_db() -> (Database, StaffMember, Client) {
    let db = Database::new();
    let staff = db
        .create_staff(per_day_staff("Asha Verma", dec!(160), dec!(8)))
        .await
        .unwrap();
    let client = db
        .create_client(new_client("Acme Facilities"))
        .await
        .unwrap();
    (db, staff, client)
}
