//! Invoice creation tests: numbering, snapshots, totals, double billing.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{date, draft_invoice, new_client, seeded_db, work_entry};
use fieldops_billing::error::AppError;
use fieldops_billing::models::{InvoiceStatus, UpdateStaff};

#[tokio::test]
async fn invoice_numbers_are_sequential_within_a_year() {
    let (db, _staff, client) = seeded_db().await;

    let first = db
        .create_invoice(draft_invoice(
            client.client_id,
            date(2026, 3, 1),
            date(2026, 3, 31),
            Decimal::ZERO,
        ))
        .await
        .unwrap();
    let second = db
        .create_invoice(draft_invoice(
            client.client_id,
            date(2026, 4, 1),
            date(2026, 4, 30),
            Decimal::ZERO,
        ))
        .await
        .unwrap();

    assert_eq!(first.invoice_number, "INV-2026-00001");
    assert_eq!(second.invoice_number, "INV-2026-00002");
}

#[tokio::test]
async fn creation_snapshots_unbilled_period_entries_and_computes_totals() {
    let (db, staff, client) = seeded_db().await;

    // 500 of client cost inside the period: 20h at 20/h, plus a fixed 100.
    db.create_work_entry(work_entry(
        staff.staff_id,
        client.client_id,
        date(2026, 3, 3),
        dec!(20),
    ))
    .await
    .unwrap();
    let mut priced = work_entry(staff.staff_id, client.client_id, date(2026, 3, 4), dec!(2));
    priced.override_cost = Some(dec!(100));
    db.create_work_entry(priced).await.unwrap();

    // Outside the period: must not be picked up.
    db.create_work_entry(work_entry(
        staff.staff_id,
        client.client_id,
        date(2026, 4, 1),
        dec!(8),
    ))
    .await
    .unwrap();

    let invoice = db
        .create_invoice(draft_invoice(
            client.client_id,
            date(2026, 3, 1),
            date(2026, 3, 31),
            dec!(20),
        ))
        .await
        .unwrap();

    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert_eq!(invoice.subtotal, dec!(500.00));
    assert_eq!(invoice.vat_amount, dec!(100.00));
    assert_eq!(invoice.total_amount, dec!(600.00));
    assert_eq!(invoice.paid_amount, Decimal::ZERO);

    let items = db.list_line_items(invoice.invoice_id).await.unwrap();
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn line_item_hours_include_overtime_at_attach_time() {
    let (db, staff, client) = seeded_db().await;

    let mut entry = work_entry(staff.staff_id, client.client_id, date(2026, 3, 3), dec!(8));
    entry.overtime_hours = dec!(2);
    db.create_work_entry(entry).await.unwrap();

    let invoice = db
        .create_invoice(draft_invoice(
            client.client_id,
            date(2026, 3, 1),
            date(2026, 3, 31),
            Decimal::ZERO,
        ))
        .await
        .unwrap();

    let items = db.list_line_items(invoice.invoice_id).await.unwrap();
    assert_eq!(items[0].hours_worked, dec!(10));
    // 8h at 20/h + 2h at 20/h (multiplier 1) = 200
    assert_eq!(items[0].labor_cost, dec!(200.00));
}

#[tokio::test]
async fn entries_on_a_non_cancelled_invoice_are_never_billed_twice() {
    let (db, staff, client) = seeded_db().await;

    db.create_work_entry(work_entry(
        staff.staff_id,
        client.client_id,
        date(2026, 3, 3),
        dec!(8),
    ))
    .await
    .unwrap();

    let first = db
        .create_invoice(draft_invoice(
            client.client_id,
            date(2026, 3, 1),
            date(2026, 3, 31),
            Decimal::ZERO,
        ))
        .await
        .unwrap();
    assert_eq!(first.subtotal, dec!(160.00));

    let second = db
        .create_invoice(draft_invoice(
            client.client_id,
            date(2026, 3, 1),
            date(2026, 3, 31),
            Decimal::ZERO,
        ))
        .await
        .unwrap();
    assert_eq!(second.subtotal, Decimal::ZERO);
    assert!(db
        .list_line_items(second.invoice_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn cancelling_an_invoice_releases_its_entries() {
    let (db, staff, client) = seeded_db().await;

    db.create_work_entry(work_entry(
        staff.staff_id,
        client.client_id,
        date(2026, 3, 3),
        dec!(8),
    ))
    .await
    .unwrap();

    let first = db
        .create_invoice(draft_invoice(
            client.client_id,
            date(2026, 3, 1),
            date(2026, 3, 31),
            Decimal::ZERO,
        ))
        .await
        .unwrap();
    db.cancel_invoice(first.invoice_id).await.unwrap();

    let second = db
        .create_invoice(draft_invoice(
            client.client_id,
            date(2026, 3, 1),
            date(2026, 3, 31),
            Decimal::ZERO,
        ))
        .await
        .unwrap();
    assert_eq!(second.subtotal, dec!(160.00));
}

#[tokio::test]
async fn other_clients_entries_are_not_selected() {
    let (db, staff, client) = seeded_db().await;
    let other = db.create_client(new_client("Borealis Labs")).await.unwrap();

    db.create_work_entry(work_entry(
        staff.staff_id,
        other.client_id,
        date(2026, 3, 3),
        dec!(8),
    ))
    .await
    .unwrap();

    let invoice = db
        .create_invoice(draft_invoice(
            client.client_id,
            date(2026, 3, 1),
            date(2026, 3, 31),
            Decimal::ZERO,
        ))
        .await
        .unwrap();
    assert_eq!(invoice.subtotal, Decimal::ZERO);
}

#[tokio::test]
async fn inverted_period_is_rejected() {
    let (db, _staff, client) = seeded_db().await;

    let err = db
        .create_invoice(draft_invoice(
            client.client_id,
            date(2026, 3, 31),
            date(2026, 3, 1),
            Decimal::ZERO,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn inactive_client_cannot_be_invoiced() {
    let (db, _staff, _client) = seeded_db().await;

    let inactive = db
        .create_client(fieldops_billing::models::CreateClient {
            name: "Dormant Client".to_string(),
            active: false,
        })
        .await
        .unwrap();

    let err = db
        .create_invoice(draft_invoice(
            inactive.client_id,
            date(2026, 3, 1),
            date(2026, 3, 31),
            Decimal::ZERO,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn unknown_client_is_not_found() {
    let (db, _staff, _client) = seeded_db().await;

    let err = db
        .create_invoice(draft_invoice(
            uuid::Uuid::new_v4(),
            date(2026, 3, 1),
            date(2026, 3, 31),
            Decimal::ZERO,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn snapshot_survives_later_work_entry_edits() {
    let (db, staff, client) = seeded_db().await;

    let entry = db
        .create_work_entry(work_entry(
            staff.staff_id,
            client.client_id,
            date(2026, 3, 3),
            dec!(8),
        ))
        .await
        .unwrap();

    let invoice = db
        .create_invoice(draft_invoice(
            client.client_id,
            date(2026, 3, 1),
            date(2026, 3, 31),
            Decimal::ZERO,
        ))
        .await
        .unwrap();

    // Raise the staff member's rate and re-save the entry. The live entry
    // changes; the invoice snapshot must not.
    db.update_staff(
        staff.staff_id,
        UpdateStaff {
            pay: Some(fieldops_billing::models::PayStructure::PerDay { rate: dec!(320) }),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let updated = db
        .update_work_entry(entry.entry_id, Default::default())
        .await
        .unwrap();
    assert_eq!(updated.labor_cost, dec!(320.00));

    let items = db.list_line_items(invoice.invoice_id).await.unwrap();
    assert_eq!(items[0].labor_cost, dec!(160.00));
    let refreshed = db.get_invoice(invoice.invoice_id).await.unwrap();
    assert_eq!(refreshed.subtotal, dec!(160.00));
}
