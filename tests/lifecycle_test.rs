//! Invoice lifecycle tests: draft edits, issue, payment, cancel, overdue.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{date, draft_invoice, seeded_db, work_entry};
use fieldops_billing::error::AppError;
use fieldops_billing::models::{
    CreateAdditionalCost, InvoicePayment, InvoiceStatus,
};

fn materials_cost(amount: Decimal) -> CreateAdditionalCost {
    CreateAdditionalCost {
        description: "Replacement parts".to_string(),
        amount,
        category: "materials".to_string(),
        date: date(2026, 3, 10),
    }
}

fn payment(amount: Decimal) -> InvoicePayment {
    InvoicePayment {
        payment_date: date(2026, 4, 10),
        paid_amount: amount,
        payment_method: Some("bank_transfer".to_string()),
        payment_reference: Some("TXN-001".to_string()),
    }
}

#[tokio::test]
async fn additional_cost_on_draft_recomputes_totals_atomically() {
    let (db, staff, client) = seeded_db().await;

    // 25h at 20/h = 500 subtotal.
    db.create_work_entry(work_entry(
        staff.staff_id,
        client.client_id,
        date(2026, 3, 3),
        dec!(12.5),
    ))
    .await
    .unwrap();
    db.create_work_entry(work_entry(
        staff.staff_id,
        client.client_id,
        date(2026, 3, 4),
        dec!(12.5),
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
    assert_eq!(invoice.total_amount, dec!(600.00));

    db.add_additional_cost(invoice.invoice_id, materials_cost(dec!(50)))
        .await
        .unwrap();

    let refreshed = db.get_invoice(invoice.invoice_id).await.unwrap();
    assert_eq!(refreshed.subtotal, dec!(500.00));
    assert_eq!(refreshed.additional_cost_total, dec!(50.00));
    assert_eq!(refreshed.vat_amount, dec!(110.00));
    assert_eq!(refreshed.total_amount, dec!(660.00));
}

#[tokio::test]
async fn structural_edits_rejected_once_issued() {
    let (db, staff, client) = seeded_db().await;

    db.create_work_entry(work_entry(
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
    let items = db.list_line_items(invoice.invoice_id).await.unwrap();

    db.issue_invoice(invoice.invoice_id).await.unwrap();

    let err = db
        .add_additional_cost(invoice.invoice_id, materials_cost(dec!(50)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = db
        .remove_line_item(invoice.invoice_id, items[0].line_item_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn removing_a_line_item_from_a_draft_releases_the_entry() {
    let (db, staff, client) = seeded_db().await;

    db.create_work_entry(work_entry(
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
    let items = db.list_line_items(invoice.invoice_id).await.unwrap();

    let refreshed = db
        .remove_line_item(invoice.invoice_id, items[0].line_item_id)
        .await
        .unwrap();
    assert_eq!(refreshed.subtotal, Decimal::ZERO);
    assert_eq!(refreshed.total_amount, Decimal::ZERO);

    // The detached entry is billable again.
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
async fn issue_requires_a_draft() {
    let (db, _staff, client) = seeded_db().await;

    let invoice = db
        .create_invoice(draft_invoice(
            client.client_id,
            date(2026, 3, 1),
            date(2026, 3, 31),
            Decimal::ZERO,
        ))
        .await
        .unwrap();

    let issued = db.issue_invoice(invoice.invoice_id).await.unwrap();
    assert_eq!(issued.status, InvoiceStatus::Issued);
    assert!(issued.issued_utc.is_some());

    let err = db.issue_invoice(invoice.invoice_id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn payment_rejected_on_draft() {
    let (db, _staff, client) = seeded_db().await;

    let invoice = db
        .create_invoice(draft_invoice(
            client.client_id,
            date(2026, 3, 1),
            date(2026, 3, 31),
            Decimal::ZERO,
        ))
        .await
        .unwrap();

    let err = db
        .record_invoice_payment(invoice.invoice_id, payment(dec!(100)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn partial_payment_still_marks_the_invoice_paid() {
    let (db, staff, client) = seeded_db().await;

    db.create_work_entry(work_entry(
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
    db.issue_invoice(invoice.invoice_id).await.unwrap();

    let paid = db
        .record_invoice_payment(invoice.invoice_id, payment(dec!(100)))
        .await
        .unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);
    assert_eq!(paid.paid_amount, dec!(100));
    assert!(paid.paid_amount < paid.total_amount);
    assert_eq!(paid.payment_date, Some(date(2026, 4, 10)));
}

#[tokio::test]
async fn cancel_is_draft_only() {
    let (db, _staff, client) = seeded_db().await;

    let invoice = db
        .create_invoice(draft_invoice(
            client.client_id,
            date(2026, 3, 1),
            date(2026, 3, 31),
            Decimal::ZERO,
        ))
        .await
        .unwrap();
    db.issue_invoice(invoice.invoice_id).await.unwrap();

    let err = db.cancel_invoice(invoice.invoice_id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn overdue_sweep_flips_issued_invoices_past_due() {
    let (db, _staff, client) = seeded_db().await;

    let mut input = draft_invoice(
        client.client_id,
        date(2026, 3, 1),
        date(2026, 3, 31),
        Decimal::ZERO,
    );
    input.due_date = Some(date(2026, 4, 30));
    let invoice = db.create_invoice(input).await.unwrap();
    db.issue_invoice(invoice.invoice_id).await.unwrap();

    // Not yet due.
    let flipped = db.sweep_overdue(date(2026, 4, 30)).await.unwrap();
    assert!(flipped.is_empty());

    let flipped = db.sweep_overdue(date(2026, 5, 1)).await.unwrap();
    assert_eq!(flipped.len(), 1);
    assert_eq!(flipped[0].status, InvoiceStatus::Overdue);

    // Payment against an overdue invoice is legal.
    let paid = db
        .record_invoice_payment(invoice.invoice_id, payment(dec!(50)))
        .await
        .unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);

    // Paid invoices are left alone by later sweeps.
    let flipped = db.sweep_overdue(date(2026, 6, 1)).await.unwrap();
    assert!(flipped.is_empty());
}

#[tokio::test]
async fn billed_work_entries_cannot_be_deleted() {
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

    let err = db.delete_work_entry(entry.entry_id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // After cancelling the invoice the entry is deletable.
    db.cancel_invoice(invoice.invoice_id).await.unwrap();
    db.delete_work_entry(entry.entry_id).await.unwrap();
}
