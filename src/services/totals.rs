//! Invoice totals. One pure function recomputes every aggregate from the
//! current line items and additional costs, so the stored figures can never
//! drift from the rows they summarize.

use rust_decimal::Decimal;

use crate::models::{AdditionalCost, InvoiceLineItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub additional_cost_total: Decimal,
    pub vat_amount: Decimal,
    pub total_amount: Decimal,
}

/// `subtotal` is the sum of snapshotted client costs, VAT applies to the
/// subtotal plus additional costs, and the grand total is their sum.
pub fn recompute(
    vat_rate: Decimal,
    line_items: &[InvoiceLineItem],
    additional_costs: &[AdditionalCost],
) -> InvoiceTotals {
    let subtotal = line_items
        .iter()
        .fold(Decimal::ZERO, |acc, item| acc + item.client_cost)
        .round_dp(2);
    let additional_cost_total = additional_costs
        .iter()
        .fold(Decimal::ZERO, |acc, cost| acc + cost.amount)
        .round_dp(2);
    let vat_amount =
        ((subtotal + additional_cost_total) * vat_rate / Decimal::ONE_HUNDRED).round_dp(2);
    let total_amount = (subtotal + additional_cost_total + vat_amount).round_dp(2);

    InvoiceTotals {
        subtotal,
        additional_cost_total,
        vat_amount,
        total_amount,
    }
}
