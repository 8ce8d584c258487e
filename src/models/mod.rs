//! Domain models for the billing and settlement engine.

mod client;
mod invoice;
mod line_item;
mod staff;
mod summary;
mod wage_payment;
mod work_entry;

pub use client::{Client, CreateClient};
pub use invoice::{
    CreateInvoice, Invoice, InvoicePayment, InvoiceStatus, ListInvoicesFilter,
};
pub use line_item::{AdditionalCost, CreateAdditionalCost, InvoiceLineItem};
pub use staff::{CreateStaff, PayStructure, StaffMember, UpdateStaff};
pub use summary::DailySummary;
pub use wage_payment::{
    PaymentRunFailure, PaymentRunOutcome, RecordWagePayment, StaffWagesSummary,
    WagePaymentRecord, WagePaymentStatus,
};
pub use work_entry::{CreateWorkEntry, UpdateWorkEntry, WorkEntry, WorkEntryFilter};
