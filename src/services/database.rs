//! In-process store for the billing engine.
//!
//! Stands in for the hosted relational store behind the dashboard. Every
//! public operation takes the store lock exactly once, so each one commits
//! or fails as a unit: invoice creation allocates the number, snapshots
//! line items and computes totals inside a single critical section, and a
//! structural mutation and its totals recomputation can never be observed
//! apart.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::{Datelike, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    AdditionalCost, Client, CreateAdditionalCost, CreateClient, CreateInvoice, CreateStaff,
    CreateWorkEntry, DailySummary, Invoice, InvoiceLineItem, InvoicePayment, InvoiceStatus,
    ListInvoicesFilter, PaymentRunFailure, PaymentRunOutcome, RecordWagePayment,
    StaffMember, StaffWagesSummary, UpdateStaff, UpdateWorkEntry, WagePaymentRecord,
    WagePaymentStatus, WorkEntry, WorkEntryFilter,
};
use crate::services::{allocation, costing, totals};

const MAX_HOURS_PER_ENTRY: u32 = 24;
const MAX_NUMBER_ATTEMPTS: u32 = 3;

#[derive(Default)]
struct Tables {
    staff: HashMap<Uuid, StaffMember>,
    clients: HashMap<Uuid, Client>,
    work_entries: HashMap<Uuid, WorkEntry>,
    invoices: HashMap<Uuid, Invoice>,
    line_items: HashMap<Uuid, InvoiceLineItem>,
    additional_costs: HashMap<Uuid, AdditionalCost>,
    wage_payments: HashMap<Uuid, WagePaymentRecord>,
    invoice_sequences: HashMap<i32, u32>,
}

/// Store handle. Cheap to clone; all clones share the same tables.
#[derive(Clone, Default)]
pub struct Database {
    inner: Arc<RwLock<Tables>>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Staff operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input))]
    pub async fn create_staff(&self, input: CreateStaff) -> Result<StaffMember, AppError> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation(anyhow!("Staff name is required")));
        }
        if input.allocated_daily_hours <= Decimal::ZERO {
            return Err(AppError::Validation(anyhow!(
                "Allocated daily hours must be greater than 0"
            )));
        }
        if input.overtime_multiplier < Decimal::ZERO {
            return Err(AppError::Validation(anyhow!(
                "Overtime multiplier must not be negative"
            )));
        }

        let member = StaffMember {
            staff_id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            pay: input.pay,
            allocated_daily_hours: input.allocated_daily_hours,
            overtime_multiplier: input.overtime_multiplier,
            pay_override: input.pay_override,
            active: input.active,
            created_utc: Utc::now(),
        };

        let mut tables = self.inner.write().await;
        tables.staff.insert(member.staff_id, member.clone());

        info!(staff_id = %member.staff_id, name = %member.name, "Staff member created");
        Ok(member)
    }

    #[instrument(skip(self, input), fields(staff_id = %staff_id))]
    pub async fn update_staff(
        &self,
        staff_id: Uuid,
        input: UpdateStaff,
    ) -> Result<StaffMember, AppError> {
        if let Some(hours) = input.allocated_daily_hours {
            if hours <= Decimal::ZERO {
                return Err(AppError::Validation(anyhow!(
                    "Allocated daily hours must be greater than 0"
                )));
            }
        }

        let mut tables = self.inner.write().await;
        let member = tables
            .staff
            .get_mut(&staff_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Staff member not found")))?;

        if let Some(name) = input.name {
            member.name = name.trim().to_string();
        }
        if let Some(pay) = input.pay {
            member.pay = pay;
        }
        if let Some(hours) = input.allocated_daily_hours {
            member.allocated_daily_hours = hours;
        }
        if let Some(multiplier) = input.overtime_multiplier {
            member.overtime_multiplier = multiplier;
        }
        member.pay_override = input.pay_override;
        if let Some(active) = input.active {
            member.active = active;
        }

        let updated = member.clone();
        info!(staff_id = %staff_id, "Staff member updated");
        Ok(updated)
    }

    pub async fn get_staff(&self, staff_id: Uuid) -> Result<StaffMember, AppError> {
        let tables = self.inner.read().await;
        tables
            .staff
            .get(&staff_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Staff member not found")))
    }

    pub async fn list_staff(&self, active_only: bool) -> Result<Vec<StaffMember>, AppError> {
        let tables = self.inner.read().await;
        let mut staff: Vec<StaffMember> = tables
            .staff
            .values()
            .filter(|s| !active_only || s.active)
            .cloned()
            .collect();
        staff.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(staff)
    }

    // -------------------------------------------------------------------------
    // Client operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input))]
    pub async fn create_client(&self, input: CreateClient) -> Result<Client, AppError> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation(anyhow!("Client name is required")));
        }

        let client = Client {
            client_id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            active: input.active,
            created_utc: Utc::now(),
        };

        let mut tables = self.inner.write().await;
        tables.clients.insert(client.client_id, client.clone());

        info!(client_id = %client.client_id, name = %client.name, "Client created");
        Ok(client)
    }

    pub async fn get_client(&self, client_id: Uuid) -> Result<Client, AppError> {
        let tables = self.inner.read().await;
        tables
            .clients
            .get(&client_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Client not found")))
    }

    pub async fn list_clients(&self, active_only: bool) -> Result<Vec<Client>, AppError> {
        let tables = self.inner.read().await;
        let mut clients: Vec<Client> = tables
            .clients
            .values()
            .filter(|c| !active_only || c.active)
            .cloned()
            .collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    // -------------------------------------------------------------------------
    // Work entry operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(staff_id = %input.staff_id, date = %input.date))]
    pub async fn create_work_entry(&self, input: CreateWorkEntry) -> Result<WorkEntry, AppError> {
        validate_entry_hours(input.hours_worked, input.overtime_hours)?;
        if input.task_description.trim().is_empty() {
            return Err(AppError::Validation(anyhow!("Task description is required")));
        }

        let mut tables = self.inner.write().await;
        let staff = tables
            .staff
            .get(&input.staff_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Staff member not found")))?;
        if !staff.active {
            return Err(AppError::Validation(anyhow!(
                "Cannot log work against an inactive staff member"
            )));
        }
        if !tables.clients.contains_key(&input.client_id) {
            return Err(AppError::NotFound(anyhow!("Client not found")));
        }

        let costs = costing::entry_costs(
            &staff,
            input.hours_worked,
            input.overtime_hours,
            input.override_cost,
            input.use_pay_override,
        );

        let now = Utc::now();
        let entry = WorkEntry {
            entry_id: Uuid::new_v4(),
            staff_id: input.staff_id,
            client_id: input.client_id,
            job_id: input.job_id,
            date: input.date,
            task_description: input.task_description.trim().to_string(),
            hours_worked: input.hours_worked,
            overtime_hours: input.overtime_hours,
            use_pay_override: input.use_pay_override,
            labor_cost: costs.labor_cost,
            override_cost: input.override_cost,
            client_cost: costs.client_cost,
            margin_amount: costs.margin_amount,
            margin_percentage: costs.margin_percentage,
            notes: input.notes,
            created_utc: now,
            updated_utc: now,
        };
        tables.work_entries.insert(entry.entry_id, entry.clone());

        info!(entry_id = %entry.entry_id, labor_cost = %entry.labor_cost, "Work entry logged");
        Ok(entry)
    }

    /// Edit a logged entry and re-derive its cost figures. Legal even after
    /// the entry has been invoiced: the invoice keeps its own snapshot.
    #[instrument(skip(self, input), fields(entry_id = %entry_id))]
    pub async fn update_work_entry(
        &self,
        entry_id: Uuid,
        input: UpdateWorkEntry,
    ) -> Result<WorkEntry, AppError> {
        let mut tables = self.inner.write().await;
        let existing = tables
            .work_entries
            .get(&entry_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Work entry not found")))?;

        let hours_worked = input.hours_worked.unwrap_or(existing.hours_worked);
        let overtime_hours = input.overtime_hours.unwrap_or(existing.overtime_hours);
        validate_entry_hours(hours_worked, overtime_hours)?;

        let staff = tables
            .staff
            .get(&existing.staff_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Staff member not found")))?;

        let use_pay_override = input.use_pay_override.unwrap_or(existing.use_pay_override);
        let override_cost = input.override_cost;
        let costs = costing::entry_costs(
            &staff,
            hours_worked,
            overtime_hours,
            override_cost,
            use_pay_override,
        );

        let entry = tables
            .work_entries
            .get_mut(&entry_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Work entry not found")))?;
        if let Some(date) = input.date {
            entry.date = date;
        }
        if let Some(description) = input.task_description {
            entry.task_description = description.trim().to_string();
        }
        if let Some(notes) = input.notes {
            entry.notes = Some(notes);
        }
        entry.hours_worked = hours_worked;
        entry.overtime_hours = overtime_hours;
        entry.use_pay_override = use_pay_override;
        entry.override_cost = override_cost;
        entry.labor_cost = costs.labor_cost;
        entry.client_cost = costs.client_cost;
        entry.margin_amount = costs.margin_amount;
        entry.margin_percentage = costs.margin_percentage;
        entry.updated_utc = Utc::now();

        let updated = entry.clone();
        info!(entry_id = %entry_id, "Work entry updated");
        Ok(updated)
    }

    /// Remove an entry that has not been billed. Entries attached to a
    /// non-cancelled invoice must stay for the historical record.
    #[instrument(skip(self), fields(entry_id = %entry_id))]
    pub async fn delete_work_entry(&self, entry_id: Uuid) -> Result<(), AppError> {
        let mut tables = self.inner.write().await;
        if !tables.work_entries.contains_key(&entry_id) {
            return Err(AppError::NotFound(anyhow!("Work entry not found")));
        }
        if is_attached(&tables, entry_id) {
            return Err(AppError::Conflict(anyhow!(
                "Work entry is attached to an invoice and cannot be deleted"
            )));
        }
        tables.work_entries.remove(&entry_id);
        info!(entry_id = %entry_id, "Work entry deleted");
        Ok(())
    }

    pub async fn list_work_entries(
        &self,
        filter: &WorkEntryFilter,
    ) -> Result<Vec<WorkEntry>, AppError> {
        let tables = self.inner.read().await;
        let mut entries: Vec<WorkEntry> = tables
            .work_entries
            .values()
            .filter(|e| filter.date.map_or(true, |d| e.date == d))
            .filter(|e| filter.staff_id.map_or(true, |id| e.staff_id == id))
            .filter(|e| filter.client_id.map_or(true, |id| e.client_id == id))
            .filter(|e| filter.start_date.map_or(true, |d| e.date >= d))
            .filter(|e| filter.end_date.map_or(true, |d| e.date <= d))
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_utc.cmp(&a.created_utc))
        });
        Ok(entries)
    }

    // -------------------------------------------------------------------------
    // Allocation summaries
    // -------------------------------------------------------------------------

    /// Per-staff rollup for a single day, one row per active staff member.
    pub async fn daily_summary(&self, date: NaiveDate) -> Result<Vec<DailySummary>, AppError> {
        let tables = self.inner.read().await;
        let staff: Vec<StaffMember> = tables.staff.values().filter(|s| s.active).cloned().collect();
        let entries: Vec<WorkEntry> = tables
            .work_entries
            .values()
            .filter(|e| e.date == date)
            .cloned()
            .collect();
        Ok(allocation::daily_summaries(date, &staff, &entries))
    }

    // -------------------------------------------------------------------------
    // Invoice operations
    // -------------------------------------------------------------------------

    /// Create a draft invoice for a client and billing period, attaching a
    /// snapshot of every unbilled work entry in the period and computing
    /// the totals — one atomic operation.
    #[instrument(skip(self, input), fields(client_id = %input.client_id))]
    pub async fn create_invoice(&self, input: CreateInvoice) -> Result<Invoice, AppError> {
        if input.period_start > input.period_end {
            return Err(AppError::Validation(anyhow!(
                "Billing period end must not precede its start"
            )));
        }
        if input.vat_rate < Decimal::ZERO {
            return Err(AppError::Validation(anyhow!("VAT rate must not be negative")));
        }

        let mut tables = self.inner.write().await;
        let client = tables
            .clients
            .get(&input.client_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Client not found")))?;
        if !client.active {
            return Err(AppError::Validation(anyhow!(
                "Cannot invoice an inactive client"
            )));
        }

        let invoice_number = allocate_invoice_number(&mut tables, input.issue_date.year())?;
        let invoice_id = Uuid::new_v4();

        // Select the client's entries inside the period that no
        // non-cancelled invoice has already claimed. Happens under the same
        // lock as the inserts below, which closes the double-billing race.
        let selected: Vec<WorkEntry> = tables
            .work_entries
            .values()
            .filter(|e| {
                e.client_id == input.client_id
                    && e.date >= input.period_start
                    && e.date <= input.period_end
            })
            .filter(|e| !is_attached(&tables, e.entry_id))
            .cloned()
            .collect();

        let now = Utc::now();
        let line_items: Vec<InvoiceLineItem> = selected
            .iter()
            .map(|entry| InvoiceLineItem {
                line_item_id: Uuid::new_v4(),
                invoice_id,
                work_entry_id: entry.entry_id,
                hours_worked: entry.hours_worked + entry.overtime_hours,
                labor_cost: entry.labor_cost,
                client_cost: entry.client_cost,
                created_utc: now,
            })
            .collect();

        let computed = totals::recompute(input.vat_rate, &line_items, &[]);
        let invoice = Invoice {
            invoice_id,
            invoice_number,
            client_id: input.client_id,
            period_start: input.period_start,
            period_end: input.period_end,
            status: InvoiceStatus::Draft,
            issue_date: input.issue_date,
            due_date: input.due_date,
            subtotal: computed.subtotal,
            additional_cost_total: computed.additional_cost_total,
            vat_rate: input.vat_rate,
            vat_amount: computed.vat_amount,
            total_amount: computed.total_amount,
            paid_amount: Decimal::ZERO,
            payment_date: None,
            payment_method: None,
            payment_reference: None,
            notes: input.notes,
            created_utc: now,
            issued_utc: None,
            cancelled_utc: None,
        };

        for item in &line_items {
            tables.line_items.insert(item.line_item_id, item.clone());
        }
        tables.invoices.insert(invoice_id, invoice.clone());

        info!(
            invoice_id = %invoice_id,
            invoice_number = %invoice.invoice_number,
            line_items = line_items.len(),
            total = %invoice.total_amount,
            "Draft invoice created"
        );
        Ok(invoice)
    }

    pub async fn get_invoice(&self, invoice_id: Uuid) -> Result<Invoice, AppError> {
        let tables = self.inner.read().await;
        tables
            .invoices
            .get(&invoice_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Invoice not found")))
    }

    pub async fn list_invoices(
        &self,
        filter: &ListInvoicesFilter,
    ) -> Result<Vec<Invoice>, AppError> {
        let tables = self.inner.read().await;
        let mut invoices: Vec<Invoice> = tables
            .invoices
            .values()
            .filter(|i| filter.status.map_or(true, |s| i.status == s))
            .filter(|i| filter.client_id.map_or(true, |id| i.client_id == id))
            .filter(|i| filter.start_date.map_or(true, |d| i.issue_date >= d))
            .filter(|i| filter.end_date.map_or(true, |d| i.issue_date <= d))
            .cloned()
            .collect();
        invoices.sort_by(|a, b| b.created_utc.cmp(&a.created_utc));
        Ok(invoices)
    }

    pub async fn list_line_items(
        &self,
        invoice_id: Uuid,
    ) -> Result<Vec<InvoiceLineItem>, AppError> {
        let tables = self.inner.read().await;
        if !tables.invoices.contains_key(&invoice_id) {
            return Err(AppError::NotFound(anyhow!("Invoice not found")));
        }
        let mut items: Vec<InvoiceLineItem> = tables
            .line_items
            .values()
            .filter(|li| li.invoice_id == invoice_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_utc.cmp(&b.created_utc));
        Ok(items)
    }

    pub async fn list_additional_costs(
        &self,
        invoice_id: Uuid,
    ) -> Result<Vec<AdditionalCost>, AppError> {
        let tables = self.inner.read().await;
        if !tables.invoices.contains_key(&invoice_id) {
            return Err(AppError::NotFound(anyhow!("Invoice not found")));
        }
        let mut costs: Vec<AdditionalCost> = tables
            .additional_costs
            .values()
            .filter(|c| c.invoice_id == invoice_id)
            .cloned()
            .collect();
        costs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(costs)
    }

    /// Add an additional cost to a draft invoice. The cost row and the
    /// refreshed totals land in the same critical section.
    #[instrument(skip(self, input), fields(invoice_id = %invoice_id))]
    pub async fn add_additional_cost(
        &self,
        invoice_id: Uuid,
        input: CreateAdditionalCost,
    ) -> Result<AdditionalCost, AppError> {
        if input.amount <= Decimal::ZERO {
            return Err(AppError::Validation(anyhow!(
                "Additional cost amount must be greater than 0"
            )));
        }
        if input.description.trim().is_empty() {
            return Err(AppError::Validation(anyhow!("Description is required")));
        }

        let mut tables = self.inner.write().await;
        ensure_editable(&tables, invoice_id)?;

        let cost = AdditionalCost {
            cost_id: Uuid::new_v4(),
            invoice_id,
            description: input.description.trim().to_string(),
            amount: input.amount,
            category: input.category,
            date: input.date,
            created_utc: Utc::now(),
        };
        tables.additional_costs.insert(cost.cost_id, cost.clone());
        apply_totals(&mut tables, invoice_id);

        info!(invoice_id = %invoice_id, amount = %cost.amount, "Additional cost added");
        Ok(cost)
    }

    /// Remove an additional cost from a draft invoice, recomputing totals
    /// in the same critical section. Returns the refreshed invoice.
    #[instrument(skip(self), fields(invoice_id = %invoice_id, cost_id = %cost_id))]
    pub async fn remove_additional_cost(
        &self,
        invoice_id: Uuid,
        cost_id: Uuid,
    ) -> Result<Invoice, AppError> {
        let mut tables = self.inner.write().await;
        ensure_editable(&tables, invoice_id)?;

        match tables.additional_costs.get(&cost_id) {
            Some(cost) if cost.invoice_id == invoice_id => {}
            _ => return Err(AppError::NotFound(anyhow!("Additional cost not found"))),
        }
        tables.additional_costs.remove(&cost_id);
        apply_totals(&mut tables, invoice_id);

        info!(invoice_id = %invoice_id, cost_id = %cost_id, "Additional cost removed");
        tables
            .invoices
            .get(&invoice_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Invoice not found")))
    }

    /// Detach a work entry's line item from a draft invoice. The underlying
    /// entry becomes billable again.
    #[instrument(skip(self), fields(invoice_id = %invoice_id, line_item_id = %line_item_id))]
    pub async fn remove_line_item(
        &self,
        invoice_id: Uuid,
        line_item_id: Uuid,
    ) -> Result<Invoice, AppError> {
        let mut tables = self.inner.write().await;
        ensure_editable(&tables, invoice_id)?;

        match tables.line_items.get(&line_item_id) {
            Some(item) if item.invoice_id == invoice_id => {}
            _ => return Err(AppError::NotFound(anyhow!("Line item not found"))),
        }
        tables.line_items.remove(&line_item_id);
        apply_totals(&mut tables, invoice_id);

        info!(invoice_id = %invoice_id, line_item_id = %line_item_id, "Line item removed");
        tables
            .invoices
            .get(&invoice_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Invoice not found")))
    }

    /// Issue a draft invoice: a status flip that freezes the structure. No
    /// recomputation happens here.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn issue_invoice(&self, invoice_id: Uuid) -> Result<Invoice, AppError> {
        let mut tables = self.inner.write().await;
        let invoice = tables
            .invoices
            .get_mut(&invoice_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Invoice not found")))?;
        if invoice.status != InvoiceStatus::Draft {
            return Err(AppError::Conflict(anyhow!(
                "Only draft invoices can be issued"
            )));
        }

        invoice.status = InvoiceStatus::Issued;
        invoice.issued_utc = Some(Utc::now());

        let issued = invoice.clone();
        info!(invoice_id = %invoice_id, invoice_number = %issued.invoice_number, "Invoice issued");
        Ok(issued)
    }

    /// Cancel a draft invoice. Issued, overdue and paid invoices can never
    /// be cancelled. Cancelling releases the attached work entries.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn cancel_invoice(&self, invoice_id: Uuid) -> Result<Invoice, AppError> {
        let mut tables = self.inner.write().await;
        let invoice = tables
            .invoices
            .get_mut(&invoice_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Invoice not found")))?;
        if invoice.status != InvoiceStatus::Draft {
            return Err(AppError::Conflict(anyhow!(
                "Only draft invoices can be cancelled"
            )));
        }

        invoice.status = InvoiceStatus::Cancelled;
        invoice.cancelled_utc = Some(Utc::now());

        let cancelled = invoice.clone();
        info!(invoice_id = %invoice_id, "Invoice cancelled");
        Ok(cancelled)
    }

    /// Record a payment event against an issued or overdue invoice. The
    /// invoice becomes `paid` whether or not the amount covers the total;
    /// partial coverage stays visible through `paid_amount`.
    #[instrument(skip(self, input), fields(invoice_id = %invoice_id))]
    pub async fn record_invoice_payment(
        &self,
        invoice_id: Uuid,
        input: InvoicePayment,
    ) -> Result<Invoice, AppError> {
        if input.paid_amount <= Decimal::ZERO {
            return Err(AppError::Validation(anyhow!(
                "Paid amount must be greater than 0"
            )));
        }

        let mut tables = self.inner.write().await;
        let invoice = tables
            .invoices
            .get_mut(&invoice_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Invoice not found")))?;
        if !matches!(invoice.status, InvoiceStatus::Issued | InvoiceStatus::Overdue) {
            return Err(AppError::Conflict(anyhow!(
                "Payments can only be recorded against issued or overdue invoices"
            )));
        }

        invoice.status = InvoiceStatus::Paid;
        invoice.paid_amount = input.paid_amount;
        invoice.payment_date = Some(input.payment_date);
        invoice.payment_method = input.payment_method;
        invoice.payment_reference = input.payment_reference;

        let paid = invoice.clone();
        if paid.paid_amount < paid.total_amount {
            warn!(
                invoice_id = %invoice_id,
                paid = %paid.paid_amount,
                total = %paid.total_amount,
                "Invoice marked paid with partial coverage"
            );
        }
        info!(invoice_id = %invoice_id, paid_amount = %paid.paid_amount, "Invoice payment recorded");
        Ok(paid)
    }

    /// Flip issued invoices whose due date has passed to overdue. Invoked
    /// by an external periodic job, not by the billing hot path. Returns
    /// the invoices that changed.
    #[instrument(skip(self), fields(as_of = %as_of))]
    pub async fn sweep_overdue(&self, as_of: NaiveDate) -> Result<Vec<Invoice>, AppError> {
        let mut tables = self.inner.write().await;
        let mut flipped = Vec::new();
        for invoice in tables.invoices.values_mut() {
            if invoice.status == InvoiceStatus::Issued
                && invoice.due_date.map_or(false, |due| due < as_of)
            {
                invoice.status = InvoiceStatus::Overdue;
                flipped.push(invoice.clone());
            }
        }
        if !flipped.is_empty() {
            info!(count = flipped.len(), "Invoices marked overdue");
        }
        Ok(flipped)
    }

    // -------------------------------------------------------------------------
    // Wage settlement operations
    // -------------------------------------------------------------------------

    /// Reconcile each staff member's wages due over a period against wage
    /// payment records overlapping that period.
    pub async fn wages_summary(
        &self,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Vec<StaffWagesSummary>, AppError> {
        if period_start > period_end {
            return Err(AppError::Validation(anyhow!(
                "Period end must not precede its start"
            )));
        }
        let tables = self.inner.read().await;
        Ok(summarize_wages(&tables, period_start, period_end))
    }

    /// Create one pending wage payment record per staff member with wages
    /// due in the period. Each creation is attempted independently;
    /// failures are reported in the outcome and never roll back successes.
    #[instrument(skip(self), fields(period_start = %period_start, period_end = %period_end))]
    pub async fn generate_payments_for_period(
        &self,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<PaymentRunOutcome, AppError> {
        if period_start > period_end {
            return Err(AppError::Validation(anyhow!(
                "Period end must not precede its start"
            )));
        }

        let mut tables = self.inner.write().await;
        let summaries = summarize_wages(&tables, period_start, period_end);

        let mut created = Vec::new();
        let mut failures = Vec::new();
        for summary in summaries
            .into_iter()
            .filter(|s| s.total_wages_due > Decimal::ZERO)
        {
            let conflicting = tables.wage_payments.values().any(|p| {
                p.staff_id == summary.staff_id
                    && p.status != WagePaymentStatus::Cancelled
                    && p.period_start <= period_end
                    && p.period_end >= period_start
            });
            if conflicting {
                warn!(staff_id = %summary.staff_id, "Wage payment generation skipped");
                failures.push(PaymentRunFailure {
                    staff_id: summary.staff_id,
                    reason: "A wage payment record already covers this period".to_string(),
                });
                continue;
            }

            let work_entry_ids: Vec<Uuid> = tables
                .work_entries
                .values()
                .filter(|e| {
                    e.staff_id == summary.staff_id
                        && e.date >= period_start
                        && e.date <= period_end
                })
                .map(|e| e.entry_id)
                .collect();

            let record = WagePaymentRecord {
                payment_id: Uuid::new_v4(),
                staff_id: summary.staff_id,
                period_start,
                period_end,
                amount_due: summary.total_wages_due,
                amount_paid: Decimal::ZERO,
                status: WagePaymentStatus::Pending,
                payment_date: None,
                payment_method: None,
                payment_reference: None,
                work_entry_ids,
                created_utc: Utc::now(),
            };
            tables.wage_payments.insert(record.payment_id, record.clone());
            created.push(record);
        }

        info!(
            created = created.len(),
            failed = failures.len(),
            "Wage payment generation run finished"
        );
        Ok(PaymentRunOutcome { created, failures })
    }

    /// Record a payment against a wage record. Payments accumulate: the
    /// record becomes `paid` once the due amount is covered, and stays
    /// `partially_paid` until then. Overpayment is representable.
    #[instrument(skip(self, input), fields(payment_id = %payment_id))]
    pub async fn record_wage_payment(
        &self,
        payment_id: Uuid,
        input: RecordWagePayment,
    ) -> Result<WagePaymentRecord, AppError> {
        if input.amount <= Decimal::ZERO {
            return Err(AppError::Validation(anyhow!(
                "Payment amount must be greater than 0"
            )));
        }

        let mut tables = self.inner.write().await;
        let record = tables
            .wage_payments
            .get_mut(&payment_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Wage payment record not found")))?;
        if record.status == WagePaymentStatus::Cancelled {
            return Err(AppError::Conflict(anyhow!(
                "Cannot record a payment against a cancelled record"
            )));
        }

        record.amount_paid += input.amount;
        record.status = if record.amount_paid >= record.amount_due {
            WagePaymentStatus::Paid
        } else {
            WagePaymentStatus::PartiallyPaid
        };
        record.payment_date = Some(input.payment_date);
        record.payment_method = input.payment_method;
        record.payment_reference = input.payment_reference;

        let updated = record.clone();
        info!(
            payment_id = %payment_id,
            amount_paid = %updated.amount_paid,
            status = updated.status.as_str(),
            "Wage payment recorded"
        );
        Ok(updated)
    }

    /// Cancel a pending wage record. Records with money already recorded
    /// against them stay as the audit trail.
    #[instrument(skip(self), fields(payment_id = %payment_id))]
    pub async fn cancel_wage_payment(
        &self,
        payment_id: Uuid,
    ) -> Result<WagePaymentRecord, AppError> {
        let mut tables = self.inner.write().await;
        let record = tables
            .wage_payments
            .get_mut(&payment_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Wage payment record not found")))?;
        if record.status != WagePaymentStatus::Pending {
            return Err(AppError::Conflict(anyhow!(
                "Only pending wage payment records can be cancelled"
            )));
        }

        record.status = WagePaymentStatus::Cancelled;
        let cancelled = record.clone();
        info!(payment_id = %payment_id, "Wage payment record cancelled");
        Ok(cancelled)
    }

    pub async fn list_wage_payments(
        &self,
        staff_id: Option<Uuid>,
        status: Option<WagePaymentStatus>,
    ) -> Result<Vec<WagePaymentRecord>, AppError> {
        let tables = self.inner.read().await;
        let mut records: Vec<WagePaymentRecord> = tables
            .wage_payments
            .values()
            .filter(|p| staff_id.map_or(true, |id| p.staff_id == id))
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.period_end.cmp(&a.period_end));
        Ok(records)
    }
}

// -----------------------------------------------------------------------------
// Internal helpers, all called with the table lock already held.
// -----------------------------------------------------------------------------

fn validate_entry_hours(hours_worked: Decimal, overtime_hours: Decimal) -> Result<(), AppError> {
    if hours_worked <= Decimal::ZERO || hours_worked > Decimal::from(MAX_HOURS_PER_ENTRY) {
        return Err(AppError::Validation(anyhow!(
            "Hours worked must be greater than 0 and at most {}",
            MAX_HOURS_PER_ENTRY
        )));
    }
    if overtime_hours < Decimal::ZERO {
        return Err(AppError::Validation(anyhow!(
            "Overtime hours must not be negative"
        )));
    }
    Ok(())
}

/// Whether a work entry is claimed by any non-cancelled invoice.
fn is_attached(tables: &Tables, entry_id: Uuid) -> bool {
    tables.line_items.values().any(|item| {
        item.work_entry_id == entry_id
            && tables
                .invoices
                .get(&item.invoice_id)
                .map_or(false, |inv| inv.status != InvoiceStatus::Cancelled)
    })
}

fn ensure_editable(tables: &Tables, invoice_id: Uuid) -> Result<(), AppError> {
    let invoice = tables
        .invoices
        .get(&invoice_id)
        .ok_or_else(|| AppError::NotFound(anyhow!("Invoice not found")))?;
    if !invoice.status.is_editable() {
        return Err(AppError::Conflict(anyhow!(
            "Invoice is {} and can no longer be edited",
            invoice.status.as_str()
        )));
    }
    Ok(())
}

/// Recompute an invoice's totals from its current rows.
fn apply_totals(tables: &mut Tables, invoice_id: Uuid) {
    let line_items: Vec<InvoiceLineItem> = tables
        .line_items
        .values()
        .filter(|li| li.invoice_id == invoice_id)
        .cloned()
        .collect();
    let additional_costs: Vec<AdditionalCost> = tables
        .additional_costs
        .values()
        .filter(|c| c.invoice_id == invoice_id)
        .cloned()
        .collect();

    if let Some(invoice) = tables.invoices.get_mut(&invoice_id) {
        let computed = totals::recompute(invoice.vat_rate, &line_items, &additional_costs);
        invoice.subtotal = computed.subtotal;
        invoice.additional_cost_total = computed.additional_cost_total;
        invoice.vat_amount = computed.vat_amount;
        invoice.total_amount = computed.total_amount;
    }
}

/// Allocate the next `INV-<year>-<seq>` number from the per-year sequence,
/// retrying past collisions. Falls back to random suffixes only when the
/// sequence keeps colliding, and still refuses to reuse an existing number.
fn allocate_invoice_number(tables: &mut Tables, year: i32) -> Result<String, AppError> {
    for _ in 0..MAX_NUMBER_ATTEMPTS {
        let seq = tables.invoice_sequences.entry(year).or_insert(0);
        *seq += 1;
        let candidate = format!("INV-{}-{:05}", year, *seq);
        if !number_exists(tables, &candidate) {
            return Ok(candidate);
        }
        warn!(number = %candidate, "Invoice number collision, retrying");
    }

    let mut rng = rand::thread_rng();
    for _ in 0..MAX_NUMBER_ATTEMPTS {
        let suffix: u32 = rng.gen_range(1..=99_999);
        let candidate = format!("INV-{}-{:05}", year, suffix);
        if !number_exists(tables, &candidate) {
            warn!(number = %candidate, "Invoice number allocated from fallback generator");
            return Ok(candidate);
        }
    }

    Err(AppError::Conflict(anyhow!(
        "Unable to allocate a unique invoice number"
    )))
}

fn number_exists(tables: &Tables, number: &str) -> bool {
    tables
        .invoices
        .values()
        .any(|inv| inv.invoice_number == number)
}

/// Group period entries by staff, sum hours and wages due, and join the
/// overlapping wage payment records.
fn summarize_wages(
    tables: &Tables,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> Vec<StaffWagesSummary> {
    let mut by_staff: HashMap<Uuid, StaffWagesSummary> = HashMap::new();

    for entry in tables
        .work_entries
        .values()
        .filter(|e| e.date >= period_start && e.date <= period_end)
    {
        let Some(staff) = tables.staff.get(&entry.staff_id) else {
            continue;
        };
        let summary = by_staff
            .entry(entry.staff_id)
            .or_insert_with(|| StaffWagesSummary {
                staff_id: entry.staff_id,
                staff_name: staff.name.clone(),
                period_start,
                period_end,
                total_hours_worked: Decimal::ZERO,
                total_wages_due: Decimal::ZERO,
                total_paid: Decimal::ZERO,
                total_outstanding: Decimal::ZERO,
                last_payment_date: None,
                work_entries_count: 0,
            });
        summary.total_hours_worked += entry.hours_worked + entry.overtime_hours;
        summary.total_wages_due += entry.labor_cost;
        summary.work_entries_count += 1;
    }

    for payment in tables
        .wage_payments
        .values()
        .filter(|p| p.period_start <= period_end && p.period_end >= period_start)
    {
        if let Some(summary) = by_staff.get_mut(&payment.staff_id) {
            summary.total_paid += payment.amount_paid;
            if let Some(date) = payment.payment_date {
                if summary.last_payment_date.map_or(true, |last| date > last) {
                    summary.last_payment_date = Some(date);
                }
            }
        }
    }

    let mut summaries: Vec<StaffWagesSummary> = by_staff
        .into_values()
        .map(|mut s| {
            s.total_outstanding = s.total_wages_due - s.total_paid;
            s
        })
        .collect();
    summaries.sort_by(|a, b| a.staff_name.cmp(&b.staff_name));
    summaries
}
