use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use futures::future::join_all;
use rand::Rng;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::domains::invoices::store::{
    InvoiceFields, InvoiceStore, LineFields, NewInvoice, StoreError,
};
use crate::models::{Invoice, InvoiceStatus};

/// Typed outcome of a lifecycle operation, so callers can tell "not there"
/// apart from "the store broke" instead of receiving a silent empty result.
#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("invoice {id} not found")]
    InvoiceNotFound { id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A line as submitted by the client on save. Ids of lines that are new to
/// the store are client-generated placeholders and get replaced on insert.
#[derive(Debug, Clone)]
pub struct SubmittedLine {
    pub id: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl SubmittedLine {
    fn fields(&self) -> LineFields {
        LineFields {
            description: self.description.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}

/// Invoice lifecycle manager. Built against the injected store handle so the
/// Postgres repository and the in-memory store are interchangeable.
#[derive(Clone)]
pub struct InvoiceService {
    store: Arc<dyn InvoiceStore>,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn InvoiceStore>) -> Self {
        Self { store }
    }

    /// Creates the user row on first sight of a new email. No-op when the
    /// email is empty, when the user already exists, or when no display name
    /// is available yet.
    pub async fn ensure_user(&self, email: &str, name: &str) -> Result<(), InvoiceError> {
        if email.is_empty() {
            return Ok(());
        }
        if self.store.find_user_by_email(email).await?.is_some() {
            return Ok(());
        }
        if name.is_empty() {
            return Ok(());
        }
        self.store.insert_user(email, name).await?;
        Ok(())
    }

    /// Draws 3 random bytes, hex-encodes them and retries on collision.
    /// The keyspace is 2^24, so the loop terminates almost immediately in
    /// practice; no backoff between attempts.
    pub async fn allocate_invoice_id(&self) -> Result<String, InvoiceError> {
        loop {
            let mut raw = [0u8; 3];
            rand::thread_rng().fill(&mut raw);
            let id = hex::encode(raw);
            if self.store.find_invoice_by_id(&id, false).await?.is_none() {
                return Ok(id);
            }
            warn!(invoice_id = %id, "invoice id collision, drawing again");
        }
    }

    /// Creates a blank invoice (empty text fields, VAT off at 20%, Draft)
    /// owned by the user behind `email`. Returns `None` without an error when
    /// the email is empty or no user row exists yet; the row may simply not
    /// have been created on first login.
    pub async fn create_invoice(
        &self,
        email: &str,
        name: &str,
    ) -> Result<Option<Invoice>, InvoiceError> {
        if email.is_empty() {
            return Ok(None);
        }
        let Some(user) = self.store.find_user_by_email(email).await? else {
            warn!(email = %email, "create_invoice: no user row for email, nothing created");
            return Ok(None);
        };
        let id = self.allocate_invoice_id().await?;
        let invoice = self
            .store
            .insert_invoice(NewInvoice {
                id,
                user_id: user.id,
                name: name.to_string(),
            })
            .await?;
        Ok(Some(invoice))
    }

    /// All invoices owned by the user, transitioning overdue Pending invoices
    /// to Unpaid on the way out. Returns `None` when no user matches.
    ///
    /// The per-invoice status updates fan out concurrently with no ordering
    /// guarantee between them. A failed update leaves that invoice unchanged
    /// in the response; the transition is idempotent and will be retried on
    /// the next read.
    pub async fn list_invoices_for_user(
        &self,
        email: &str,
    ) -> Result<Option<Vec<Invoice>>, InvoiceError> {
        let Some(user) = self.store.find_user_by_email(email).await? else {
            return Ok(None);
        };
        let invoices = self.store.list_invoices_for_user(user.id).await?;
        let now = Utc::now();
        let updated =
            join_all(invoices.into_iter().map(|invoice| self.transition_if_overdue(invoice, now)))
                .await;
        Ok(Some(updated))
    }

    async fn transition_if_overdue(&self, invoice: Invoice, now: DateTime<Utc>) -> Invoice {
        if !is_overdue(&invoice, now) {
            return invoice;
        }
        match self.store.set_invoice_status(&invoice.id, InvoiceStatus::Unpaid).await {
            Ok(updated) => {
                info!(invoice_id = %updated.id, status = %updated.status, "pending invoice past due, marked unpaid");
                updated
            }
            Err(err) => {
                warn!(invoice_id = %invoice.id, error = %err, "overdue transition failed, will retry on next read");
                invoice
            }
        }
    }

    pub async fn get_invoice(&self, id: &str) -> Result<Invoice, InvoiceError> {
        self.store
            .find_invoice_by_id(id, true)
            .await?
            .ok_or_else(|| InvoiceError::InvoiceNotFound { id: id.to_string() })
    }

    /// Overwrites the invoice's scalar fields, then reconciles the submitted
    /// line set against the persisted one: persisted-only ids are deleted in
    /// one batch, id matches are updated only when a field actually changed,
    /// and unmatched submitted lines are inserted with a store-assigned id.
    pub async fn save_invoice(
        &self,
        id: &str,
        fields: InvoiceFields,
        submitted: Vec<SubmittedLine>,
    ) -> Result<Invoice, InvoiceError> {
        let existing = self
            .store
            .find_invoice_by_id(id, true)
            .await?
            .ok_or_else(|| InvoiceError::InvoiceNotFound { id: id.to_string() })?;

        self.store.update_invoice(id, fields).await?;

        let to_delete: Vec<String> = existing
            .lines
            .iter()
            .filter(|persisted| !submitted.iter().any(|line| line.id == persisted.id))
            .map(|persisted| persisted.id.clone())
            .collect();
        if !to_delete.is_empty() {
            self.store.delete_lines(&to_delete).await?;
        }

        for line in &submitted {
            match existing.lines.iter().find(|persisted| persisted.id == line.id) {
                Some(persisted) => {
                    // Exact field equality, no numeric tolerance.
                    let changed = persisted.description != line.description
                        || persisted.quantity != line.quantity
                        || persisted.unit_price != line.unit_price;
                    if changed {
                        self.store.update_line(&line.id, line.fields()).await?;
                    }
                }
                None => {
                    self.store.insert_line(id, line.fields()).await?;
                }
            }
        }

        self.get_invoice(id).await
    }

    pub async fn delete_invoice(&self, id: &str) -> Result<(), InvoiceError> {
        let rows_affected = self.store.delete_invoice(id).await?;
        if rows_affected == 0 {
            return Err(InvoiceError::InvoiceNotFound { id: id.to_string() });
        }
        info!(invoice_id = %id, "invoice deleted");
        Ok(())
    }
}

/// The due date is date-only, so it stands for midnight of that day; any
/// instant past it counts as overdue, meaning the due day itself already
/// triggers the transition.
fn is_overdue(invoice: &Invoice, now: DateTime<Utc>) -> bool {
    if invoice.status != InvoiceStatus::Pending {
        return false;
    }
    match NaiveDate::parse_from_str(&invoice.due_date, "%Y-%m-%d") {
        Ok(due_date) => due_date.and_time(NaiveTime::MIN).and_utc() < now,
        // Blank or malformed due dates never trigger the transition.
        Err(_) => false,
    }
}
