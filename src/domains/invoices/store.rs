use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{Invoice, InvoiceLine, InvoiceStatus, User};

/// Failure inside the persistence collaborator (connectivity, constraint
/// violation). Carries the underlying message for logging.
#[derive(Error, Debug)]
#[error("store failure: {0}")]
pub struct StoreError(pub String);

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError(err.to_string())
    }
}

/// Scalar fields overwritten by a whole-object invoice update.
#[derive(Debug, Clone)]
pub struct InvoiceFields {
    pub issuer_name: String,
    pub issuer_address: String,
    pub client_name: String,
    pub client_address: String,
    pub invoice_date: String,
    pub due_date: String,
    pub vat_active: bool,
    pub vat_rate: Decimal,
    pub status: InvoiceStatus,
}

/// Mutable fields of a single line.
#[derive(Debug, Clone)]
pub struct LineFields {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// A blank invoice about to be inserted. Everything except the identifier,
/// owner and display name starts at its default (empty text, VAT off at 20%,
/// Draft status).
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub id: String,
    pub user_id: i64,
    pub name: String,
}

/// Generic record-store contract the lifecycle manager is built against.
///
/// The handle is constructed explicitly and injected into the service, so
/// tests can swap the Postgres implementation for [`MemoryStore`]
/// (`crate::domains::invoices::memory::MemoryStore`).
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert_user(&self, email: &str, name: &str) -> Result<User, StoreError>;

    async fn find_invoice_by_id(
        &self,
        id: &str,
        include_lines: bool,
    ) -> Result<Option<Invoice>, StoreError>;

    /// All invoices owned by the user, each with its lines loaded.
    async fn list_invoices_for_user(&self, user_id: i64) -> Result<Vec<Invoice>, StoreError>;

    async fn insert_invoice(&self, new: NewInvoice) -> Result<Invoice, StoreError>;

    /// Overwrites the scalar fields in one update; does not touch lines.
    async fn update_invoice(&self, id: &str, fields: InvoiceFields) -> Result<Invoice, StoreError>;

    /// Partial update used by the lazy overdue transition. Returns the
    /// updated invoice with its lines.
    async fn set_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
    ) -> Result<Invoice, StoreError>;

    /// Returns the number of rows affected (0 when the invoice was absent).
    /// Lines go with the invoice by referential cascade.
    async fn delete_invoice(&self, id: &str) -> Result<u64, StoreError>;

    async fn delete_lines(&self, ids: &[String]) -> Result<(), StoreError>;

    async fn update_line(&self, id: &str, fields: LineFields) -> Result<(), StoreError>;

    /// Inserts a new line bound to the invoice. The store assigns the id;
    /// any client-supplied id is discarded by the caller before this point.
    async fn insert_line(
        &self,
        invoice_id: &str,
        fields: LineFields,
    ) -> Result<InvoiceLine, StoreError>;
}
