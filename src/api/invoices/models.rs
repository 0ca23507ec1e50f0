use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domains::invoices::service::SubmittedLine;
use crate::domains::invoices::store::InvoiceFields;
use crate::domains::invoices::totals::InvoiceTotals;
use crate::models::{Invoice, InvoiceStatus};

// ============================================================================
// REQUEST MODELS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Display name of the invoice, entered by the user.
    #[serde(default)]
    pub name: String,
}

/// Whole-object update: every scalar field is overwritten on save, and the
/// submitted line set replaces the persisted one after reconciliation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveInvoiceRequest {
    pub issuer_name: String,
    pub issuer_address: String,
    pub client_name: String,
    pub client_address: String,
    pub invoice_date: String,
    pub due_date: String,
    pub vat_active: bool,
    pub vat_rate: Decimal,
    pub status: InvoiceStatus,
    pub lines: Vec<LinePayload>,
}

impl Default for SaveInvoiceRequest {
    fn default() -> Self {
        Self {
            issuer_name: String::new(),
            issuer_address: String::new(),
            client_name: String::new(),
            client_address: String::new(),
            invoice_date: String::new(),
            due_date: String::new(),
            vat_active: false,
            vat_rate: Decimal::from(20),
            status: InvoiceStatus::Draft,
            lines: Vec::new(),
        }
    }
}

/// A line as it arrives from the client. Missing quantity or unit price is
/// treated as zero; ids of brand-new lines are client-side placeholders.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinePayload {
    pub id: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl SaveInvoiceRequest {
    pub fn fields(&self) -> InvoiceFields {
        InvoiceFields {
            issuer_name: self.issuer_name.clone(),
            issuer_address: self.issuer_address.clone(),
            client_name: self.client_name.clone(),
            client_address: self.client_address.clone(),
            invoice_date: self.invoice_date.clone(),
            due_date: self.due_date.clone(),
            vat_active: self.vat_active,
            vat_rate: self.vat_rate,
            status: self.status,
        }
    }

    pub fn submitted_lines(&self) -> Vec<SubmittedLine> {
        self.lines
            .iter()
            .map(|line| SubmittedLine {
                id: line.id.clone(),
                description: line.description.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect()
    }
}

// ============================================================================
// RESPONSE MODELS
// ============================================================================

/// An invoice together with its computed totals, ready for display.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub totals: InvoiceTotals,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        let totals = InvoiceTotals::of(&invoice);
        Self { invoice, totals }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateInvoiceResponse {
    /// `null` when no user row exists yet for the authenticated email.
    pub invoice: Option<InvoiceResponse>,
}

#[derive(Debug, Serialize)]
pub struct ListInvoicesResponse {
    pub invoices: Vec<InvoiceResponse>,
}

#[derive(Debug, Serialize)]
pub struct EnsureUserResponse {
    pub status: &'static str,
}
