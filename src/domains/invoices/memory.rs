use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::domains::invoices::store::{
    InvoiceFields, InvoiceStore, LineFields, NewInvoice, StoreError,
};
use crate::models::{Invoice, InvoiceLine, InvoiceStatus, User};

/// In-memory implementation of the record-store contract.
///
/// Backs the test suite and local development without a Postgres instance.
/// Invoices keep their lines embedded, in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_user_id: i64,
    users: Vec<User>,
    invoices: HashMap<String, Invoice>,
    invoice_order: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(id: &str) -> StoreError {
    StoreError(format!("no invoice row with id {}", id))
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, email: &str, name: &str) -> Result<User, StoreError> {
        let mut inner = self.inner.lock();
        if inner.users.iter().any(|u| u.email == email) {
            return Err(StoreError(format!("duplicate email {}", email)));
        }
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            email: email.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_invoice_by_id(
        &self,
        id: &str,
        include_lines: bool,
    ) -> Result<Option<Invoice>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner.invoices.get(id).map(|invoice| {
            let mut invoice = invoice.clone();
            if !include_lines {
                invoice.lines.clear();
            }
            invoice
        }))
    }

    async fn list_invoices_for_user(&self, user_id: i64) -> Result<Vec<Invoice>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .invoice_order
            .iter()
            .filter_map(|id| inner.invoices.get(id))
            .filter(|invoice| invoice.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_invoice(&self, new: NewInvoice) -> Result<Invoice, StoreError> {
        let mut inner = self.inner.lock();
        if inner.invoices.contains_key(&new.id) {
            return Err(StoreError(format!("duplicate invoice id {}", new.id)));
        }
        let invoice = Invoice {
            id: new.id.clone(),
            user_id: new.user_id,
            name: new.name,
            issuer_name: String::new(),
            issuer_address: String::new(),
            client_name: String::new(),
            client_address: String::new(),
            invoice_date: String::new(),
            due_date: String::new(),
            vat_active: false,
            vat_rate: 20.into(),
            status: InvoiceStatus::Draft,
            lines: Vec::new(),
        };
        inner.invoice_order.push(new.id.clone());
        inner.invoices.insert(new.id, invoice.clone());
        Ok(invoice)
    }

    async fn update_invoice(&self, id: &str, fields: InvoiceFields) -> Result<Invoice, StoreError> {
        let mut inner = self.inner.lock();
        let invoice = inner.invoices.get_mut(id).ok_or_else(|| not_found(id))?;
        invoice.issuer_name = fields.issuer_name;
        invoice.issuer_address = fields.issuer_address;
        invoice.client_name = fields.client_name;
        invoice.client_address = fields.client_address;
        invoice.invoice_date = fields.invoice_date;
        invoice.due_date = fields.due_date;
        invoice.vat_active = fields.vat_active;
        invoice.vat_rate = fields.vat_rate;
        invoice.status = fields.status;
        let mut updated = invoice.clone();
        updated.lines.clear();
        Ok(updated)
    }

    async fn set_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
    ) -> Result<Invoice, StoreError> {
        let mut inner = self.inner.lock();
        let invoice = inner.invoices.get_mut(id).ok_or_else(|| not_found(id))?;
        invoice.status = status;
        Ok(invoice.clone())
    }

    async fn delete_invoice(&self, id: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock();
        match inner.invoices.remove(id) {
            Some(_) => {
                inner.invoice_order.retain(|existing| existing != id);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_lines(&self, ids: &[String]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        for invoice in inner.invoices.values_mut() {
            invoice.lines.retain(|line| !ids.contains(&line.id));
        }
        Ok(())
    }

    async fn update_line(&self, id: &str, fields: LineFields) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        for invoice in inner.invoices.values_mut() {
            if let Some(line) = invoice.lines.iter_mut().find(|line| line.id == id) {
                line.description = fields.description;
                line.quantity = fields.quantity;
                line.unit_price = fields.unit_price;
                return Ok(());
            }
        }
        Err(StoreError(format!("no line row with id {}", id)))
    }

    async fn insert_line(
        &self,
        invoice_id: &str,
        fields: LineFields,
    ) -> Result<InvoiceLine, StoreError> {
        let mut inner = self.inner.lock();
        let invoice = inner
            .invoices
            .get_mut(invoice_id)
            .ok_or_else(|| not_found(invoice_id))?;
        let line = InvoiceLine {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.to_string(),
            description: fields.description,
            quantity: fields.quantity,
            unit_price: fields.unit_price,
        };
        invoice.lines.push(line.clone());
        Ok(line)
    }
}
