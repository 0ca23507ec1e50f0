use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::domains::invoices::store::{
    InvoiceFields, InvoiceStore, LineFields, NewInvoice, StoreError,
};
use crate::models::{Invoice, InvoiceLine, InvoiceStatus, User};

/// Postgres-backed implementation of the record-store contract.
#[derive(Clone)]
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lines_for_invoice(&self, invoice_id: &str) -> Result<Vec<InvoiceLine>, StoreError> {
        let lines = sqlx::query_as::<_, InvoiceLine>(
            "SELECT id, invoice_id, description, quantity, unit_price \
             FROM invoice_lines WHERE invoice_id = $1 ORDER BY id",
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }
}

fn invoice_from_row(row: &PgRow) -> Result<Invoice, sqlx::Error> {
    Ok(Invoice {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        issuer_name: row.try_get("issuer_name")?,
        issuer_address: row.try_get("issuer_address")?,
        client_name: row.try_get("client_name")?,
        client_address: row.try_get("client_address")?,
        invoice_date: row.try_get("invoice_date")?,
        due_date: row.try_get("due_date")?,
        vat_active: row.try_get("vat_active")?,
        vat_rate: row.try_get("vat_rate")?,
        status: InvoiceStatus::from(row.try_get::<i32, _>("status")?),
        lines: Vec::new(),
    })
}

const INVOICE_COLUMNS: &str = "id, user_id, name, issuer_name, issuer_address, \
    client_name, client_address, invoice_date, due_date, vat_active, vat_rate, status";

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, email: &str, name: &str) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, name) VALUES ($1, $2) \
             RETURNING id, email, name, created_at",
        )
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        info!(email = %user.email, user_id = user.id, "inserted new user");
        Ok(user)
    }

    async fn find_invoice_by_id(
        &self,
        id: &str,
        include_lines: bool,
    ) -> Result<Option<Invoice>, StoreError> {
        let query = format!("SELECT {} FROM invoices WHERE id = $1", INVOICE_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;

        match row {
            Some(row) => {
                let mut invoice = invoice_from_row(&row)?;
                if include_lines {
                    invoice.lines = self.lines_for_invoice(id).await?;
                }
                Ok(Some(invoice))
            }
            None => Ok(None),
        }
    }

    async fn list_invoices_for_user(&self, user_id: i64) -> Result<Vec<Invoice>, StoreError> {
        let query = format!(
            "SELECT {} FROM invoices WHERE user_id = $1 ORDER BY created_at",
            INVOICE_COLUMNS
        );
        let rows = sqlx::query(&query).bind(user_id).fetch_all(&self.pool).await?;

        let mut invoices = Vec::with_capacity(rows.len());
        for row in &rows {
            invoices.push(invoice_from_row(row)?);
        }

        if invoices.is_empty() {
            return Ok(invoices);
        }

        // One round trip for the whole line set instead of one per invoice.
        let ids: Vec<String> = invoices.iter().map(|i| i.id.clone()).collect();
        let lines = sqlx::query_as::<_, InvoiceLine>(
            "SELECT id, invoice_id, description, quantity, unit_price \
             FROM invoice_lines WHERE invoice_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_invoice: HashMap<String, Vec<InvoiceLine>> = HashMap::new();
        for line in lines {
            by_invoice.entry(line.invoice_id.clone()).or_default().push(line);
        }
        for invoice in &mut invoices {
            if let Some(lines) = by_invoice.remove(&invoice.id) {
                invoice.lines = lines;
            }
        }

        Ok(invoices)
    }

    async fn insert_invoice(&self, new: NewInvoice) -> Result<Invoice, StoreError> {
        let query = format!(
            "INSERT INTO invoices (id, user_id, name) VALUES ($1, $2, $3) RETURNING {}",
            INVOICE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(&new.id)
            .bind(new.user_id)
            .bind(&new.name)
            .fetch_one(&self.pool)
            .await?;
        let invoice = invoice_from_row(&row)?;
        info!(invoice_id = %invoice.id, user_id = invoice.user_id, "inserted blank invoice");
        Ok(invoice)
    }

    async fn update_invoice(&self, id: &str, fields: InvoiceFields) -> Result<Invoice, StoreError> {
        let query = format!(
            "UPDATE invoices SET \
                issuer_name = $1, issuer_address = $2, client_name = $3, \
                client_address = $4, invoice_date = $5, due_date = $6, \
                vat_active = $7, vat_rate = $8, status = $9 \
             WHERE id = $10 RETURNING {}",
            INVOICE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(&fields.issuer_name)
            .bind(&fields.issuer_address)
            .bind(&fields.client_name)
            .bind(&fields.client_address)
            .bind(&fields.invoice_date)
            .bind(&fields.due_date)
            .bind(fields.vat_active)
            .bind(fields.vat_rate)
            .bind(fields.status.code())
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(invoice_from_row(&row)?)
    }

    async fn set_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
    ) -> Result<Invoice, StoreError> {
        let query = format!(
            "UPDATE invoices SET status = $1 WHERE id = $2 RETURNING {}",
            INVOICE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(status.code())
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        let mut invoice = invoice_from_row(&row)?;
        invoice.lines = self.lines_for_invoice(id).await?;
        Ok(invoice)
    }

    async fn delete_invoice(&self, id: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_lines(&self, ids: &[String]) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM invoice_lines WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_line(&self, id: &str, fields: LineFields) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE invoice_lines SET description = $1, quantity = $2, unit_price = $3 \
             WHERE id = $4",
        )
        .bind(&fields.description)
        .bind(fields.quantity)
        .bind(fields.unit_price)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_line(
        &self,
        invoice_id: &str,
        fields: LineFields,
    ) -> Result<InvoiceLine, StoreError> {
        let line = InvoiceLine {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.to_string(),
            description: fields.description,
            quantity: fields.quantity,
            unit_price: fields.unit_price,
        };
        sqlx::query(
            "INSERT INTO invoice_lines (id, invoice_id, description, quantity, unit_price) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&line.id)
        .bind(&line.invoice_id)
        .bind(&line.description)
        .bind(line.quantity)
        .bind(line.unit_price)
        .execute(&self.pool)
        .await?;
        Ok(line)
    }
}
