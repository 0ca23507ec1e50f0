use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Closed status enumeration for invoices.
/// Stored as an integer code; unknown codes decode to Draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum InvoiceStatus {
    Draft,
    Pending,
    Paid,
    Cancelled,
    Unpaid,
}

impl InvoiceStatus {
    pub fn code(self) -> i32 {
        match self {
            InvoiceStatus::Draft => 1,
            InvoiceStatus::Pending => 2,
            InvoiceStatus::Paid => 3,
            InvoiceStatus::Cancelled => 4,
            InvoiceStatus::Unpaid => 5,
        }
    }
}

impl From<i32> for InvoiceStatus {
    fn from(code: i32) -> Self {
        match code {
            2 => InvoiceStatus::Pending,
            3 => InvoiceStatus::Paid,
            4 => InvoiceStatus::Cancelled,
            5 => InvoiceStatus::Unpaid,
            _ => InvoiceStatus::Draft,
        }
    }
}

impl From<InvoiceStatus> for i32 {
    fn from(status: InvoiceStatus) -> Self {
        status.code()
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
            InvoiceStatus::Unpaid => "unpaid",
        };
        write!(f, "{}", label)
    }
}

/// One billable row on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub id: String,
    pub invoice_id: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// An invoice with its line collection.
///
/// `invoice_date` / `due_date` are date-only strings (YYYY-MM-DD) exactly as
/// the client submits them; they stay empty until the user fills them in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub user_id: i64,
    pub name: String,
    pub issuer_name: String,
    pub issuer_address: String,
    pub client_name: String,
    pub client_address: String,
    pub invoice_date: String,
    pub due_date: String,
    pub vat_active: bool,
    pub vat_rate: Decimal,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub lines: Vec<InvoiceLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for code in 1..=5 {
            assert_eq!(InvoiceStatus::from(code).code(), code);
        }
    }

    #[test]
    fn unknown_status_code_decodes_to_draft() {
        assert_eq!(InvoiceStatus::from(0), InvoiceStatus::Draft);
        assert_eq!(InvoiceStatus::from(42), InvoiceStatus::Draft);
    }

    #[test]
    fn status_serializes_as_integer() {
        let json = serde_json::to_string(&InvoiceStatus::Unpaid).unwrap();
        assert_eq!(json, "5");
    }
}
