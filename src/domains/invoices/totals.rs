use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Invoice, InvoiceLine};

/// Computed amounts for one invoice. Values are exact decimals; rounding is
/// a presentation concern and is not applied here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub grand_total: Decimal,
}

impl InvoiceTotals {
    pub fn of(invoice: &Invoice) -> Self {
        let subtotal = subtotal(&invoice.lines);
        let vat_amount = vat_amount(subtotal, invoice.vat_active, invoice.vat_rate);
        Self {
            subtotal,
            vat_amount,
            grand_total: grand_total(subtotal, vat_amount),
        }
    }
}

/// Σ quantity × unit price over all lines.
pub fn subtotal(lines: &[InvoiceLine]) -> Decimal {
    lines
        .iter()
        .map(|line| Decimal::from(line.quantity) * line.unit_price)
        .sum()
}

/// VAT owed on a subtotal: zero when the VAT flag is off, otherwise
/// subtotal × rate / 100.
pub fn vat_amount(subtotal: Decimal, vat_active: bool, vat_rate: Decimal) -> Decimal {
    if vat_active {
        subtotal * vat_rate / Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

pub fn grand_total(subtotal: Decimal, vat_amount: Decimal) -> Decimal {
    subtotal + vat_amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn line(quantity: i32, unit_price: &str) -> InvoiceLine {
        InvoiceLine {
            id: format!("line-{}-{}", quantity, unit_price),
            invoice_id: "abc123".to_string(),
            description: String::new(),
            quantity,
            unit_price: unit_price.parse().unwrap(),
        }
    }

    #[test]
    fn subtotal_of_empty_line_set_is_zero() {
        assert_eq!(subtotal(&[]), Decimal::ZERO);
    }

    #[test]
    fn subtotal_sums_quantity_times_unit_price() {
        let lines = vec![line(2, "10.5"), line(3, "4"), line(0, "99.99")];
        assert_eq!(subtotal(&lines), "33.0".parse::<Decimal>().unwrap());
    }

    #[test]
    fn vat_is_zero_when_inactive_regardless_of_rate() {
        let sub = "100".parse::<Decimal>().unwrap();
        assert_eq!(vat_amount(sub, false, Decimal::from(20)), Decimal::ZERO);
        assert_eq!(vat_amount(sub, false, Decimal::from(500)), Decimal::ZERO);
    }

    #[test]
    fn vat_applies_rate_over_one_hundred() {
        let sub = "21.0".parse::<Decimal>().unwrap();
        let vat = vat_amount(sub, true, Decimal::from(20));
        assert_eq!(vat, "4.2".parse::<Decimal>().unwrap());
    }

    #[test]
    fn grand_total_is_subtotal_plus_vat() {
        let lines = vec![line(2, "10.5")];
        let sub = subtotal(&lines);
        let vat = vat_amount(sub, true, Decimal::from(20));
        assert_eq!(sub, "21.0".parse::<Decimal>().unwrap());
        assert_eq!(grand_total(sub, vat), "25.2".parse::<Decimal>().unwrap());
    }

    #[test]
    fn totals_are_stable_under_recomputation() {
        let lines = vec![line(7, "3.33"), line(1, "0.01")];
        let first = subtotal(&lines);
        let second = subtotal(&lines);
        assert_eq!(first, second);
    }
}
