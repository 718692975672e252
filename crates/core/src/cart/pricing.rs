use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::CartLedger;
use crate::errors::DomainError;

/// 10%, applied to the whole subtotal.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// Display amounts, rounded half away from zero to cents.
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: to_cents(self.subtotal),
            tax_rate: self.tax_rate,
            tax: to_cents(self.tax),
            total: to_cents(self.total),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: Decimal,
}

pub trait CartPricer: Send + Sync {
    fn price(&self, ledger: &CartLedger) -> Result<CartTotals, DomainError>;
}

#[derive(Clone, Copy, Debug)]
pub struct DeterministicCartPricer {
    tax_rate: Decimal,
}

impl DeterministicCartPricer {
    pub fn new(tax_rate: Decimal) -> Self {
        Self { tax_rate }
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }
}

impl Default for DeterministicCartPricer {
    fn default() -> Self {
        Self::new(DEFAULT_TAX_RATE)
    }
}

impl CartPricer for DeterministicCartPricer {
    fn price(&self, ledger: &CartLedger) -> Result<CartTotals, DomainError> {
        compute_totals(ledger, self.tax_rate)
    }
}

pub fn compute_totals(ledger: &CartLedger, tax_rate: Decimal) -> Result<CartTotals, DomainError> {
    let subtotal = ledger.subtotal()?;
    let tax = subtotal.checked_mul(tax_rate).ok_or_else(|| overflow("cart tax"))?;
    let total = checked_add(subtotal, tax, "cart total")?;
    Ok(CartTotals { subtotal, tax_rate, tax, total })
}

pub fn chart_breakdown(ledger: &CartLedger) -> Result<Vec<ChartSlice>, DomainError> {
    ledger
        .entries()
        .iter()
        .map(|entry| {
            Ok(ChartSlice { name: entry.product.name.clone(), value: entry.line_total()? })
        })
        .collect()
}

pub(crate) fn checked_add(
    left: Decimal,
    right: Decimal,
    what: &str,
) -> Result<Decimal, DomainError> {
    left.checked_add(right).ok_or_else(|| overflow(what))
}

fn overflow(what: &str) -> DomainError {
    DomainError::InvalidArgument(format!("{what} overflows the supported amount range"))
}

fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
