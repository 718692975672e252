pub mod pricing;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

use self::pricing::{CartTotals, ChartSlice};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Snapshot taken when the product was first added.
    pub product: Product,
    pub quantity: u32,
}

impl CartEntry {
    pub fn line_total(&self) -> Result<Decimal, DomainError> {
        self.product.price.checked_mul(Decimal::from(self.quantity)).ok_or_else(|| {
            DomainError::InvalidArgument(format!(
                "line total for `{}` overflows ({} x {})",
                self.product.id.0, self.product.price, self.quantity
            ))
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartChange {
    Decremented { quantity: u32 },
    Removed,
    Unchanged,
}

/// Line items for the current session in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLedger {
    entries: Vec<CartEntry>,
}

impl CartLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn entry(&self, product_id: &ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| &entry.product.id == product_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn item_count(&self) -> u64 {
        self.entries.iter().map(|entry| u64::from(entry.quantity)).sum()
    }

    pub fn add_or_increment(
        &mut self,
        product: &Product,
        is_authenticated: bool,
    ) -> Result<&CartEntry, DomainError> {
        if !is_authenticated {
            return Err(DomainError::Unauthorized);
        }

        let index = match self.position(&product.id) {
            Some(index) => {
                let entry = &mut self.entries[index];
                entry.quantity = entry.quantity.saturating_add(1);
                index
            }
            None => {
                self.entries.push(CartEntry { product: product.clone(), quantity: 1 });
                self.entries.len() - 1
            }
        };

        Ok(&self.entries[index])
    }

    /// Lowers the quantity by one; an entry at quantity 1 leaves the ledger.
    pub fn decrement(&mut self, product_id: &ProductId) -> CartChange {
        let Some(index) = self.position(product_id) else {
            return CartChange::Unchanged;
        };

        let entry = &mut self.entries[index];
        if entry.quantity > 1 {
            entry.quantity -= 1;
            return CartChange::Decremented { quantity: entry.quantity };
        }

        self.entries.remove(index);
        CartChange::Removed
    }

    pub fn remove(&mut self, product_id: &ProductId) -> CartChange {
        match self.position(product_id) {
            Some(index) => {
                self.entries.remove(index);
                CartChange::Removed
            }
            None => CartChange::Unchanged,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn subtotal(&self) -> Result<Decimal, DomainError> {
        self.entries.iter().try_fold(Decimal::ZERO, |subtotal, entry| {
            pricing::checked_add(subtotal, entry.line_total()?, "cart subtotal")
        })
    }

    pub fn totals(&self, tax_rate: Decimal) -> Result<CartTotals, DomainError> {
        pricing::compute_totals(self, tax_rate)
    }

    pub fn chart_breakdown(&self) -> Result<Vec<ChartSlice>, DomainError> {
        pricing::chart_breakdown(self)
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.product.id == product_id)
    }
}
