use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(pub String);

/// One listed property. Read-only input to the catalog engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: String,
    pub categories: Vec<CategoryId>,
}

impl Product {
    pub fn in_category(&self, category_id: &CategoryId) -> bool {
        self.categories.iter().any(|candidate| candidate == category_id)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.price < Decimal::ZERO {
            return Err(DomainError::InvalidArgument(format!(
                "product `{}` has negative price {}",
                self.id.0, self.price
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
