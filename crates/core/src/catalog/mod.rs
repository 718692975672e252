pub mod browse;
pub mod query;

use crate::domain::product::{Category, CategoryId, Product, ProductId};
use crate::errors::DomainError;

use self::query::{CatalogPage, QueryCriteria};

pub trait CatalogQueryEngine: Send + Sync {
    fn query(&self, products: &[Product], criteria: &QueryCriteria)
        -> Result<CatalogPage, DomainError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicCatalogQueryEngine;

impl CatalogQueryEngine for DeterministicCatalogQueryEngine {
    fn query(
        &self,
        products: &[Product],
        criteria: &QueryCriteria,
    ) -> Result<CatalogPage, DomainError> {
        query::query(products, criteria)
    }
}

/// Products and categories fetched for one storefront load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self { products, categories }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == product_id)
    }

    pub fn category(&self, category_id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| &category.id == category_id)
    }

    pub fn query(&self, criteria: &QueryCriteria) -> Result<CatalogPage, DomainError> {
        self.query_with(&DeterministicCatalogQueryEngine, criteria)
    }

    pub fn query_with<E: CatalogQueryEngine>(
        &self,
        engine: &E,
        criteria: &QueryCriteria,
    ) -> Result<CatalogPage, DomainError> {
        engine.query(&self.products, criteria)
    }
}
