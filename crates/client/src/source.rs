use async_trait::async_trait;
use parcel_core::domain::product::{Category, Product, ProductId};

use crate::client::StorefrontClient;
use crate::error::ClientError;

/// Where listings come from. The loader and storefront only see this seam.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn products(&self) -> Result<Vec<Product>, ClientError>;

    async fn categories(&self) -> Result<Vec<Category>, ClientError>;

    async fn product(&self, product_id: &ProductId) -> Result<Product, ClientError>;
}

#[async_trait]
impl ProductSource for StorefrontClient {
    async fn products(&self) -> Result<Vec<Product>, ClientError> {
        self.fetch_products().await
    }

    async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        self.fetch_categories().await
    }

    async fn product(&self, product_id: &ProductId) -> Result<Product, ClientError> {
        self.fetch_product(product_id).await
    }
}

/// Fixed listings held in memory, used for offline browsing and fixtures.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProductSource {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl InMemoryProductSource {
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self { products, categories }
    }
}

#[async_trait]
impl ProductSource for InMemoryProductSource {
    async fn products(&self) -> Result<Vec<Product>, ClientError> {
        Ok(self.products.clone())
    }

    async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        Ok(self.categories.clone())
    }

    async fn product(&self, product_id: &ProductId) -> Result<Product, ClientError> {
        self.products
            .iter()
            .find(|product| &product.id == product_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(product_id.0.clone()))
    }
}
