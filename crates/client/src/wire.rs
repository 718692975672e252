//! JSON shapes exchanged with the storefront REST backend.

use parcel_core::domain::customer::{CustomerId, CustomerProfile};
use parcel_core::domain::product::{Category, CategoryId, Product, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

#[derive(Debug, Deserialize)]
pub struct ProductDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub product_name: String,
    #[serde(default)]
    pub product_description: String,
    pub product_price: Decimal,
    #[serde(default)]
    pub product_image: String,
    #[serde(default)]
    pub categories: Vec<CategoryLinkDto>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryLinkDto {
    pub category: CategoryRefDto,
}

/// The detail endpoint populates category links; the listing returns bare ids.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CategoryRefDto {
    Id(String),
    Populated(CategoryDto),
}

impl CategoryRefDto {
    fn into_id(self) -> CategoryId {
        match self {
            Self::Id(id) => CategoryId(id),
            Self::Populated(category) => CategoryId(category.id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub category_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UserDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_name: String,
    pub user_email: String,
    #[serde(default)]
    pub user_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductsEnvelope {
    pub products: Vec<ProductDto>,
}

#[derive(Debug, Deserialize)]
pub struct ProductEnvelope {
    pub product: Option<ProductDto>,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesEnvelope {
    pub categories: Vec<CategoryDto>,
}

#[derive(Debug, Deserialize)]
pub struct UserEnvelope {
    pub user: UserDto,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message).filter(|message| !message.trim().is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub user_email: &'a str,
    pub user_password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub customer_token: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub user_name: &'a str,
    pub user_email: &'a str,
    pub user_password: &'a str,
    pub user_phone: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl TryFrom<ProductDto> for Product {
    type Error = ClientError;

    fn try_from(dto: ProductDto) -> Result<Self, Self::Error> {
        let product = Product {
            id: ProductId(dto.id),
            name: dto.product_name,
            description: dto.product_description,
            price: dto.product_price,
            image: dto.product_image,
            categories: dto.categories.into_iter().map(|link| link.category.into_id()).collect(),
        };
        product.validate().map_err(|error| ClientError::Decode(error.to_string()))?;
        Ok(product)
    }
}

impl From<CategoryDto> for Category {
    fn from(dto: CategoryDto) -> Self {
        Self { id: CategoryId(dto.id), name: dto.category_name }
    }
}

impl From<UserDto> for CustomerProfile {
    fn from(dto: UserDto) -> Self {
        Self {
            id: CustomerId(dto.id),
            name: dto.user_name,
            email: dto.user_email,
            phone: dto.user_phone.filter(|phone| !phone.trim().is_empty()),
        }
    }
}

pub fn products_from_dtos(dtos: Vec<ProductDto>) -> Result<Vec<Product>, ClientError> {
    dtos.into_iter().map(Product::try_from).collect()
}
