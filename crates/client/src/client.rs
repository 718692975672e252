//! HTTP access to the storefront backend's customer-facing endpoints.
//!
//! Every call is attempted once. Non-2xx responses are turned into
//! [`ClientError::Api`] carrying the backend's `error` message.

use std::time::Duration;

use parcel_core::config::ProductServiceConfig;
use parcel_core::domain::customer::CustomerProfile;
use parcel_core::domain::product::{Category, Product, ProductId};
use reqwest::{Client, RequestBuilder, Response, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::wire::{
    products_from_dtos, CategoriesEnvelope, ErrorBody, LoginRequest, LoginResponse,
    ProductEnvelope, ProductsEnvelope, RegisterRequest, RegisterResponse,
    UserEnvelope,
};

#[derive(Clone, Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub phone: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LoginOutcome {
    pub token: SecretString,
    pub message: Option<String>,
}

#[derive(Clone, Debug)]
pub struct StorefrontClient {
    http: Client,
    base_url: Url,
}

impl StorefrontClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = parse_base_url(base_url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &ProductServiceConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn fetch_products(&self) -> Result<Vec<Product>, ClientError> {
        let envelope: ProductsEnvelope =
            self.send(self.http.get(self.endpoint(&["products", "customers", "all"])?)).await?;
        products_from_dtos(envelope.products)
    }

    pub async fn fetch_categories(&self) -> Result<Vec<Category>, ClientError> {
        let envelope: CategoriesEnvelope =
            self.send(self.http.get(self.endpoint(&["categories", "customers", "all"])?)).await?;
        Ok(envelope.categories.into_iter().map(Category::from).collect())
    }

    pub async fn fetch_product(&self, product_id: &ProductId) -> Result<Product, ClientError> {
        let url = self.endpoint(&["products", "customers", "product", &product_id.0])?;
        let envelope: ProductEnvelope = match self.send(self.http.get(url)).await {
            Err(ClientError::Api { status: 404, .. }) => {
                return Err(ClientError::NotFound(product_id.0.clone()))
            }
            other => other?,
        };
        let dto = envelope.product.ok_or_else(|| ClientError::NotFound(product_id.0.clone()))?;
        Product::try_from(dto)
    }

    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, ClientError> {
        let request = self.http.post(self.endpoint(&["users", "customers", "login"])?).json(
            &LoginRequest { user_email: email, user_password: password.expose_secret() },
        );
        let response: LoginResponse = self.send(request).await?;
        if response.customer_token.trim().is_empty() {
            return Err(ClientError::Decode("login response carried an empty token".to_string()));
        }
        Ok(LoginOutcome { token: response.customer_token.into(), message: response.message })
    }

    /// Resolves the customer behind a session token.
    pub async fn authenticate(&self, token: &SecretString) -> Result<CustomerProfile, ClientError> {
        let request = self
            .http
            .get(self.endpoint(&["users", "customers", "auth"])?)
            .bearer_auth(token.expose_secret());
        let envelope: UserEnvelope = self.send(request).await?;
        Ok(CustomerProfile::from(envelope.user))
    }

    pub async fn logout(&self, token: &SecretString) -> Result<(), ClientError> {
        let request = self
            .http
            .post(self.endpoint(&["users", "customers", "logout"])?)
            .bearer_auth(token.expose_secret())
            .json(&serde_json::json!({}));
        let response = request.send().await?;
        reject_error_status(response).await.map(|_| ())
    }

    pub async fn register(&self, registration: &Registration) -> Result<String, ClientError> {
        let request = self.http.post(self.endpoint(&["users", "customers", "register"])?).json(
            &RegisterRequest {
                user_name: &registration.name,
                user_email: &registration.email,
                user_password: registration.password.expose_secret(),
                user_phone: registration.phone.as_deref().unwrap_or(""),
            },
        );
        let response: RegisterResponse = self.send(request).await?;
        let message = response.message.unwrap_or_default();
        if !response.success {
            return Err(ClientError::Rejected(message));
        }
        Ok(message)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "url cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        debug!(
            event_name = "client.request.completed",
            url = %response.url(),
            status = response.status().as_u16(),
            "product service responded"
        );
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let response = reject_error_status(response).await?;
    response.json::<T>().await.map_err(|error| ClientError::Decode(error.to_string()))
}

async fn reject_error_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let url = response.url().to_string();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
        warn!(
            event_name = "client.request.rejected",
            url = %url,
            status = status.as_u16(),
            error = %message,
            "product service returned an error status"
        );
        return Err(ClientError::Api { status: status.as_u16(), message });
    }

    Ok(response)
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw.trim()).map_err(|error| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: error.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme `{}`", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::StorefrontClient;
    use crate::error::ClientError;

    #[test]
    fn endpoints_extend_the_base_path() {
        let client = StorefrontClient::new("http://localhost:4000/api/", Duration::from_secs(5))
            .expect("client");
        let url = client.endpoint(&["products", "customers", "product", "a b"]).expect("url");

        assert_eq!(url.as_str(), "http://localhost:4000/api/products/customers/product/a%20b");
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let error = StorefrontClient::new("ftp://files.example", Duration::from_secs(5))
            .expect_err("scheme");
        assert!(matches!(error, ClientError::InvalidBaseUrl { .. }));
    }
}
