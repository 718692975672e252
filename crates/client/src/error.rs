use parcel_core::errors::ApplicationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid product service url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request to product service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("product service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("product service rejected the request: {0}")]
    Rejected(String),
    #[error("could not decode product service payload: {0}")]
    Decode(String),
    #[error("product `{0}` was not found")]
    NotFound(String),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

impl From<ClientError> for ApplicationError {
    fn from(value: ClientError) -> Self {
        match value {
            ClientError::InvalidBaseUrl { .. } => Self::Configuration(value.to_string()),
            ClientError::NotFound(id) => {
                Self::Domain(parcel_core::DomainError::NotFound(format!("product `{id}`")))
            }
            other => Self::Integration(other.to_string()),
        }
    }
}
