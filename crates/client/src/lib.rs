pub mod client;
pub mod error;
pub mod loader;
pub mod source;
pub mod storefront;
pub mod wire;

pub use client::{LoginOutcome, Registration, StorefrontClient};
pub use error::ClientError;
pub use loader::{CatalogLoader, LoadError, LoadHandle};
pub use source::{InMemoryProductSource, ProductSource};
pub use storefront::{interface_error, CartSummary, Storefront};
