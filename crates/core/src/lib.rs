pub mod cart;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod session;

pub use cart::pricing::{CartPricer, CartTotals, ChartSlice, DeterministicCartPricer};
pub use cart::{CartChange, CartEntry, CartLedger};
pub use catalog::browse::BrowseState;
pub use catalog::query::{CatalogPage, CategoryFilter, PriceRange, QueryCriteria, SortOption};
pub use catalog::{Catalog, CatalogQueryEngine, DeterministicCatalogQueryEngine};
pub use domain::customer::{CustomerId, CustomerProfile};
pub use domain::product::{Category, CategoryId, Product, ProductId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use session::Session;
