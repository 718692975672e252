//! Session-scoped storefront state: one shopper browsing one catalog with one cart.

use parcel_core::cart::pricing::{CartPricer, CartTotals, ChartSlice, DeterministicCartPricer};
use parcel_core::cart::{CartChange, CartEntry, CartLedger};
use parcel_core::catalog::browse::BrowseState;
use parcel_core::catalog::query::{CatalogPage, PriceRange, SortOption};
use parcel_core::catalog::Catalog;
use parcel_core::config::AppConfig;
use parcel_core::domain::customer::CustomerProfile;
use parcel_core::domain::product::{CategoryId, Product, ProductId};
use parcel_core::errors::{ApplicationError, DomainError, InterfaceError};
use parcel_core::session::Session;
use secrecy::SecretString;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::StorefrontClient;
use crate::loader;
use crate::source::ProductSource;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub entries: Vec<CartEntry>,
    pub item_count: u64,
    pub totals: CartTotals,
    pub breakdown: Vec<ChartSlice>,
    pub currency: String,
}

#[derive(Clone, Debug)]
pub struct Storefront {
    session: Session,
    catalog: Catalog,
    browse: BrowseState,
    cart: CartLedger,
    pricer: DeterministicCartPricer,
    currency: String,
}

impl Storefront {
    pub fn new(catalog: Catalog, config: &AppConfig) -> Self {
        Self {
            session: Session::default(),
            catalog,
            browse: BrowseState::new(config.catalog.page_size),
            cart: CartLedger::new(),
            pricer: DeterministicCartPricer::new(config.cart.tax_rate),
            currency: config.cart.currency.clone(),
        }
    }

    pub async fn load<S>(source: &S, config: &AppConfig) -> Result<Self, ApplicationError>
    where
        S: ProductSource + ?Sized,
    {
        let catalog = loader::load(source).await?;
        Ok(Self::new(catalog, config))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn browse(&self) -> &BrowseState {
        &self.browse
    }

    pub fn cart(&self) -> &CartLedger {
        &self.cart
    }

    /// Swaps in a freshly fetched catalog. Cart entries keep their snapshots.
    pub fn replace_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
    }

    pub fn current_page(&self) -> Result<CatalogPage, ApplicationError> {
        Ok(self.catalog.query(self.browse.criteria())?)
    }

    pub fn select_category(
        &mut self,
        category: Option<CategoryId>,
    ) -> Result<CatalogPage, ApplicationError> {
        if let Some(category_id) = &category {
            if self.catalog.category(category_id).is_none() {
                debug!(
                    event_name = "storefront.category.unknown",
                    category_id = %category_id.0,
                    "filtering by a category the catalog does not list"
                );
            }
        }
        self.browse.set_category(category);
        self.current_page()
    }

    pub fn search(&mut self, term: impl Into<String>) -> Result<CatalogPage, ApplicationError> {
        self.browse.set_search_term(term);
        self.current_page()
    }

    pub fn sort_by(&mut self, sort: SortOption) -> Result<CatalogPage, ApplicationError> {
        self.browse.set_sort(sort);
        self.current_page()
    }

    pub fn filter_price(&mut self, range: PriceRange) -> Result<CatalogPage, ApplicationError> {
        self.browse.set_price_range(range);
        self.current_page()
    }

    pub fn go_to_page(&mut self, page: u32) -> Result<CatalogPage, ApplicationError> {
        self.browse.set_page(page);
        self.current_page()
    }

    pub fn add_to_cart(&mut self, product_id: &ProductId) -> Result<&CartEntry, ApplicationError> {
        let product = self
            .catalog
            .find(product_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("product `{}`", product_id.0)))?;
        self.add_snapshot(product)
    }

    /// Bumps an existing line using the snapshot already held in the cart.
    pub fn increase(&mut self, product_id: &ProductId) -> Result<&CartEntry, ApplicationError> {
        let product = self
            .cart
            .entry(product_id)
            .map(|entry| entry.product.clone())
            .ok_or_else(|| DomainError::NotFound(format!("cart entry `{}`", product_id.0)))?;
        self.add_snapshot(product)
    }

    pub fn decrease(&mut self, product_id: &ProductId) -> CartChange {
        let change = self.cart.decrement(product_id);
        log_change("storefront.cart.decreased", product_id, change);
        change
    }

    pub fn remove(&mut self, product_id: &ProductId) -> CartChange {
        let change = self.cart.remove(product_id);
        log_change("storefront.cart.removed", product_id, change);
        change
    }

    pub fn summary(&self) -> Result<CartSummary, ApplicationError> {
        Ok(CartSummary {
            entries: self.cart.entries().to_vec(),
            item_count: self.cart.item_count(),
            totals: self.pricer.price(&self.cart)?.rounded(),
            breakdown: self.cart.chart_breakdown()?,
            currency: self.currency.clone(),
        })
    }

    pub fn sign_in(&mut self, customer: CustomerProfile) {
        info!(
            event_name = "storefront.session.signed_in",
            customer_id = %customer.id.0,
            "customer signed in"
        );
        self.session.sign_in(customer);
    }

    /// Logs in against the backend and resolves the profile behind the token.
    pub async fn log_in(
        &mut self,
        client: &StorefrontClient,
        email: &str,
        password: &SecretString,
    ) -> Result<SecretString, ApplicationError> {
        let outcome = client.login(email, password).await?;
        let customer = client.authenticate(&outcome.token).await?;
        self.sign_in(customer);
        Ok(outcome.token)
    }

    /// Ends the session. The cart belongs to the session and is emptied with it.
    pub fn sign_out(&mut self) -> Option<CustomerProfile> {
        let customer = self.session.sign_out();
        let dropped = self.cart.len();
        self.cart.clear();
        if let Some(customer) = &customer {
            info!(
                event_name = "storefront.session.signed_out",
                customer_id = %customer.id.0,
                dropped_entries = dropped,
                "customer signed out"
            );
        }
        customer
    }

    fn add_snapshot(&mut self, product: Product) -> Result<&CartEntry, ApplicationError> {
        let authenticated = self.session.is_authenticated();
        match self.cart.add_or_increment(&product, authenticated) {
            Ok(entry) => {
                info!(
                    event_name = "storefront.cart.added",
                    product_id = %entry.product.id.0,
                    quantity = entry.quantity,
                    "cart entry updated"
                );
                Ok(entry)
            }
            Err(error) => {
                warn!(
                    event_name = "storefront.cart.rejected",
                    product_id = %product.id.0,
                    error = %error,
                    "cart mutation rejected"
                );
                Err(error.into())
            }
        }
    }
}

/// Maps an application failure to its user-facing form with a fresh correlation id.
pub fn interface_error(error: ApplicationError) -> InterfaceError {
    error.into_interface(Uuid::new_v4().to_string())
}

fn log_change(event_name: &'static str, product_id: &ProductId, change: CartChange) {
    match change {
        CartChange::Unchanged => debug!(
            event_name,
            product_id = %product_id.0,
            "cart unchanged; product not in cart"
        ),
        CartChange::Decremented { quantity } => info!(
            event_name,
            product_id = %product_id.0,
            quantity,
            "cart entry decremented"
        ),
        CartChange::Removed => info!(
            event_name,
            product_id = %product_id.0,
            "cart entry removed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use parcel_core::cart::CartChange;
    use parcel_core::catalog::query::{PriceRange, SortOption};
    use parcel_core::catalog::Catalog;
    use parcel_core::config::AppConfig;
    use parcel_core::domain::customer::{CustomerId, CustomerProfile};
    use parcel_core::domain::product::{Category, CategoryId, Product, ProductId};
    use parcel_core::errors::{ApplicationError, DomainError, InterfaceError};
    use rust_decimal::Decimal;

    use super::{interface_error, Storefront};

    fn listing(id: &str, name: &str, price: i64, category: &str) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: name.to_string(),
            description: format!("{name} listing"),
            price: Decimal::new(price, 0),
            image: String::new(),
            categories: vec![CategoryId(category.to_string())],
        }
    }

    fn storefront() -> Storefront {
        let products = (1..=10)
            .map(|n| listing(&format!("p-{n}"), &format!("Home {n:02}"), n * 1_000, "houses"))
            .chain([listing("lot-1", "Hill Lot", 500, "land")])
            .collect();
        let categories = vec![
            Category { id: CategoryId("houses".to_string()), name: "Houses".to_string() },
            Category { id: CategoryId("land".to_string()), name: "Land".to_string() },
        ];
        Storefront::new(Catalog::new(products, categories), &AppConfig::default())
    }

    fn customer() -> CustomerProfile {
        CustomerProfile {
            id: CustomerId("u-1".to_string()),
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            phone: None,
        }
    }

    #[test]
    fn first_page_uses_configured_page_size() {
        let store = storefront();
        let page = store.current_page().expect("page");

        assert_eq!(page.items.len(), 8);
        assert_eq!(page.total_count, 11);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn changing_category_returns_to_first_page() {
        let mut store = storefront();
        store.go_to_page(2).expect("page 2");

        let page = store.select_category(Some(CategoryId("land".to_string()))).expect("land");
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Hill Lot");
    }

    #[test]
    fn search_sort_and_price_compose() {
        let mut store = storefront();
        store.search("home").expect("search");
        store
            .filter_price(PriceRange::between(Decimal::new(2_000, 0), Decimal::new(4_000, 0)))
            .expect("price");
        let page = store.sort_by(SortOption::PriceDesc).expect("sort");

        let names: Vec<_> = page.items.iter().map(|product| product.name.as_str()).collect();
        assert_eq!(names, vec!["Home 04", "Home 03", "Home 02"]);
    }

    #[test]
    fn anonymous_shopper_cannot_add() {
        let mut store = storefront();
        let error = store.add_to_cart(&ProductId("p-1".to_string())).expect_err("anonymous");

        assert_eq!(error, ApplicationError::Domain(DomainError::Unauthorized));
        assert!(store.cart().is_empty());
        assert_eq!(
            interface_error(error).user_message(),
            "Please log in to add products to the cart."
        );
    }

    #[test]
    fn unknown_product_is_not_found() {
        let mut store = storefront();
        store.sign_in(customer());

        let error = store.add_to_cart(&ProductId("missing".to_string())).expect_err("missing");
        assert!(matches!(error, ApplicationError::Domain(DomainError::NotFound(_))));
        assert!(matches!(interface_error(error), InterfaceError::BadRequest { .. }));
    }

    #[test]
    fn cart_flow_produces_taxed_summary() {
        let mut store = storefront();
        store.sign_in(customer());
        let home = ProductId("p-1".to_string());
        let lot = ProductId("lot-1".to_string());

        store.add_to_cart(&home).expect("add home");
        store.increase(&home).expect("increase home");
        store.add_to_cart(&lot).expect("add lot");

        let summary = store.summary().expect("summary");
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.totals.subtotal, Decimal::new(2_500, 0));
        assert_eq!(summary.totals.tax, Decimal::new(250, 0));
        assert_eq!(summary.totals.total, Decimal::new(2_750, 0));
        assert_eq!(summary.breakdown.len(), 2);
        assert_eq!(summary.currency, "USD");

        assert_eq!(store.decrease(&home), CartChange::Decremented { quantity: 1 });
        assert_eq!(store.remove(&lot), CartChange::Removed);
        assert_eq!(store.remove(&lot), CartChange::Unchanged);
    }

    #[test]
    fn increase_requires_an_existing_entry() {
        let mut store = storefront();
        store.sign_in(customer());

        let error = store.increase(&ProductId("p-2".to_string())).expect_err("not in cart");
        assert!(matches!(error, ApplicationError::Domain(DomainError::NotFound(_))));
    }

    #[test]
    fn sign_out_clears_the_cart() {
        let mut store = storefront();
        store.sign_in(customer());
        store.add_to_cart(&ProductId("p-3".to_string())).expect("add");

        let signed_out = store.sign_out();
        assert_eq!(signed_out.map(|profile| profile.id.0), Some("u-1".to_string()));
        assert!(store.cart().is_empty());
        assert!(!store.session().is_authenticated());
    }
}
