use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use parcel_client::wire::{products_from_dtos, CategoryDto, ProductDto};
use parcel_client::{
    interface_error, InMemoryProductSource, ProductSource, Storefront, StorefrontClient,
};
use parcel_core::catalog::browse::page_numbers;
use parcel_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use parcel_core::{ApplicationError, Category, CatalogPage, CategoryId, PriceRange, SortOption};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{block_on, CommandResult, EXIT_CONFIG, EXIT_INPUT, EXIT_SERVICE};

#[derive(Clone, Debug, Default)]
pub struct BrowseArgs {
    pub file: Option<PathBuf>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub json: bool,
}

/// Same shape the listing endpoints return, so a saved response can be browsed offline.
#[derive(Debug, Deserialize)]
struct CatalogSnapshot {
    products: Vec<ProductDto>,
    #[serde(default)]
    categories: Vec<CategoryDto>,
}

#[derive(Debug, Serialize)]
struct BrowseOutput {
    page: CatalogPage,
    pages: Vec<u32>,
    categories: Vec<Category>,
}

pub fn run(args: BrowseArgs) -> CommandResult {
    let overrides = ConfigOverrides { page_size: args.page_size, ..ConfigOverrides::default() };
    let config = match AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "browse",
                "config_validation",
                error.to_string(),
                EXIT_CONFIG,
            )
        }
    };

    let source: Box<dyn ProductSource> = match &args.file {
        Some(path) => match read_snapshot(path) {
            Ok(source) => Box::new(source),
            Err(error) => {
                return CommandResult::failure(
                    "browse",
                    "invalid_input",
                    format!("{error:#}"),
                    EXIT_INPUT,
                )
            }
        },
        None => match StorefrontClient::from_config(&config.product_service) {
            Ok(client) => Box::new(client),
            Err(error) => {
                return CommandResult::failure(
                    "browse",
                    "config_validation",
                    error.to_string(),
                    EXIT_CONFIG,
                )
            }
        },
    };

    let loaded = match block_on(Storefront::load(source.as_ref(), &config)) {
        Ok(loaded) => loaded,
        Err(message) => return CommandResult::failure("browse", "runtime", message, EXIT_SERVICE),
    };
    let mut store = match loaded {
        Ok(store) => store,
        Err(error) => return application_failure(error),
    };

    match apply_criteria(&mut store, &args) {
        Ok(page) => render(&store, page, args.json),
        Err(error) => application_failure(error),
    }
}

fn apply_criteria(
    store: &mut Storefront,
    args: &BrowseArgs,
) -> Result<CatalogPage, ApplicationError> {
    if let Some(term) = &args.search {
        store.search(term.as_str())?;
    }
    if let Some(category) = &args.category {
        let category_id = resolve_category(store, category);
        store.select_category(Some(category_id))?;
    }
    if args.min_price.is_some() || args.max_price.is_some() {
        let defaults = PriceRange::default();
        let range = PriceRange::between(
            args.min_price.unwrap_or(defaults.min),
            args.max_price.unwrap_or(defaults.max),
        );
        store.filter_price(range)?;
    }
    if let Some(sort) = &args.sort {
        store.sort_by(sort.parse::<SortOption>()?)?;
    }
    match args.page {
        Some(page) => store.go_to_page(page),
        None => store.current_page(),
    }
}

/// Accepts either a category id or its display name.
fn resolve_category(store: &Storefront, raw: &str) -> CategoryId {
    store
        .catalog()
        .categories()
        .iter()
        .find(|category| category.id.0 == raw || category.name.eq_ignore_ascii_case(raw))
        .map(|category| category.id.clone())
        .unwrap_or_else(|| CategoryId(raw.to_string()))
}

fn read_snapshot(path: &Path) -> anyhow::Result<InMemoryProductSource> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read `{}`", path.display()))?;
    let snapshot: CatalogSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("could not parse `{}`", path.display()))?;
    let products = products_from_dtos(snapshot.products)?;
    let categories = snapshot.categories.into_iter().map(Category::from).collect();
    Ok(InMemoryProductSource::new(products, categories))
}

fn render(store: &Storefront, page: CatalogPage, json_output: bool) -> CommandResult {
    let summary = format!(
        "page {} of {} ({} matching listings)",
        page.page, page.total_pages, page.total_count
    );

    if json_output {
        let output = BrowseOutput {
            pages: page_numbers(page.total_pages).collect(),
            categories: store.catalog().categories().to_vec(),
            page,
        };
        return CommandResult::success_with_data("browse", summary, output);
    }

    let mut lines = vec![summary];
    if page.is_empty() {
        lines.push("no listings on this page".to_string());
    }
    for product in &page.items {
        lines.push(format!("- {} | {} | {}", product.name, product.price, product.id.0));
    }
    if page.has_next() {
        lines.push(format!("next: --page {}", page.page + 1));
    }
    CommandResult::text(lines.join("\n"))
}

fn application_failure(error: ApplicationError) -> CommandResult {
    let (error_class, exit_code) = match &error {
        ApplicationError::Domain(_) => ("invalid_argument", EXIT_INPUT),
        ApplicationError::Integration(_) => ("service_unavailable", EXIT_SERVICE),
        ApplicationError::Configuration(_) => ("config_validation", EXIT_CONFIG),
    };
    let detail = error.to_string();
    let interface = interface_error(error);
    CommandResult::failure(
        "browse",
        error_class,
        format!(
            "{} ({detail}; correlation_id={})",
            interface.user_message(),
            interface.correlation_id()
        ),
        exit_code,
    )
}
