use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::domain::product::{CategoryId, Product};
use crate::errors::DomainError;

pub const DEFAULT_PAGE_SIZE: u32 = 8;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "category_id")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(CategoryId),
}

impl CategoryFilter {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Only(category_id) => product.in_category(category_id),
        }
    }
}

impl From<Option<CategoryId>> for CategoryFilter {
    fn from(value: Option<CategoryId>) -> Self {
        value.map_or(Self::All, Self::Only)
    }
}

/// Inclusive price bounds. The default range admits every non-negative price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self { min: Decimal::ZERO, max: Decimal::MAX }
    }
}

impl PriceRange {
    pub fn between(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && price <= self.max
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }

    /// Ordering used by this option; `Default` treats every pair as equal.
    pub fn compare(self, left: &Product, right: &Product) -> Ordering {
        match self {
            Self::Default => Ordering::Equal,
            Self::PriceAsc => left.price.cmp(&right.price),
            Self::PriceDesc => right.price.cmp(&left.price),
            Self::NameAsc => collate(&left.name, &right.name),
            Self::NameDesc => collate(&right.name, &left.name),
        }
    }
}

impl FromStr for SortOption {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" | "" => Ok(Self::Default),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "name-asc" => Ok(Self::NameAsc),
            "name-desc" => Ok(Self::NameDesc),
            other => Err(DomainError::InvalidArgument(format!(
                "unsupported sort option `{other}` (expected default|price-asc|price-desc|name-asc|name-desc)"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCriteria {
    pub search_term: String,
    pub category: CategoryFilter,
    pub price_range: PriceRange,
    pub sort: SortOption,
    pub page: u32,
    pub page_size: u32,
}

impl Default for QueryCriteria {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            category: CategoryFilter::All,
            price_range: PriceRange::default(),
            sort: SortOption::Default,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryCriteria {
    pub fn with_page_size(page_size: u32) -> Self {
        Self { page_size, ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.page_size == 0 {
            return Err(DomainError::InvalidArgument(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if self.page == 0 {
            return Err(DomainError::InvalidArgument("page is 1-based; got 0".to_string()));
        }
        if self.price_range.min > self.price_range.max {
            return Err(DomainError::InvalidArgument(format!(
                "price range minimum {} exceeds maximum {}",
                self.price_range.min, self.price_range.max
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub items: Vec<Product>,
    pub total_count: usize,
    pub total_pages: usize,
    pub page: u32,
    pub page_size: u32,
}

impl CatalogPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        (self.page as usize) < self.total_pages
    }
}

/// Filters, sorts and slices `products` for one render of the listing.
///
/// Stages run in order: category, search term, price range, sort, page.
/// Every stage is stable, so `SortOption::Default` keeps input order. A page
/// past the end yields no items; clamping is the caller's job.
pub fn query(products: &[Product], criteria: &QueryCriteria) -> Result<CatalogPage, DomainError> {
    criteria.validate()?;

    let needle = criteria.search_term.to_lowercase();
    let mut matched: Vec<&Product> = products
        .iter()
        .filter(|product| criteria.category.matches(product))
        .filter(|product| needle.is_empty() || matches_search(product, &needle))
        .filter(|product| criteria.price_range.contains(product.price))
        .collect();

    if criteria.sort != SortOption::Default {
        matched.sort_by(|left, right| criteria.sort.compare(left, right));
    }

    let page_size = criteria.page_size as usize;
    let total_count = matched.len();
    let total_pages = total_count.div_ceil(page_size);
    let start = (criteria.page as usize - 1).saturating_mul(page_size);
    let items = matched.into_iter().skip(start).take(page_size).cloned().collect();

    Ok(CatalogPage {
        items,
        total_count,
        total_pages,
        page: criteria.page,
        page_size: criteria.page_size,
    })
}

fn matches_search(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
}

/// Locale-style name ordering. Base letters compare first, ignoring accents
/// and case; then an unaccented name precedes its accented twin; then
/// lowercase precedes uppercase.
pub fn collate(left: &str, right: &str) -> Ordering {
    base_letters(left)
        .cmp(&base_letters(right))
        .then_with(|| folded(left).cmp(&folded(right)))
        .then_with(|| right.nfd().cmp(left.nfd()))
}

fn base_letters(name: &str) -> String {
    name.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect()
}

fn folded(name: &str) -> String {
    name.nfd().flat_map(char::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use rust_decimal::Decimal;

    use crate::domain::product::{CategoryId, Product, ProductId};
    use crate::errors::DomainError;

    use super::{collate, query, CategoryFilter, PriceRange, QueryCriteria, SortOption};

    fn product(id: &str, name: &str, price: i64, categories: &[&str]) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: name.to_string(),
            description: format!("{name} listing"),
            price: Decimal::new(price, 0),
            image: format!("https://img.example/{id}.jpg"),
            categories: categories.iter().map(|c| CategoryId((*c).to_string())).collect(),
        }
    }

    fn listing() -> Vec<Product> {
        vec![
            product("1", "Villa", 500_000, &["houses"]),
            product("2", "Cabin", 120_000, &["houses", "rural"]),
            product("3", "Loft", 310_000, &["apartments"]),
            product("4", "Farmland", 90_000, &["rural"]),
        ]
    }

    fn names(page: &super::CatalogPage) -> Vec<&str> {
        page.items.iter().map(|product| product.name.as_str()).collect()
    }

    #[test]
    fn price_ascending_scenario() {
        let products = vec![
            product("1", "Villa", 500_000, &[]),
            product("2", "Cabin", 120_000, &[]),
        ];
        let criteria = QueryCriteria {
            sort: SortOption::PriceAsc,
            ..QueryCriteria::with_page_size(10)
        };

        let page = query(&products, &criteria).expect("query");

        assert_eq!(names(&page), vec!["Cabin", "Villa"]);
        assert_eq!(page.total_count, 2);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn category_filter_keeps_input_order() {
        let criteria = QueryCriteria {
            category: CategoryFilter::Only(CategoryId("rural".to_string())),
            ..QueryCriteria::default()
        };

        let page = query(&listing(), &criteria).expect("query");

        assert_eq!(names(&page), vec!["Cabin", "Farmland"]);
    }

    #[test]
    fn search_matches_name_or_description_case_insensitively() {
        let mut products = listing();
        products[2].description = "Converted WAREHOUSE loft".to_string();
        let criteria =
            QueryCriteria { search_term: "warehouse".to_string(), ..QueryCriteria::default() };

        let page = query(&products, &criteria).expect("query");
        assert_eq!(names(&page), vec!["Loft"]);

        let criteria = QueryCriteria { search_term: "VIL".to_string(), ..QueryCriteria::default() };
        let page = query(&products, &criteria).expect("query");
        assert_eq!(names(&page), vec!["Villa"]);
    }

    #[test]
    fn price_range_is_inclusive_on_both_bounds() {
        let criteria = QueryCriteria {
            price_range: PriceRange::between(Decimal::new(90_000, 0), Decimal::new(310_000, 0)),
            ..QueryCriteria::default()
        };

        let page = query(&listing(), &criteria).expect("query");

        assert_eq!(names(&page), vec!["Cabin", "Loft", "Farmland"]);
    }

    #[test]
    fn filters_compose_before_sorting() {
        let criteria = QueryCriteria {
            category: CategoryFilter::Only(CategoryId("houses".to_string())),
            search_term: "listing".to_string(),
            sort: SortOption::NameAsc,
            ..QueryCriteria::default()
        };

        let page = query(&listing(), &criteria).expect("query");

        assert_eq!(names(&page), vec!["Cabin", "Villa"]);
    }

    #[test]
    fn name_descending_orders_reverse_alphabetically() {
        let criteria = QueryCriteria { sort: SortOption::NameDesc, ..QueryCriteria::default() };

        let page = query(&listing(), &criteria).expect("query");

        assert_eq!(names(&page), vec!["Villa", "Loft", "Farmland", "Cabin"]);
    }

    #[test]
    fn pages_slice_the_sorted_result() {
        let criteria = QueryCriteria {
            sort: SortOption::PriceDesc,
            page: 2,
            ..QueryCriteria::with_page_size(3)
        };

        let page = query(&listing(), &criteria).expect("query");

        assert_eq!(names(&page), vec!["Farmland"]);
        assert_eq!(page.total_count, 4);
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next());
    }

    #[test]
    fn page_past_the_end_is_empty_and_not_clamped() {
        let criteria = QueryCriteria { page: 9, ..QueryCriteria::default() };

        let page = query(&listing(), &criteria).expect("query");

        assert!(page.is_empty());
        assert_eq!(page.page, 9);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn empty_catalog_has_zero_pages() {
        let page = query(&[], &QueryCriteria::default()).expect("query");

        assert!(page.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let error = query(&listing(), &QueryCriteria::with_page_size(0)).expect_err("page size");
        assert!(matches!(error, DomainError::InvalidArgument(ref message)
            if message.contains("page_size")));
    }

    #[test]
    fn zero_page_is_rejected() {
        let criteria = QueryCriteria { page: 0, ..QueryCriteria::default() };
        assert!(matches!(query(&listing(), &criteria), Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let criteria = QueryCriteria {
            price_range: PriceRange::between(Decimal::new(10, 0), Decimal::new(5, 0)),
            ..QueryCriteria::default()
        };
        assert!(matches!(query(&listing(), &criteria), Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn sort_option_parses_kebab_case_names() {
        assert_eq!("price-asc".parse::<SortOption>(), Ok(SortOption::PriceAsc));
        assert_eq!(" Name-Desc ".parse::<SortOption>(), Ok(SortOption::NameDesc));
        assert!("cheapest".parse::<SortOption>().is_err());
        assert_eq!(SortOption::PriceDesc.as_str(), "price-desc");
    }

    #[test]
    fn collation_ignores_case_and_puts_lowercase_first_on_ties() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("Zebra", "apple"), Ordering::Greater);
        assert_eq!(collate("villa", "Villa"), Ordering::Less);
        assert_eq!(collate("Villa", "Villa"), Ordering::Equal);
    }

    #[test]
    fn accented_names_sort_beside_their_base_letter() {
        assert_eq!(collate("Émile Villa", "Zephyr Loft"), Ordering::Less);
        assert_eq!(collate("Émile Villa", "Dune House"), Ordering::Greater);
        assert_eq!(collate("Cafe Row", "Café Row"), Ordering::Less);
        assert_eq!(collate("Öland Cottage", "oak Barn"), Ordering::Greater);
        // Precomposed and decomposed spellings of the same name are equal.
        assert_eq!(collate("Caf\u{e9}", "Cafe\u{301}"), Ordering::Equal);
    }

    #[test]
    fn name_sort_places_accented_listing_by_base_letter() {
        let products = vec![
            product("1", "Zephyr Loft", 200_000, &[]),
            product("2", "Émile Villa", 450_000, &[]),
            product("3", "apartment Row", 150_000, &[]),
        ];
        let criteria = QueryCriteria { sort: SortOption::NameAsc, ..QueryCriteria::default() };

        let page = query(&products, &criteria).expect("query");
        assert_eq!(names(&page), vec!["apartment Row", "Émile Villa", "Zephyr Loft"]);

        let criteria = QueryCriteria { sort: SortOption::NameDesc, ..QueryCriteria::default() };
        let page = query(&products, &criteria).expect("query");
        assert_eq!(names(&page), vec!["Zephyr Loft", "Émile Villa", "apartment Row"]);
    }
}
