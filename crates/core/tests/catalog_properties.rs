//! Property tests for the listing query and cart arithmetic.

use parcel_core::catalog::query::query;
use parcel_core::{
    CartLedger, CategoryFilter, CategoryId, PriceRange, Product, ProductId, QueryCriteria,
    SortOption,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn product_strategy() -> impl Strategy<Value = Product> {
    (
        "[a-z0-9]{1,6}",
        "[A-Za-z][A-Za-z ]{0,9}",
        "[a-z ]{0,12}",
        0_i64..2_000_000,
        prop::sample::subsequence(vec!["houses", "land", "rural"], 0..=3),
    )
        .prop_map(|(id, name, description, cents, categories)| Product {
            id: ProductId(id),
            name,
            description,
            price: Decimal::new(cents, 2),
            image: String::new(),
            categories: categories.into_iter().map(|c| CategoryId(c.to_string())).collect(),
        })
}

fn catalog_strategy() -> impl Strategy<Value = Vec<Product>> {
    prop::collection::vec(product_strategy(), 0..24)
}

fn sort_strategy() -> impl Strategy<Value = SortOption> {
    prop_oneof![
        Just(SortOption::Default),
        Just(SortOption::PriceAsc),
        Just(SortOption::PriceDesc),
        Just(SortOption::NameAsc),
        Just(SortOption::NameDesc),
    ]
}

fn unique_by_id(products: Vec<Product>) -> Vec<Product> {
    let mut seen = std::collections::HashSet::new();
    products.into_iter().filter(|product| seen.insert(product.id.clone())).collect()
}

proptest! {
    #[test]
    fn default_criteria_with_large_page_returns_everything(products in catalog_strategy()) {
        let page_size = u32::try_from(products.len().max(1)).unwrap_or(u32::MAX);
        let page = query(&products, &QueryCriteria::with_page_size(page_size)).unwrap();

        prop_assert_eq!(&page.items, &products);
        prop_assert_eq!(page.total_count, products.len());
        prop_assert_eq!(page.total_pages, usize::from(!products.is_empty()));
    }

    #[test]
    fn sorting_the_result_again_changes_nothing(
        products in catalog_strategy(),
        sort in sort_strategy(),
    ) {
        let criteria = QueryCriteria { sort, ..QueryCriteria::with_page_size(100) };
        let page = query(&products, &criteria).unwrap();

        let mut resorted = page.items.clone();
        resorted.sort_by(|left, right| sort.compare(left, right));
        prop_assert_eq!(resorted, page.items);
    }

    #[test]
    fn every_item_lies_inside_the_price_range(
        products in catalog_strategy(),
        low in 0_i64..2_000_000,
        span in 0_i64..1_000_000,
    ) {
        let range = PriceRange::between(Decimal::new(low, 2), Decimal::new(low + span, 2));
        let criteria = QueryCriteria { price_range: range, ..QueryCriteria::with_page_size(100) };
        let page = query(&products, &criteria).unwrap();

        for item in &page.items {
            prop_assert!(range.min <= item.price && item.price <= range.max);
        }
        let expected = products.iter().filter(|product| range.contains(product.price)).count();
        prop_assert_eq!(page.total_count, expected);
    }

    #[test]
    fn pages_partition_the_filtered_result(
        products in catalog_strategy(),
        page_size in 1_u32..6,
        sort in sort_strategy(),
    ) {
        let everything = query(
            &products,
            &QueryCriteria { sort, ..QueryCriteria::with_page_size(100) },
        )
        .unwrap();

        let mut stitched = Vec::new();
        let mut page_number = 1;
        loop {
            let criteria = QueryCriteria { sort, page: page_number, ..QueryCriteria::with_page_size(page_size) };
            let page = query(&products, &criteria).unwrap();
            if page.is_empty() {
                prop_assert_eq!(page_number as usize, page.total_pages + 1);
                break;
            }
            stitched.extend(page.items);
            page_number += 1;
        }
        prop_assert_eq!(stitched, everything.items);
    }

    #[test]
    fn category_filter_only_keeps_members(products in catalog_strategy()) {
        let land = CategoryId("land".to_string());
        let criteria = QueryCriteria {
            category: CategoryFilter::Only(land.clone()),
            ..QueryCriteria::with_page_size(100)
        };
        let page = query(&products, &criteria).unwrap();

        prop_assert!(page.items.iter().all(|product| product.in_category(&land)));
    }

    #[test]
    fn subtotal_grows_by_price_times_quantity(
        products in catalog_strategy(),
        extra in product_strategy(),
        quantity in 1_u32..5,
    ) {
        let mut ledger = CartLedger::new();
        for product in unique_by_id(products).iter().filter(|p| p.id != extra.id) {
            ledger.add_or_increment(product, true).unwrap();
        }
        let before = ledger.subtotal().unwrap();

        for _ in 0..quantity {
            ledger.add_or_increment(&extra, true).unwrap();
        }

        prop_assert_eq!(ledger.subtotal().unwrap() - before, extra.price * Decimal::from(quantity));
    }

    #[test]
    fn anonymous_adds_never_mutate(products in catalog_strategy()) {
        let mut ledger = CartLedger::new();
        for product in &products {
            prop_assert!(ledger.add_or_increment(product, false).is_err());
        }
        prop_assert!(ledger.is_empty());
    }

    #[test]
    fn decrement_at_quantity_one_removes_the_entry(product in product_strategy()) {
        let mut ledger = CartLedger::new();
        ledger.add_or_increment(&product, true).unwrap();
        ledger.decrement(&product.id);

        prop_assert!(ledger.entry(&product.id).is_none());
    }
}
