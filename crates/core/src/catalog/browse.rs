//! Listing criteria as driven by user events.
//!
//! The query engine never adjusts the page on its own. Changing what is being
//! looked at (category, search term, sort, price bounds) sends the shopper back
//! to page 1; paging itself is taken as given.

use crate::domain::product::CategoryId;

use super::query::{CategoryFilter, PriceRange, QueryCriteria, SortOption};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BrowseState {
    criteria: QueryCriteria,
}

impl BrowseState {
    pub fn new(page_size: u32) -> Self {
        Self { criteria: QueryCriteria::with_page_size(page_size) }
    }

    pub fn criteria(&self) -> &QueryCriteria {
        &self.criteria
    }

    pub fn page(&self) -> u32 {
        self.criteria.page
    }

    pub fn set_category(&mut self, category: Option<CategoryId>) {
        let next = CategoryFilter::from(category);
        if self.criteria.category != next {
            self.criteria.category = next;
            self.criteria.page = 1;
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if self.criteria.search_term != term {
            self.criteria.search_term = term;
            self.criteria.page = 1;
        }
    }

    pub fn set_sort(&mut self, sort: SortOption) {
        if self.criteria.sort != sort {
            self.criteria.sort = sort;
            self.criteria.page = 1;
        }
    }

    pub fn set_price_range(&mut self, range: PriceRange) {
        if self.criteria.price_range != range {
            self.criteria.price_range = range;
            self.criteria.page = 1;
        }
    }

    pub fn set_page(&mut self, page: u32) {
        self.criteria.page = page;
    }

    /// Pulls the page back inside `1..=total_pages` (page 1 when nothing matched).
    pub fn clamp_page(&mut self, total_pages: usize) {
        let last = u32::try_from(total_pages).unwrap_or(u32::MAX).max(1);
        self.criteria.page = self.criteria.page.clamp(1, last);
    }

    pub fn reset(&mut self) {
        self.criteria = QueryCriteria::with_page_size(self.criteria.page_size);
    }
}

pub fn page_numbers(total_pages: usize) -> impl Iterator<Item = u32> {
    1..=u32::try_from(total_pages).unwrap_or(u32::MAX)
}
