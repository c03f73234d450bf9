//! Filter and paginate pipeline.
//!
//! Every function here is pure: the same inputs always produce the same
//! output, and filtering only ever removes products, never reorders them.

use thiserror::Error;

use atelier_core::{Category, KnownCategory, ProductId};

use crate::api::Product;

/// Number of related products shown on a detail view.
pub const RELATED_LIMIT: usize = 4;

/// A page size outside the allowed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("items per page must be one of 4, 8, 12, 16 or 20, got {0}")]
pub struct InvalidPageSize(pub u32);

/// Page size, restricted to the sizes the pagination control offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemsPerPage(u32);

impl ItemsPerPage {
    /// Sizes the user can pick from.
    pub const ALLOWED: [u32; 5] = [4, 8, 12, 16, 20];

    pub const DEFAULT: Self = Self(8);

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Default for ItemsPerPage {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for ItemsPerPage {
    type Error = InvalidPageSize;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if Self::ALLOWED.contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidPageSize(value))
        }
    }
}

/// Search, category and paging inputs for one catalog view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against name and description.
    pub search: String,
    /// Category tag; empty or `"all"` means no restriction.
    pub category: String,
    /// 1-based page number.
    pub page: u32,
    pub per_page: ItemsPerPage,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: String::new(),
            page: 1,
            per_page: ItemsPerPage::DEFAULT,
        }
    }
}

/// One page of the filtered catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice<'a> {
    pub items: Vec<&'a Product>,
    /// Products that passed the filters, across all pages.
    pub filtered_count: usize,
    pub total_pages: u32,
    pub page: u32,
    pub per_page: ItemsPerPage,
}

/// Apply the category filter, then the search filter.
///
/// Products without a category never match a restricting category filter.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], search: &str, category: &str) -> Vec<&'a Product> {
    let category = (!Category::is_unrestricted(category)).then(|| category.trim());
    let needle = search.to_lowercase();

    products
        .iter()
        .filter(|p| category.is_none_or(|tag| p.in_category(tag)))
        .filter(|p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// `ceil(count / per_page)`.
#[must_use]
pub fn total_pages(count: usize, per_page: ItemsPerPage) -> u32 {
    u32::try_from(count.div_ceil(per_page.as_usize())).unwrap_or(u32::MAX)
}

/// The items on 1-based `page`.
///
/// Does not clamp: page 0 or a page past the end yields an empty slice.
#[must_use]
pub fn paginate<T>(items: &[T], page: u32, per_page: ItemsPerPage) -> &[T] {
    let Some(index) = page.checked_sub(1) else {
        return &[];
    };
    let size = per_page.as_usize();
    let start = (index as usize).saturating_mul(size);
    let end = start.saturating_add(size).min(items.len());
    items.get(start..end).unwrap_or_default()
}

/// Filter, count and slice in one pass.
#[must_use]
pub fn derive<'a>(products: &'a [Product], criteria: &FilterCriteria) -> PageSlice<'a> {
    let filtered = filter_products(products, &criteria.search, &criteria.category);
    let items = paginate(&filtered, criteria.page, criteria.per_page).to_vec();

    PageSlice {
        items,
        filtered_count: filtered.len(),
        total_pages: total_pages(filtered.len(), criteria.per_page),
        page: criteria.page,
        per_page: criteria.per_page,
    }
}

// =============================================================================
// Carousels and related products
// =============================================================================

/// The first few products of one featured category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBucket<'a> {
    pub category: &'static KnownCategory,
    pub products: Vec<&'a Product>,
}

/// First `limit` products of each category, in the order given.
///
/// Categories with no products still get an (empty) bucket.
#[must_use]
pub fn bucket_by_category<'a>(
    products: &'a [Product],
    categories: &'static [KnownCategory],
    limit: usize,
) -> Vec<CategoryBucket<'a>> {
    categories
        .iter()
        .map(|category| CategoryBucket {
            category,
            products: products
                .iter()
                .filter(|p| p.in_category(category.id))
                .take(limit)
                .collect(),
        })
        .collect()
}

/// Up to `limit` other products, in catalog order.
#[must_use]
pub fn related<'a>(products: &'a [Product], current: &ProductId, limit: usize) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| &p.id != current)
        .take(limit)
        .collect()
}
