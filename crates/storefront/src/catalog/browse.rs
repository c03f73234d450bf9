//! Browsing state owned by the view layer.
//!
//! Holds the filter criteria and the open detail view, and turns a
//! [`Catalog`] into what the list area should show.

use atelier_core::ProductId;

use super::pagination::{PageMarker, RangeSummary, visible_pages};
use super::pipeline::{self, FilterCriteria, ItemsPerPage, PageSlice};
use super::{Catalog, LoadStatus};

/// What the product list area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogView<'a> {
    /// The first load has not finished.
    Loading,
    /// The load failed and there is nothing to show.
    LoadFailed,
    /// The store has no products at all.
    Empty,
    /// Products exist but none pass the filters.
    NoMatches,
    Page(PageSlice<'a>),
}

impl PageSlice<'_> {
    /// "showing x-y of n" for this page.
    #[must_use]
    pub fn summary(&self) -> Option<RangeSummary> {
        RangeSummary::new(self.page, self.per_page.get(), self.filtered_count)
    }

    /// Pagination control slots; empty when there is a single page.
    #[must_use]
    pub fn markers(&self) -> Vec<PageMarker> {
        visible_pages(self.page, self.total_pages)
    }
}

/// Filter criteria plus the product open in the detail view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseState {
    criteria: FilterCriteria,
    detail: Option<ProductId>,
}

impl BrowseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Change the search term and go back to the first page.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.criteria.search = search.into();
        self.criteria.page = 1;
    }

    /// Change the category filter and go back to the first page.
    pub fn set_category(&mut self, category: impl Into<String>) {
        self.criteria.category = category.into();
        self.criteria.page = 1;
    }

    /// Change the page size and go back to the first page.
    pub fn set_per_page(&mut self, per_page: ItemsPerPage) {
        self.criteria.per_page = per_page;
        self.criteria.page = 1;
    }

    /// Jump to `page`, clamped into the pages the catalog currently has.
    pub fn set_page(&mut self, page: u32, catalog: &Catalog) {
        self.criteria.page = clamp_page(page, self.total_pages(catalog));
    }

    #[must_use]
    pub fn total_pages(&self, catalog: &Catalog) -> u32 {
        let filtered =
            pipeline::filter_products(catalog.products(), &self.criteria.search, &self.criteria.category);
        pipeline::total_pages(filtered.len(), self.criteria.per_page)
    }

    /// Product open in the detail view.
    #[must_use]
    pub const fn detail(&self) -> Option<&ProductId> {
        self.detail.as_ref()
    }

    pub fn open_detail(&mut self, id: ProductId) {
        self.detail = Some(id);
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    /// Follow a confirmed delete: close its detail view and keep the page in range.
    pub fn on_removed(&mut self, id: &ProductId, catalog: &Catalog) {
        if self.detail.as_ref() == Some(id) {
            self.detail = None;
        }
        self.criteria.page = clamp_page(self.criteria.page, self.total_pages(catalog));
    }

    /// Current list view of `catalog`.
    ///
    /// A page left out of range by catalog changes is clamped here too.
    #[must_use]
    pub fn view<'a>(&self, catalog: &'a Catalog) -> CatalogView<'a> {
        match catalog.status() {
            LoadStatus::Pending => return CatalogView::Loading,
            LoadStatus::Failed if catalog.is_empty() => return CatalogView::LoadFailed,
            LoadStatus::Failed | LoadStatus::Loaded => {}
        }
        if catalog.is_empty() {
            return CatalogView::Empty;
        }

        let filtered =
            pipeline::filter_products(catalog.products(), &self.criteria.search, &self.criteria.category);
        if filtered.is_empty() {
            return CatalogView::NoMatches;
        }

        let per_page = self.criteria.per_page;
        let total_pages = pipeline::total_pages(filtered.len(), per_page);
        let page = clamp_page(self.criteria.page, total_pages);

        CatalogView::Page(PageSlice {
            items: pipeline::paginate(&filtered, page, per_page).to_vec(),
            filtered_count: filtered.len(),
            total_pages,
            page,
            per_page,
        })
    }
}

fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.clamp(1, total_pages.max(1))
}
