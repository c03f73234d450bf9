//! Catalog state and CRUD reconciliation.
//!
//! The catalog only ever reflects server-confirmed state. Each mutation is
//! sent first and the list is reconciled from the response; a failed request
//! leaves the list exactly as it was.

pub mod browse;
pub mod pagination;
pub mod pipeline;

pub use browse::{BrowseState, CatalogView};
pub use pagination::{PageMarker, RangeSummary, visible_pages};
pub use pipeline::{FilterCriteria, InvalidPageSize, ItemsPerPage, PageSlice};

use tracing::{debug, instrument, warn};

use atelier_core::ProductId;

use crate::api::{ApiError, NewProduct, Product, ProductApi, ProductPatch};

/// Whether the initial list has arrived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Pending,
    Loaded,
    Failed,
}

/// Ordered product list mirrored from the remote store.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    status: LoadStatus,
}

impl Catalog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            products: Vec::new(),
            status: LoadStatus::Pending,
        }
    }

    /// Products in display order; newest creations first.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn status(&self) -> LoadStatus {
        self.status
    }

    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Fetch the catalog unless it is already loaded.
    ///
    /// # Errors
    ///
    /// Returns the API error; the catalog is then marked failed.
    pub async fn load<A: ProductApi + ?Sized>(&mut self, api: &A) -> Result<(), ApiError> {
        if self.status == LoadStatus::Loaded {
            return Ok(());
        }
        self.refresh(api).await
    }

    /// Replace the list with a fresh snapshot.
    ///
    /// # Errors
    ///
    /// Returns the API error. Products already held are kept.
    #[instrument(skip_all)]
    pub async fn refresh<A: ProductApi + ?Sized>(&mut self, api: &A) -> Result<(), ApiError> {
        match api.list().await {
            Ok(products) => {
                debug!(count = products.len(), "Catalog loaded");
                self.products = products;
                self.status = LoadStatus::Loaded;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Catalog load failed");
                self.status = LoadStatus::Failed;
                Err(e)
            }
        }
    }

    /// Create a product remotely, then put it at the head of the list.
    ///
    /// # Errors
    ///
    /// Returns the API error and leaves the list unchanged.
    #[instrument(skip_all)]
    pub async fn create<A: ProductApi + ?Sized>(
        &mut self,
        api: &A,
        product: &NewProduct,
    ) -> Result<Product, ApiError> {
        let created = api.create(product).await?;
        self.apply_created(created.clone());
        Ok(created)
    }

    /// Update a product remotely, then splice the response into place.
    ///
    /// # Errors
    ///
    /// Returns the API error and leaves the list unchanged.
    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn update<A: ProductApi + ?Sized>(
        &mut self,
        api: &A,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError> {
        let updated = api.update(id, patch).await?;
        self.apply_updated(id, updated.clone());
        Ok(updated)
    }

    /// Delete a product remotely, then drop it from the list.
    ///
    /// # Errors
    ///
    /// Returns the API error (including not-found) and leaves the list unchanged.
    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn remove<A: ProductApi + ?Sized>(
        &mut self,
        api: &A,
        id: &ProductId,
    ) -> Result<(), ApiError> {
        api.remove(id).await?;
        self.apply_removed(id);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reconciliation
    // -------------------------------------------------------------------------

    /// Prepend a server-confirmed product. Any stale copy with the same id is
    /// dropped so the id appears once.
    pub fn apply_created(&mut self, product: Product) {
        self.products.retain(|p| p.id != product.id);
        debug!(product_id = %product.id, "Reconciled create");
        self.products.insert(0, product);
    }

    /// Replace the entry for `id` with the server's version. Other entries
    /// and the order are untouched; an unknown id is ignored.
    pub fn apply_updated(&mut self, id: &ProductId, product: Product) {
        if let Some(slot) = self.products.iter_mut().find(|p| &p.id == id) {
            *slot = product;
            debug!(product_id = %id, "Reconciled update");
        }
    }

    /// Drop the entry for `id`.
    pub fn apply_removed(&mut self, id: &ProductId) {
        self.products.retain(|p| &p.id != id);
        debug!(product_id = %id, "Reconciled delete");
    }
}
