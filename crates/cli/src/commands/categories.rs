//! Featured category carousels.

use std::io::Write;

use atelier_core::KNOWN_CATEGORIES;
use atelier_storefront::catalog::Catalog;
use atelier_storefront::catalog::pipeline::bucket_by_category;
use atelier_storefront::error::Operation;
use atelier_storefront::state::AppState;

use super::{CliError, OperationExt};
use crate::render;

/// `atelier categories`
pub async fn carousels(
    state: &AppState,
    out: &mut impl Write,
    per_category: usize,
) -> Result<(), CliError> {
    let mut catalog = Catalog::new();
    catalog.load(state.api()).await.during(Operation::LoadCatalog)?;

    let buckets = bucket_by_category(catalog.products(), KNOWN_CATEGORIES, per_category);
    render::carousels(out, &buckets)?;
    Ok(())
}
