//! Product browsing and management commands.

use std::io::Write;

use atelier_core::ProductId;
use atelier_storefront::api::{NewProduct, ProductApi, ProductPatch};
use atelier_storefront::catalog::pipeline::{self, RELATED_LIMIT};
use atelier_storefront::catalog::{BrowseState, Catalog, ItemsPerPage};
use atelier_storefront::error::{Operation, add_breadcrumb};
use atelier_storefront::forms::ProductForm;
use atelier_storefront::services::auth::Intent;
use atelier_storefront::state::AppState;
use clap::Args;
use tracing::warn;

use super::{CliError, OperationExt, require_session};
use crate::render;

/// Fields for a new product.
#[derive(Debug, Args)]
pub struct ProductFields {
    #[arg(long)]
    name: String,

    #[arg(long)]
    description: String,

    /// Whole amount in VND, thousands separators allowed
    #[arg(long)]
    price: String,

    /// Image URL
    #[arg(long, default_value = "")]
    image: String,

    /// Category tag
    #[arg(long, default_value = "")]
    category: String,
}

impl From<ProductFields> for ProductForm {
    fn from(fields: ProductFields) -> Self {
        Self {
            name: fields.name,
            description: fields.description,
            price: fields.price,
            image: fields.image,
            category: fields.category,
        }
    }
}

/// Replacement values for an existing product.
///
/// Omitted fields keep their current value. The edited product is validated
/// as a whole, so a stored product with a blank name or description needs
/// `--name`/`--description` as well.
#[derive(Debug, Args)]
pub struct ProductChanges {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    price: Option<String>,

    /// Image URL
    #[arg(long, conflicts_with = "clear_image")]
    image: Option<String>,

    /// Remove the current image
    #[arg(long)]
    clear_image: bool,

    /// Category tag
    #[arg(long, conflicts_with = "clear_category")]
    category: Option<String>,

    /// Make the product uncategorized
    #[arg(long)]
    clear_category: bool,
}

impl ProductChanges {
    fn apply(self, form: &mut ProductForm) {
        if self.clear_image {
            form.image.clear();
        }
        if self.clear_category {
            form.category.clear();
        }
        let fields = [
            (&mut form.name, self.name),
            (&mut form.description, self.description),
            (&mut form.price, self.price),
            (&mut form.image, self.image),
            (&mut form.category, self.category),
        ];
        for (slot, value) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

/// `atelier products list`
pub async fn list(
    state: &AppState,
    out: &mut impl Write,
    search: String,
    category: String,
    page: u32,
    per_page: ItemsPerPage,
) -> Result<(), CliError> {
    let mut catalog = Catalog::new();
    let loaded = catalog.load(state.api()).await;

    let mut browse = BrowseState::new();
    browse.set_search(search);
    browse.set_category(category);
    browse.set_per_page(per_page);
    browse.set_page(page, &catalog);

    render::catalog_view(out, &browse.view(&catalog), browse.criteria())?;
    loaded.during(Operation::LoadCatalog)
}

/// `atelier products show <ID>`
pub async fn show(state: &AppState, out: &mut impl Write, id: ProductId) -> Result<(), CliError> {
    require_session(
        &state.auth(),
        Intent::ViewProduct(id.clone()),
        Operation::LoadProduct,
    )?;

    let product = state.api().get(&id).await.during(Operation::LoadProduct)?;

    let mut catalog = Catalog::new();
    let related = match catalog.load(state.api()).await {
        Ok(()) => pipeline::related(catalog.products(), &product.id, RELATED_LIMIT),
        Err(e) => {
            warn!(error = %e, "Related products unavailable");
            Vec::new()
        }
    };

    render::product_detail(out, &product, &related)?;
    Ok(())
}

/// `atelier products add`
pub async fn add(state: &AppState, out: &mut impl Write, form: ProductForm) -> Result<(), CliError> {
    require_session(&state.auth(), Intent::AddProduct, Operation::CreateProduct)?;

    let valid = form.validate().during(Operation::CreateProduct)?;
    add_breadcrumb("product", "Creating product", Some(&[("name", valid.name.as_str())]));

    let mut catalog = Catalog::new();
    let created = catalog
        .create(state.api(), &NewProduct::from(valid))
        .await
        .during(Operation::CreateProduct)?;

    render::notification(out, &Operation::CreateProduct.success())?;
    render::product_detail(out, &created, &[])?;
    Ok(())
}

/// `atelier products edit <ID>`
pub async fn edit(
    state: &AppState,
    out: &mut impl Write,
    id: ProductId,
    changes: ProductChanges,
) -> Result<(), CliError> {
    require_session(
        &state.auth(),
        Intent::EditProduct(id.clone()),
        Operation::UpdateProduct,
    )?;

    let mut catalog = Catalog::new();
    catalog.load(state.api()).await.during(Operation::LoadCatalog)?;
    let current = match catalog.find(&id) {
        Some(product) => product.clone(),
        None => state.api().get(&id).await.during(Operation::LoadProduct)?,
    };

    let mut form = ProductForm::from_product(&current);
    changes.apply(&mut form);
    let valid = form.validate().during(Operation::UpdateProduct)?;

    add_breadcrumb("product", "Updating product", Some(&[("product_id", id.as_str())]));
    let updated = catalog
        .update(state.api(), &id, &ProductPatch::from(valid))
        .await
        .during(Operation::UpdateProduct)?;

    render::notification(out, &Operation::UpdateProduct.success())?;
    render::product_detail(out, &updated, &[])?;
    Ok(())
}

/// `atelier products delete <ID>`
pub async fn delete(state: &AppState, out: &mut impl Write, id: ProductId) -> Result<(), CliError> {
    require_session(
        &state.auth(),
        Intent::DeleteProduct(id.clone()),
        Operation::DeleteProduct,
    )?;

    add_breadcrumb("product", "Deleting product", Some(&[("product_id", id.as_str())]));
    let mut catalog = Catalog::new();
    catalog
        .remove(state.api(), &id)
        .await
        .during(Operation::DeleteProduct)?;

    render::notification(out, &Operation::DeleteProduct.success())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_only_touch_given_fields() {
        let mut form = ProductForm {
            name: "Áo Polo".into(),
            description: "Cotton".into(),
            price: "250000".into(),
            image: String::new(),
            category: "polo".into(),
        };
        ProductChanges {
            name: None,
            description: None,
            price: Some("199000".into()),
            image: None,
            clear_image: false,
            category: Some("thun".into()),
            clear_category: false,
        }
        .apply(&mut form);

        assert_eq!(form.name, "Áo Polo");
        assert_eq!(form.price, "199000");
        assert_eq!(form.category, "thun");
    }

    #[test]
    fn test_clear_flags_empty_image_and_category() {
        let mut form = ProductForm {
            name: "Áo Polo".into(),
            description: "Cotton".into(),
            price: "250000".into(),
            image: "https://img.example/polo.jpg".into(),
            category: "polo".into(),
        };
        ProductChanges {
            name: None,
            description: None,
            price: None,
            image: None,
            clear_image: true,
            category: None,
            clear_category: true,
        }
        .apply(&mut form);

        let patch = ProductPatch::from(form.validate().unwrap());
        assert_eq!(patch.image.as_deref(), Some(""));
        assert_eq!(patch.category.as_ref().map(|c| c.as_str()), Some(""));
    }
}
