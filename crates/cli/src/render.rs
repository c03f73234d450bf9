//! Plain-text rendering of views, products and notifications.

use std::io::{self, Write};

use atelier_storefront::api::{AuthUser, Product};
use atelier_storefront::catalog::pipeline::CategoryBucket;
use atelier_storefront::catalog::{CatalogView, FilterCriteria, PageMarker};
use atelier_storefront::error::{AppError, Notification, Variant};

use crate::commands::CliError;

/// Shown in place of an image URL.
const NO_IMAGE: &str = "(no image)";

fn category_label(product: &Product) -> &str {
    product.category.as_ref().map_or("-", |c| c.label())
}

fn product_line(out: &mut impl Write, product: &Product) -> io::Result<()> {
    writeln!(
        out,
        "{:<26} {:<32} {:>14}  {}",
        product.id,
        product.name,
        product.price.display(),
        category_label(product)
    )
}

/// The product list area, with paging controls.
pub fn catalog_view(
    out: &mut impl Write,
    view: &CatalogView<'_>,
    criteria: &FilterCriteria,
) -> io::Result<()> {
    match view {
        CatalogView::Loading => writeln!(out, "Loading..."),
        CatalogView::LoadFailed => writeln!(out, "The product list could not be loaded."),
        CatalogView::Empty => writeln!(out, "No products yet."),
        CatalogView::NoMatches => {
            if criteria.search.is_empty() {
                writeln!(out, "No products in this category.")
            } else {
                writeln!(out, "No products match \"{}\".", criteria.search)
            }
        }
        CatalogView::Page(slice) => {
            for product in &slice.items {
                product_line(out, product)?;
            }
            writeln!(out)?;
            if let Some(summary) = slice.summary() {
                writeln!(out, "{summary}")?;
            }
            let markers = slice.markers();
            if !markers.is_empty() {
                let pages: Vec<String> = markers
                    .iter()
                    .map(|marker| match marker {
                        PageMarker::Page(n) if *n == slice.page => format!("[{n}]"),
                        other => other.to_string(),
                    })
                    .collect();
                writeln!(out, "Pages: {}", pages.join(" "))?;
            }
            Ok(())
        }
    }
}

/// One product in full, followed by related products.
pub fn product_detail(out: &mut impl Write, product: &Product, related: &[&Product]) -> io::Result<()> {
    writeln!(out, "{}", product.name)?;
    writeln!(out, "  ID:          {}", product.id)?;
    writeln!(out, "  Price:       {}", product.price.display())?;
    writeln!(out, "  Category:    {}", category_label(product))?;
    writeln!(out, "  Image:       {}", product.image.as_deref().unwrap_or(NO_IMAGE))?;
    writeln!(out, "  Description: {}", product.description)?;

    if !related.is_empty() {
        writeln!(out)?;
        writeln!(out, "You may also like:")?;
        for product in related {
            product_line(out, product)?;
        }
    }
    Ok(())
}

/// Featured categories, one block each.
pub fn carousels(out: &mut impl Write, buckets: &[CategoryBucket<'_>]) -> io::Result<()> {
    for bucket in buckets {
        writeln!(out, "{} ({})", bucket.category.label, bucket.category.id)?;
        if bucket.products.is_empty() {
            writeln!(out, "  No products yet.")?;
        }
        for product in &bucket.products {
            writeln!(out, "  {} - {}", product.name, product.price.display())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn notification(out: &mut impl Write, notification: &Notification) -> io::Result<()> {
    match notification.variant {
        Variant::Destructive => writeln!(out, "error: {notification}"),
        Variant::Default => writeln!(out, "{notification}"),
    }
}

pub fn user(out: &mut impl Write, user: Option<&AuthUser>) -> io::Result<()> {
    match user {
        Some(user) => writeln!(out, "Signed in as {} ({})", user.email, user.id),
        None => writeln!(out, "Not signed in."),
    }
}

/// A failed command: the notification, inline field errors, and a hint for
/// gated commands.
pub fn failure(out: &mut impl Write, error: &CliError) -> io::Result<()> {
    match error {
        CliError::Failed {
            notification: note,
            source,
        } => {
            if let Some(fields) = source.field_errors() {
                writeln!(out, "error: {}", note.title)?;
                for (field, message) in fields.iter() {
                    writeln!(out, "  {field}: {message}")?;
                }
            } else {
                notification(out, note)?;
            }
            if matches!(source, AppError::AuthRequired) {
                writeln!(out, "Run `atelier auth login` or `atelier auth register` first.")?;
            }
            Ok(())
        }
        CliError::Io(e) => writeln!(out, "error: {e}"),
    }
}
