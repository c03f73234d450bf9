//! Integration tests for catalog reconciliation.
//!
//! Every mutation is confirmed by the server before the local list changes;
//! a failed call must leave the list exactly as it was.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use atelier_core::{Price, ProductId};
use atelier_integration_tests::{TestContext, api_path, new_product_json, product_json};
use atelier_storefront::api::{ApiError, NewProduct, ProductPatch};
use atelier_storefront::catalog::{BrowseState, Catalog, CatalogView, ItemsPerPage, LoadStatus};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_catalog(ctx: &TestContext) {
    Mock::given(method("GET"))
        .and(path(api_path("/products")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_json("p1", "Áo Polo Trắng", 250_000),
            product_json("p2", "Áo Polo Đen", 260_000),
            product_json("p3", "Áo Polo Xám", 270_000),
        ])))
        .expect(1)
        .mount(&ctx.server)
        .await;
}

async fn loaded(ctx: &TestContext) -> Catalog {
    mount_catalog(ctx).await;
    let mut catalog = Catalog::new();
    catalog.load(ctx.state.api()).await.unwrap();
    catalog
}

fn ids(catalog: &Catalog) -> Vec<&str> {
    catalog.products().iter().map(|p| p.id.as_str()).collect()
}

#[tokio::test]
async fn test_load_is_fetched_once() {
    let ctx = TestContext::new().await;
    let mut catalog = loaded(&ctx).await;

    assert_eq!(catalog.status(), LoadStatus::Loaded);
    catalog.load(ctx.state.api()).await.unwrap();
    assert_eq!(ids(&catalog), vec!["p1", "p2", "p3"]);
}

#[tokio::test]
async fn test_create_prepends_server_copy() {
    let ctx = TestContext::signed_in("tok").await;
    let mut catalog = loaded(&ctx).await;

    let created = new_product_json("Áo Sơ Mi", 390_000);
    let created_id = created["_id"].as_str().unwrap().to_string();
    Mock::given(method("POST"))
        .and(path(api_path("/products")))
        .and(body_json(json!({
            "name": "Áo Sơ Mi",
            "description": "Linen",
            "price": 390_000,
            "category": "somi",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(created))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let product = catalog
        .create(
            ctx.state.api(),
            &NewProduct {
                name: "Áo Sơ Mi".into(),
                description: "Linen".into(),
                price: Price::new(390_000),
                image: None,
                category: Some("somi".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(product.id.as_str(), created_id);
    assert_eq!(ids(&catalog), vec![created_id.as_str(), "p1", "p2", "p3"]);
}

#[tokio::test]
async fn test_update_replaces_in_place() {
    let ctx = TestContext::signed_in("tok").await;
    let mut catalog = loaded(&ctx).await;

    Mock::given(method("PUT"))
        .and(path(api_path("/products/p2")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(product_json("p2", "Áo Polo Đen", 199_000)),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let patch = ProductPatch {
        price: Some(Price::new(199_000)),
        ..ProductPatch::default()
    };
    catalog
        .update(ctx.state.api(), &ProductId::new("p2"), &patch)
        .await
        .unwrap();

    assert_eq!(ids(&catalog), vec!["p1", "p2", "p3"]);
    assert_eq!(catalog.products()[1].price, Price::new(199_000));
    assert_eq!(catalog.products()[0].price, Price::new(250_000));
}

#[tokio::test]
async fn test_remove_drops_entry() {
    let ctx = TestContext::signed_in("tok").await;
    let mut catalog = loaded(&ctx).await;

    Mock::given(method("DELETE"))
        .and(path(api_path("/products/p1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Deleted" })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    catalog
        .remove(ctx.state.api(), &ProductId::new("p1"))
        .await
        .unwrap();
    assert_eq!(ids(&catalog), vec!["p2", "p3"]);
}

#[tokio::test]
async fn test_rejected_create_leaves_list_unchanged() {
    let ctx = TestContext::signed_in("tok").await;
    let mut catalog = loaded(&ctx).await;

    Mock::given(method("POST"))
        .and(path(api_path("/products")))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Price must be positive" })),
        )
        .mount(&ctx.server)
        .await;

    let err = catalog
        .create(
            ctx.state.api(),
            &NewProduct {
                name: "Áo".into(),
                description: String::new(),
                price: Price::new(1),
                image: None,
                category: None,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.remote_message(), Some("Price must be positive"));
    assert_eq!(ids(&catalog), vec!["p1", "p2", "p3"]);
}

#[tokio::test]
async fn test_update_failure_leaves_list() {
    let ctx = TestContext::signed_in("tok").await;
    let mut catalog = loaded(&ctx).await;
    let before = catalog.products().to_vec();

    Mock::given(method("PUT"))
        .and(path(api_path("/products/p2")))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream timeout"))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("PUT"))
        .and(path(api_path("/products/gone")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Product not found" })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let patch = ProductPatch {
        price: Some(Price::new(1)),
        ..ProductPatch::default()
    };
    let err = catalog
        .update(ctx.state.api(), &ProductId::new("p2"), &patch)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unknown { status: 500, .. }));
    assert_eq!(catalog.products(), before.as_slice());

    let err = catalog
        .update(ctx.state.api(), &ProductId::new("gone"), &patch)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(catalog.products(), before.as_slice());
}

#[tokio::test]
async fn test_delete_of_missing_product_leaves_list_unchanged() {
    let ctx = TestContext::signed_in("tok").await;
    let mut catalog = loaded(&ctx).await;

    Mock::given(method("DELETE"))
        .and(path(api_path("/products/p3")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Product not found" })))
        .mount(&ctx.server)
        .await;

    let err = catalog
        .remove(ctx.state.api(), &ProductId::new("p3"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(ids(&catalog), vec!["p1", "p2", "p3"]);
}

#[tokio::test]
async fn test_removed_product_closes_detail_and_reclamps() {
    let ctx = TestContext::signed_in("tok").await;
    let mut catalog = loaded(&ctx).await;

    let mut browse = BrowseState::new();
    browse.set_per_page(ItemsPerPage::try_from(4).unwrap());
    browse.open_detail(ProductId::new("p3"));

    Mock::given(method("DELETE"))
        .and(path(api_path("/products/p3")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&ctx.server)
        .await;

    let id = ProductId::new("p3");
    catalog.remove(ctx.state.api(), &id).await.unwrap();
    browse.on_removed(&id, &catalog);

    assert!(browse.detail().is_none());
    let CatalogView::Page(slice) = browse.view(&catalog) else {
        panic!("expected a page");
    };
    assert_eq!(slice.items.len(), 2);
}
