//! Types exchanged with the REST API.
//!
//! Inbound payloads are decoded into domain types at this edge so nothing
//! further in uses untyped JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atelier_core::{Category, Email, Price, ProductId, UserId};

// =============================================================================
// Products
// =============================================================================

/// A product as last confirmed by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireProduct")]
pub struct Product {
    /// Server-assigned identifier.
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Image URL; `None` renders a placeholder.
    pub image: Option<String>,
    /// Category tag; `None` means uncategorized.
    pub category: Option<Category>,
}

impl Product {
    /// Whether the product carries the given category tag.
    #[must_use]
    pub fn in_category(&self, tag: &str) -> bool {
        self.category.as_ref().is_some_and(|c| c.matches(tag))
    }
}

/// Fields for a product that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Partial update; unset fields are left unchanged server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl ProductPatch {
    /// Whether the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image.is_none()
            && self.category.is_none()
    }
}

/// Errors decoding a product payload.
#[derive(Debug, Error)]
pub enum ProductDecodeError {
    #[error("product payload has neither `_id` nor `id`")]
    MissingId,
}

/// Product as the remote store serializes it.
///
/// Document stores answer with `_id`; other backends answer with `id`,
/// sometimes numeric.
#[derive(Deserialize)]
struct WireProduct {
    #[serde(rename = "_id")]
    document_id: Option<String>,
    id: Option<WireId>,
    name: String,
    #[serde(default)]
    description: String,
    price: Price,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

impl TryFrom<WireProduct> for Product {
    type Error = ProductDecodeError;

    fn try_from(wire: WireProduct) -> Result<Self, Self::Error> {
        let id = wire
            .document_id
            .or_else(|| wire.id.map(WireId::into_string))
            .ok_or(ProductDecodeError::MissingId)?;

        Ok(Self {
            id: ProductId::new(id),
            name: wire.name,
            description: wire.description,
            price: wire.price,
            image: non_blank(wire.image),
            category: non_blank(wire.category).map(Category::new),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Authentication
// =============================================================================

/// The identity behind a session.
///
/// Serialized with `_id`; decoding accepts `_id`, `id` or both, preferring `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireUser")]
pub struct AuthUser {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub email: Email,
}

/// Errors decoding a user record.
#[derive(Debug, Error)]
pub enum UserDecodeError {
    #[error("user record has neither `_id` nor `id`")]
    MissingId,
}

#[derive(Deserialize)]
struct WireUser {
    #[serde(rename = "_id")]
    document_id: Option<WireId>,
    id: Option<WireId>,
    email: Email,
}

impl TryFrom<WireUser> for AuthUser {
    type Error = UserDecodeError;

    fn try_from(wire: WireUser) -> Result<Self, Self::Error> {
        let id = wire
            .document_id
            .or(wire.id)
            .map(WireId::into_string)
            .ok_or(UserDecodeError::MissingId)?;

        Ok(Self {
            id: UserId::new(id),
            email: wire.email,
        })
    }
}

/// Body returned by every authentication endpoint.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

#[derive(Serialize)]
pub(crate) struct CredentialsBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct FederatedBody<'a> {
    pub credential: &'a str,
}

/// Error payload shape returned by the API on failure.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RemoteErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RemoteErrorBody {
    /// Best human-readable message in the body, if any.
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_prefers_document_id() {
        let product: Product = serde_json::from_value(json!({
            "_id": "66a1",
            "id": 7,
            "name": "Áo Polo Trắng",
            "description": "Cotton",
            "price": 250000,
            "category": "polo"
        }))
        .unwrap();
        assert_eq!(product.id.as_str(), "66a1");
        assert_eq!(product.category, Some(Category::new("polo")));
        assert_eq!(product.image, None);
    }

    #[test]
    fn test_product_numeric_id() {
        let product: Product = serde_json::from_value(json!({
            "id": 42,
            "name": "Quần Jean Xanh",
            "description": "Denim",
            "price": 450000
        }))
        .unwrap();
        assert_eq!(product.id.as_str(), "42");
    }

    #[test]
    fn test_product_without_id_is_rejected() {
        let result: Result<Product, _> = serde_json::from_value(json!({
            "name": "Nameless",
            "description": "",
            "price": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_image_and_category_are_absent() {
        let product: Product = serde_json::from_value(json!({
            "_id": "1",
            "name": "A",
            "description": "B",
            "price": 1,
            "image": "  ",
            "category": ""
        }))
        .unwrap();
        assert_eq!(product.image, None);
        assert_eq!(product.category, None);
    }

    #[test]
    fn test_patch_omits_unset_fields() {
        let patch = ProductPatch {
            price: Some(Price::new(150)),
            ..ProductPatch::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "price": 150 }));
        assert!(!patch.is_empty());
        assert!(ProductPatch::default().is_empty());
    }

    #[test]
    fn test_auth_user_accepts_either_id_key() {
        let a: AuthUser =
            serde_json::from_value(json!({ "_id": "u1", "email": "a@b.vn" })).unwrap();
        let b: AuthUser =
            serde_json::from_value(json!({ "id": "u1", "email": "a@b.vn" })).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_auth_user_with_both_id_keys_prefers_document_id() {
        let response: AuthResponse = serde_json::from_value(json!({
            "token": "t",
            "user": { "_id": "u1", "id": "legacy-7", "email": "a@b.vn" }
        }))
        .unwrap();
        assert_eq!(response.user.id.as_str(), "u1");

        let numeric: AuthUser =
            serde_json::from_value(json!({ "id": 7, "email": "a@b.vn" })).unwrap();
        assert_eq!(numeric.id.as_str(), "7");
    }

    #[test]
    fn test_auth_user_roundtrips_through_session_record() {
        let user: AuthUser =
            serde_json::from_value(json!({ "_id": "u1", "id": "u1", "email": "a@b.vn" })).unwrap();
        let stored = serde_json::to_string(&user).unwrap();
        assert_eq!(serde_json::from_str::<AuthUser>(&stored).unwrap(), user);
    }

    #[test]
    fn test_auth_user_without_id_is_rejected() {
        assert!(serde_json::from_value::<AuthUser>(json!({ "email": "a@b.vn" })).is_err());
    }

    #[test]
    fn test_remote_error_message_fallbacks() {
        let body = RemoteErrorBody {
            message: None,
            error: Some("Email already registered".into()),
        };
        assert_eq!(body.into_message().as_deref(), Some("Email already registered"));
        assert_eq!(RemoteErrorBody::default().into_message(), None);
    }
}
