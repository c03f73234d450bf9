//! Client-side form validation.
//!
//! Validation failures are reported per field and never reach the API.

use std::collections::BTreeMap;
use std::fmt;

use atelier_core::{Category, Email, Price};

use crate::api::{NewProduct, Product, ProductPatch};

/// Minimum password length accepted by the authentication forms.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Message for a field, if it failed.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Failed fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// Product form
// =============================================================================

/// Raw product form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: String,
    pub category: String,
}

/// A product form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: Option<String>,
    pub category: Option<Category>,
}

impl ProductForm {
    /// Prefill the form for editing an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.amount().to_string(),
            image: product.image.clone().unwrap_or_default(),
            category: product
                .category
                .as_ref()
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
        }
    }

    /// Check required fields.
    ///
    /// Name and description must be non-empty after trimming and the price
    /// must be a positive whole number. Blank image and category are absent.
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn validate(&self) -> Result<ValidProduct, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Product name is required");
        }
        let description = self.description.trim();
        if description.is_empty() {
            errors.add("description", "Description is required");
        }
        let price = Price::parse_positive(&self.price)
            .map_err(|e| errors.add("price", e.to_string()))
            .ok();

        let image = Some(self.image.trim()).filter(|s| !s.is_empty());
        let category = Some(self.category.trim())
            .filter(|s| !Category::is_unrestricted(s))
            .map(Category::from);

        errors.into_result(|| ValidProduct {
            name: name.to_string(),
            description: description.to_string(),
            price: price.unwrap_or_default(),
            image: image.map(String::from),
            category,
        })
    }
}

impl From<ValidProduct> for NewProduct {
    fn from(valid: ValidProduct) -> Self {
        Self {
            name: valid.name,
            description: valid.description,
            price: valid.price,
            image: valid.image,
            category: valid.category,
        }
    }
}

/// A submitted edit form replaces every field; a blank image or category is
/// sent as an empty string so the stored value is cleared.
impl From<ValidProduct> for ProductPatch {
    fn from(valid: ValidProduct) -> Self {
        Self {
            name: Some(valid.name),
            description: Some(valid.description),
            price: Some(valid.price),
            image: Some(valid.image.unwrap_or_default()),
            category: Some(valid.category.unwrap_or_else(|| Category::new(""))),
        }
    }
}

// =============================================================================
// Credentials form
// =============================================================================

/// Raw email/password form input.
#[derive(Clone, Default)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for CredentialsForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl CredentialsForm {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check the email shape and password length.
    ///
    /// The returned email is trimmed; the password is passed through as typed.
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn validate(&self) -> Result<(Email, &str), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let email = Email::parse(&self.email)
            .map_err(|e| errors.add("email", e.to_string()))
            .ok();

        if self.password.is_empty() {
            errors.add("password", "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }

        match email {
            Some(email) if errors.is_empty() => Ok((email, self.password.as_str())),
            _ => Err(errors),
        }
    }
}
