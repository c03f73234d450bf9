//! Product category tags.
//!
//! Categories come from an open, externally defined set. The storefront knows
//! a handful of them well enough to label and feature them, but any other tag
//! the remote store returns is still a valid category.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A category tag attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Filter value meaning "no category restriction".
    pub const ALL: &'static str = "all";

    /// Create a category tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The raw tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this tag equals `tag`, ignoring case.
    #[must_use]
    pub fn matches(&self, tag: &str) -> bool {
        self.0.to_lowercase() == tag.to_lowercase()
    }

    /// Whether a filter value means "every category".
    #[must_use]
    pub fn is_unrestricted(filter: &str) -> bool {
        let filter = filter.trim();
        filter.is_empty() || filter.eq_ignore_ascii_case(Self::ALL)
    }

    /// Display label for known tags, or the raw tag otherwise.
    #[must_use]
    pub fn label(&self) -> &str {
        KnownCategory::lookup(&self.0).map_or(self.0.as_str(), |known| known.label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(tag: &str) -> Self {
        Self(tag.to_owned())
    }
}

impl From<String> for Category {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

/// A category the storefront features with its own label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownCategory {
    /// Tag as stored on products.
    pub id: &'static str,
    /// Human-readable label.
    pub label: &'static str,
}

impl KnownCategory {
    /// Find a known category by tag, ignoring case.
    #[must_use]
    pub fn lookup(tag: &str) -> Option<&'static Self> {
        KNOWN_CATEGORIES
            .iter()
            .find(|known| known.id.eq_ignore_ascii_case(tag.trim()))
    }

    /// The tag as a [`Category`].
    #[must_use]
    pub fn category(&self) -> Category {
        Category::new(self.id)
    }
}

/// Featured categories, in display order.
pub const KNOWN_CATEGORIES: &[KnownCategory] = &[
    KnownCategory { id: "polo", label: "Áo Polo" },
    KnownCategory { id: "thun", label: "Áo Thun" },
    KnownCategory { id: "jean", label: "Quần Jeans" },
    KnownCategory { id: "au", label: "Quần Âu" },
    KnownCategory { id: "somi", label: "Áo Sơ Mi" },
];
