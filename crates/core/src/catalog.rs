//! Catalog data model
//!
//! Menu items, categories and promotions as mirrored from the backend (or
//! the static fixtures when no backend is configured). These records are
//! owned by the catalog store; the cart only ever copies fields out of
//! them.

use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::price::Rupiah;

/// Normalized catalog item identifier.
///
/// The backend hands out opaque string ids while the static fixtures use
/// small integers; both normalize to this single string form at the
/// boundary, so item lookups never compare across id types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A purchasable menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Catalog identifier.
    pub id: ItemId,

    /// Display name.
    pub name: String,

    /// Unit price in whole rupiah.
    pub price: Rupiah,

    /// Category name; matches a [`Category::name`].
    pub category: String,

    /// Longer description shown on the product page.
    #[serde(default)]
    pub description: String,

    /// Image URI.
    #[serde(default)]
    pub image: String,

    /// Ordered ingredient list.
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Curated onto the homepage when set.
    #[serde(default)]
    pub popular: bool,
}

/// A menu category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Catalog identifier.
    pub id: ItemId,

    /// Display name.
    pub name: String,

    /// Normalized form of `name`, regenerated on every create and update.
    pub slug: String,
}

impl Category {
    /// Creates a category, deriving the slug from the name.
    #[must_use]
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = Self::slugify(&name);

        Self { id, name, slug }
    }

    /// Normalizes a category name into its slug form.
    #[must_use]
    pub fn slugify(name: &str) -> String {
        name.to_lowercase()
    }
}

/// A promotional banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    /// Catalog identifier.
    pub id: ItemId,

    /// Headline.
    pub title: String,

    /// Secondary line.
    #[serde(default)]
    pub subtitle: String,

    /// Terms text.
    #[serde(default)]
    pub description: String,

    /// Display string for the advertised discount, e.g. `"25%"`.
    #[serde(default)]
    pub discount: String,

    /// Banner image URI.
    #[serde(default)]
    pub image: String,

    /// Last day the promotion is advertised, when known.
    #[serde(default)]
    pub valid_until: Option<Date>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_ids_normalize_numeric_and_string_forms() {
        let from_fixture = ItemId::from(3_u64);
        let from_backend = ItemId::from("3");

        assert_eq!(from_fixture, from_backend);
    }

    #[test]
    fn category_slug_is_lowercased_name() {
        let category = Category::new(ItemId::from("2"), "Burger");

        assert_eq!(category.slug, "burger");
    }

    #[test]
    fn category_new_regenerates_slug_from_name() {
        let category = Category::new(ItemId::from("9"), "HotDog Special");

        assert_eq!(category.slug, Category::slugify(&category.name));
        assert_eq!(category.slug, "hotdog special");
    }
}
