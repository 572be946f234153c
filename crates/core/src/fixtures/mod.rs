//! Static fallback data
//!
//! When no backend is configured the storefront serves this embedded
//! catalog: the menu, promotions and categories ship as YAML compiled into
//! the binary.

use serde::Deserialize;
use thiserror::Error;

use crate::catalog::{Category, MenuItem, Promotion};

const MENU_YAML: &str = include_str!("menu.yaml");

/// Errors loading fixture data.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The embedded YAML failed to parse.
    #[error("failed to parse fixture data")]
    Parse(#[from] serde_norway::Error),
}

/// The embedded catalog as one document.
#[derive(Debug, Deserialize)]
pub struct MenuFixture {
    /// Fallback menu items.
    pub menu_items: Vec<MenuItem>,

    /// Fallback promotional banners.
    pub promotions: Vec<Promotion>,

    /// Fallback categories.
    pub categories: Vec<Category>,
}

/// Parses the embedded catalog.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the embedded YAML does not parse; that is
/// a build defect, not a runtime condition.
pub fn load() -> Result<MenuFixture, FixtureError> {
    Ok(serde_norway::from_str(MENU_YAML)?)
}

/// The fallback menu items.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the embedded YAML does not parse.
pub fn menu_items() -> Result<Vec<MenuItem>, FixtureError> {
    load().map(|fixture| fixture.menu_items)
}

/// The fallback promotions.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the embedded YAML does not parse.
pub fn promotions() -> Result<Vec<Promotion>, FixtureError> {
    load().map(|fixture| fixture.promotions)
}

/// The fallback categories.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the embedded YAML does not parse.
pub fn categories() -> Result<Vec<Category>, FixtureError> {
    load().map(|fixture| fixture.categories)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::price::Rupiah;

    use super::*;

    #[test]
    fn fixture_parses_with_expected_counts() -> TestResult {
        let fixture = load()?;

        assert_eq!(fixture.menu_items.len(), 5);
        assert_eq!(fixture.promotions.len(), 1);
        assert_eq!(fixture.categories.len(), 5);

        Ok(())
    }

    #[test]
    fn pizza_price_matches_the_menu() -> TestResult {
        let items = menu_items()?;

        let pizza = items
            .iter()
            .find(|item| item.name == "Pizza mozzarella")
            .expect("pizza missing from fixtures");

        assert_eq!(pizza.price, Rupiah::new(40_000));
        assert_eq!(pizza.category, "Pizza");

        Ok(())
    }

    #[test]
    fn category_slugs_are_normalized() -> TestResult {
        let categories = categories()?;

        for category in &categories {
            assert_eq!(category.slug, Category::slugify(&category.name));
        }

        Ok(())
    }
}
