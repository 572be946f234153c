//! Catalog write payloads.

use serde::Serialize;

use makanbar::{catalog::Category, price::Rupiah};

/// Image bytes attached to a menu or promo write.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Raw image bytes.
    pub bytes: Vec<u8>,

    /// File name the blob is stored under, e.g. `"nasi-goreng.jpg"`.
    pub file_name: String,
}

/// Fields of a menu item create or update; the id is store-assigned.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewMenuItem {
    /// Display name.
    pub name: String,

    /// Unit price in whole rupiah.
    pub price: Rupiah,

    /// Category name.
    pub category: String,

    /// Longer description.
    pub description: String,

    /// Image URI; replaced by the uploaded blob's URL when an
    /// [`ImageUpload`] accompanies the write.
    pub image: String,

    /// Ordered ingredient list.
    pub ingredients: Vec<String>,

    /// Homepage curation flag.
    pub popular: bool,
}

/// Fields of a promotion create or update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewPromotion {
    /// Headline.
    pub title: String,

    /// Secondary line.
    pub subtitle: String,

    /// Terms text.
    pub description: String,

    /// Advertised discount display string.
    pub discount: String,

    /// Banner image URI; replaced like [`NewMenuItem::image`].
    pub image: String,
}

/// Fields of a category create or update. The slug is never supplied; it
/// is regenerated from the name on every write.
#[derive(Debug, Clone)]
pub struct NewCategory {
    /// Display name.
    pub name: String,
}

/// What actually goes on the wire for a category: name plus the derived
/// slug.
#[derive(Debug, Serialize)]
pub(crate) struct CategoryPayload {
    pub name: String,
    pub slug: String,
}

impl From<NewCategory> for CategoryPayload {
    fn from(category: NewCategory) -> Self {
        let slug = Category::slugify(&category.name);

        Self {
            name: category.name,
            slug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_payload_regenerates_the_slug() {
        let payload = CategoryPayload::from(NewCategory {
            name: "Minuman Dingin".to_owned(),
        });

        assert_eq!(payload.slug, "minuman dingin");
    }
}
