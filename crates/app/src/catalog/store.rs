//! Catalog store.
//!
//! Mirrors the backend's `menus`, `promos` and `categories` collections
//! into typed read models and forwards create/update/delete requests.
//! Reads always reflect the latest snapshot the store has been notified
//! of; writes never touch the read model directly, so a failed write
//! leaves it exactly as it was (eventual consistency, no partial
//! application).

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::watch;
use tracing::warn;

use makanbar::catalog::{Category, ItemId, MenuItem, Promotion};

use crate::{
    backend::{BlobStore, Collection, Document, DocumentStore},
    catalog::{
        errors::CatalogError,
        models::{CategoryPayload, ImageUpload, NewCategory, NewMenuItem, NewPromotion},
    },
};

/// The local read models plus write passthrough.
pub struct CatalogStore {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    menus: watch::Receiver<Vec<Document>>,
    promos: watch::Receiver<Vec<Document>>,
    categories: watch::Receiver<Vec<Document>>,
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("menus", &self.menus.borrow().len())
            .field("promos", &self.promos.borrow().len())
            .field("categories", &self.categories.borrow().len())
            .finish()
    }
}

impl CatalogStore {
    /// Creates the store and establishes the three collection
    /// subscriptions; they live until the store is dropped.
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        let menus = documents.subscribe(Collection::Menus);
        let promos = documents.subscribe(Collection::Promos);
        let categories = documents.subscribe(Collection::Categories);

        Self {
            documents,
            blobs,
            menus,
            promos,
            categories,
        }
    }

    // --- reads ----------------------------------------------------------

    /// The current menu.
    #[must_use]
    pub fn menu_items(&self) -> Vec<MenuItem> {
        decode_all(&self.menus.borrow())
    }

    /// Looks up one menu item by id.
    #[must_use]
    pub fn menu_item(&self, id: &ItemId) -> Option<MenuItem> {
        self.menu_items().into_iter().find(|item| item.id == *id)
    }

    /// Menu items flagged for homepage curation.
    #[must_use]
    pub fn popular_items(&self) -> Vec<MenuItem> {
        self.menu_items()
            .into_iter()
            .filter(|item| item.popular)
            .collect()
    }

    /// The current promotions.
    #[must_use]
    pub fn promotions(&self) -> Vec<Promotion> {
        decode_all(&self.promos.borrow())
    }

    /// The current categories.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        decode_all(&self.categories.borrow())
    }

    // --- menu writes ----------------------------------------------------

    /// Creates a menu item, uploading its image first when one is given.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the upload or the forwarded write
    /// fails; the read model is untouched either way.
    pub async fn add_menu(
        &self,
        mut menu: NewMenuItem,
        image: Option<ImageUpload>,
    ) -> Result<ItemId, CatalogError> {
        if let Some(upload) = image {
            menu.image = self.upload(Collection::Menus, &upload).await?;
        }

        let id = self
            .documents
            .create(Collection::Menus, serde_json::to_value(&menu)?)
            .await?;

        Ok(ItemId::from(id))
    }

    /// Updates a menu item.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the upload or the forwarded write
    /// fails.
    pub async fn update_menu(
        &self,
        id: &ItemId,
        mut menu: NewMenuItem,
        image: Option<ImageUpload>,
    ) -> Result<(), CatalogError> {
        if let Some(upload) = image {
            menu.image = self.upload(Collection::Menus, &upload).await?;
        }

        self.documents
            .update(Collection::Menus, id.as_str(), serde_json::to_value(&menu)?)
            .await?;

        Ok(())
    }

    /// Deletes a menu item; deleting an absent item is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the forwarded delete fails.
    pub async fn delete_menu(&self, id: &ItemId) -> Result<(), CatalogError> {
        self.documents
            .delete(Collection::Menus, id.as_str())
            .await?;

        Ok(())
    }

    // --- promo writes ---------------------------------------------------

    /// Creates a promotion.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the upload or the forwarded write
    /// fails.
    pub async fn add_promo(
        &self,
        mut promo: NewPromotion,
        image: Option<ImageUpload>,
    ) -> Result<ItemId, CatalogError> {
        if let Some(upload) = image {
            promo.image = self.upload(Collection::Promos, &upload).await?;
        }

        let id = self
            .documents
            .create(Collection::Promos, serde_json::to_value(&promo)?)
            .await?;

        Ok(ItemId::from(id))
    }

    /// Updates a promotion.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the upload or the forwarded write
    /// fails.
    pub async fn update_promo(
        &self,
        id: &ItemId,
        mut promo: NewPromotion,
        image: Option<ImageUpload>,
    ) -> Result<(), CatalogError> {
        if let Some(upload) = image {
            promo.image = self.upload(Collection::Promos, &upload).await?;
        }

        self.documents
            .update(
                Collection::Promos,
                id.as_str(),
                serde_json::to_value(&promo)?,
            )
            .await?;

        Ok(())
    }

    /// Deletes a promotion.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the forwarded delete fails.
    pub async fn delete_promo(&self, id: &ItemId) -> Result<(), CatalogError> {
        self.documents
            .delete(Collection::Promos, id.as_str())
            .await?;

        Ok(())
    }

    // --- category writes ------------------------------------------------

    /// Creates a category; the slug is derived from the name here, never
    /// taken from the caller.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the forwarded write fails.
    pub async fn add_category(&self, category: NewCategory) -> Result<ItemId, CatalogError> {
        let payload = CategoryPayload::from(category);

        let id = self
            .documents
            .create(Collection::Categories, serde_json::to_value(&payload)?)
            .await?;

        Ok(ItemId::from(id))
    }

    /// Updates a category, regenerating the slug from the new name.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the forwarded write fails.
    pub async fn update_category(
        &self,
        id: &ItemId,
        category: NewCategory,
    ) -> Result<(), CatalogError> {
        let payload = CategoryPayload::from(category);

        self.documents
            .update(
                Collection::Categories,
                id.as_str(),
                serde_json::to_value(&payload)?,
            )
            .await?;

        Ok(())
    }

    /// Deletes a category.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the forwarded delete fails.
    pub async fn delete_category(&self, id: &ItemId) -> Result<(), CatalogError> {
        self.documents
            .delete(Collection::Categories, id.as_str())
            .await?;

        Ok(())
    }

    async fn upload(
        &self,
        collection: Collection,
        upload: &ImageUpload,
    ) -> Result<String, CatalogError> {
        let path = format!("{}/{}", collection.as_str(), upload.file_name);

        Ok(self.blobs.store(&upload.bytes, &path).await?)
    }
}

/// Decodes every document in a snapshot, skipping (and logging) records
/// that do not fit the model; a malformed record must never take the
/// whole catalog down.
fn decode_all<T: DeserializeOwned>(documents: &[Document]) -> Vec<T> {
    documents
        .iter()
        .filter_map(|document| match decode(document) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(%error, id = %document.id, "skipping undecodable catalog document");
                None
            }
        })
        .collect()
}

fn decode<T: DeserializeOwned>(document: &Document) -> Result<T, serde_json::Error> {
    let mut data = document.data.clone();

    if let Some(fields) = data.as_object_mut() {
        fields.insert("id".to_owned(), json!(document.id));
    }

    serde_json::from_value(data)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tokio::sync::watch;

    use makanbar::price::Rupiah;

    use crate::backend::{
        LocalBackend, MockBlobStore, MockDocumentStore, UploadError, WriteError,
    };

    use super::*;

    fn local_store() -> CatalogStore {
        let backend = Arc::new(LocalBackend::seeded().expect("fixtures must seed"));

        CatalogStore::new(backend.clone(), backend)
    }

    fn new_menu(name: &str) -> NewMenuItem {
        NewMenuItem {
            name: name.to_owned(),
            price: Rupiah::new(35_000),
            category: "Burger".to_owned(),
            ..NewMenuItem::default()
        }
    }

    #[tokio::test]
    async fn reads_decode_the_seeded_fixtures() {
        let store = local_store();

        assert_eq!(store.menu_items().len(), 5);
        assert_eq!(store.promotions().len(), 1);
        assert_eq!(store.categories().len(), 5);
        assert_eq!(store.popular_items().len(), 3);

        let pizza = store
            .menu_item(&ItemId::from("1"))
            .expect("fixture pizza present");
        assert_eq!(pizza.price, Rupiah::new(40_000));
    }

    #[tokio::test]
    async fn add_menu_shows_up_in_the_read_model() {
        let store = local_store();

        let id = store
            .add_menu(new_menu("Nasi goreng"), None)
            .await
            .expect("local create succeeds");

        let created = store.menu_item(&id).expect("new item visible");
        assert_eq!(created.name, "Nasi goreng");
        assert_eq!(store.menu_items().len(), 6);
    }

    #[tokio::test]
    async fn add_menu_with_image_uses_the_uploaded_url() {
        let store = local_store();

        let id = store
            .add_menu(
                new_menu("Sate ayam"),
                Some(ImageUpload {
                    bytes: b"jpeg bytes".to_vec(),
                    file_name: "sate.jpg".to_owned(),
                }),
            )
            .await
            .expect("local create succeeds");

        let created = store.menu_item(&id).expect("new item visible");
        assert_eq!(created.image, "local://menus/sate.jpg");
    }

    #[tokio::test]
    async fn update_and_delete_round_trip() {
        let store = local_store();
        let id = ItemId::from("1");

        store
            .update_menu(&id, new_menu("Pizza upgrade"), None)
            .await
            .expect("update succeeds");
        assert_eq!(
            store.menu_item(&id).expect("still present").name,
            "Pizza upgrade"
        );

        store.delete_menu(&id).await.expect("delete succeeds");
        assert!(store.menu_item(&id).is_none());
    }

    #[tokio::test]
    async fn category_writes_regenerate_the_slug() {
        let store = local_store();

        let id = store
            .add_category(NewCategory {
                name: "Minuman Dingin".to_owned(),
            })
            .await
            .expect("local create succeeds");

        let created = store
            .categories()
            .into_iter()
            .find(|category| category.id == id)
            .expect("new category visible");

        assert_eq!(created.slug, "minuman dingin");
    }

    #[tokio::test]
    async fn failed_write_leaves_the_read_model_unchanged() {
        let seeded = LocalBackend::seeded().expect("fixtures must seed");
        let snapshot = seeded.subscribe(Collection::Menus).borrow().clone();

        let mut documents = MockDocumentStore::new();
        let menus = watch::channel(snapshot).0;
        let menus_rx = menus.subscribe();
        documents
            .expect_subscribe()
            .returning(move |collection| match collection {
                Collection::Menus => menus_rx.clone(),
                _ => watch::channel(Vec::new()).1,
            });
        documents
            .expect_create()
            .returning(|_, _| Err(WriteError::Rejected("backend down".to_owned())));

        let store = CatalogStore::new(Arc::new(documents), Arc::new(MockBlobStore::new()));
        let before = store.menu_items();

        let error = store
            .add_menu(new_menu("Nasi goreng"), None)
            .await
            .expect_err("write must fail");

        assert!(matches!(error, CatalogError::Write(_)));
        assert_eq!(store.menu_items(), before);
    }

    #[tokio::test]
    async fn failed_upload_aborts_before_the_write() {
        let mut documents = MockDocumentStore::new();
        documents
            .expect_subscribe()
            .returning(|_| watch::channel(Vec::new()).1);
        // No create expectation: the write must never be attempted.

        let mut blobs = MockBlobStore::new();
        blobs
            .expect_store()
            .returning(|_, _| Err(UploadError::Rejected("bucket gone".to_owned())));

        let store = CatalogStore::new(Arc::new(documents), Arc::new(blobs));

        let error = store
            .add_menu(
                new_menu("Sate ayam"),
                Some(ImageUpload {
                    bytes: b"jpeg bytes".to_vec(),
                    file_name: "sate.jpg".to_owned(),
                }),
            )
            .await
            .expect_err("upload must fail");

        assert!(matches!(error, CatalogError::Upload(_)));
    }

    #[tokio::test]
    async fn undecodable_documents_are_skipped_not_fatal() {
        let mut documents = MockDocumentStore::new();
        let menus = watch::channel(vec![
            Document {
                id: "good".to_owned(),
                data: json!({
                    "name": "Bakso",
                    "price": 25_000,
                    "category": "Soup",
                }),
            },
            Document {
                id: "bad".to_owned(),
                data: json!({ "price": "not a number" }),
            },
        ])
        .0;
        let menus_rx = menus.subscribe();
        documents
            .expect_subscribe()
            .returning(move |collection| match collection {
                Collection::Menus => menus_rx.clone(),
                _ => watch::channel(Vec::new()).1,
            });

        let store = CatalogStore::new(Arc::new(documents), Arc::new(MockBlobStore::new()));

        let items = store.menu_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Bakso");
    }
}
