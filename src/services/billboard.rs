use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::billboard::Billboard;
use crate::models::pagination::{Page, Pagination};
use crate::models::product_image::ImageUpload;
use crate::repositories::billboard::BillboardRepository;
use crate::services::image::ImageService;
use crate::services::store::StoreService;

#[derive(Clone)]
pub struct BillboardService {
    billboards: BillboardRepository,
    stores: StoreService,
    images: ImageService,
}

impl BillboardService {
    pub fn new(billboards: BillboardRepository, stores: StoreService, images: ImageService) -> Self {
        Self {
            billboards,
            stores,
            images,
        }
    }

    /// Uploads the image, then inserts the billboard.
    ///
    /// Ownership is checked before anything leaves the process, so a foreign
    /// store gets a 403 without an upload or a row.
    pub async fn create(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        label: &str,
        image: &ImageUpload,
    ) -> Result<Billboard> {
        self.stores.owned_store(store_id, user_id).await?;

        let image_url = self.images.validate_and_upload(image).await?;
        let billboard = Billboard::new(label, store_id, Some(image_url));
        self.billboards.create(&billboard).await?;

        tracing::info!("✅ Billboard {} created in store {}", billboard.id, store_id);
        Ok(billboard)
    }

    pub async fn paged_list(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        pagination: Pagination,
        label: Option<&str>,
    ) -> Result<Page<Billboard>> {
        self.stores.owned_store(store_id, user_id).await?;
        Ok(self
            .billboards
            .paged_list(store_id, pagination, label)
            .await?)
    }

    pub async fn get(&self, store_id: Uuid, user_id: Uuid, billboard_id: Uuid) -> Result<Billboard> {
        self.stores.owned_store(store_id, user_id).await?;
        self.billboards
            .find_by_id(billboard_id)
            .await?
            .filter(|billboard| billboard.store_id == store_id)
            .ok_or(AppError::BillboardNotFound)
    }

    /// Replaces the label and, when a new image is given, the image URL.
    pub async fn update(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        billboard_id: Uuid,
        label: &str,
        image: Option<&ImageUpload>,
    ) -> Result<Billboard> {
        self.stores.owned_store(store_id, user_id).await?;
        let mut billboard = self.billboard_in_store(store_id, billboard_id).await?;

        if let Some(image) = image {
            billboard.image_url = Some(self.images.validate_and_upload(image).await?);
        }
        billboard.label = label.trim().to_string();
        billboard.updated_at = Some(Utc::now());

        self.billboards.update(&billboard).await?;
        Ok(billboard)
    }

    pub async fn delete(&self, store_id: Uuid, user_id: Uuid, billboard_id: Uuid) -> Result<()> {
        self.stores.owned_store(store_id, user_id).await?;
        self.billboard_in_store(store_id, billboard_id).await?;
        self.billboards.delete(billboard_id).await?;

        tracing::info!("Billboard {} deleted", billboard_id);
        Ok(())
    }

    /// Finds a billboard that must belong to `store_id`.
    ///
    /// A billboard of another store is `AppError::BillboardNotInStore`, not a
    /// not-found.
    pub async fn billboard_in_store(&self, store_id: Uuid, billboard_id: Uuid) -> Result<Billboard> {
        let billboard = self
            .billboards
            .find_by_id(billboard_id)
            .await?
            .ok_or(AppError::BillboardNotFound)?;

        if billboard.store_id != store_id {
            return Err(AppError::BillboardNotInStore);
        }

        Ok(billboard)
    }
}
