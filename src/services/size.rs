use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::pagination::{Page, Pagination};
use crate::models::size::Size;
use crate::repositories::size::SizeRepository;
use crate::services::store::StoreService;

#[derive(Clone)]
pub struct SizeService {
    sizes: SizeRepository,
    stores: StoreService,
}

impl SizeService {
    pub fn new(sizes: SizeRepository, stores: StoreService) -> Self {
        Self { sizes, stores }
    }

    pub async fn create(&self, store_id: Uuid, user_id: Uuid, name: &str, value: &str) -> Result<Size> {
        self.stores.owned_store(store_id, user_id).await?;

        let size = Size::new(name, value, store_id);
        self.sizes.create(&size).await?;

        tracing::info!("✅ Size {} created in store {}", size.id, store_id);
        Ok(size)
    }

    pub async fn paged_list(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        pagination: Pagination,
        name: Option<&str>,
    ) -> Result<Page<Size>> {
        self.stores.owned_store(store_id, user_id).await?;
        Ok(self.sizes.paged_list(store_id, pagination, name).await?)
    }

    pub async fn get(&self, store_id: Uuid, user_id: Uuid, size_id: Uuid) -> Result<Size> {
        self.stores.owned_store(store_id, user_id).await?;
        self.find_in_store(store_id, size_id).await
    }

    pub async fn update(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        size_id: Uuid,
        name: &str,
        value: &str,
    ) -> Result<Size> {
        self.stores.owned_store(store_id, user_id).await?;
        let mut size = self.find_in_store(store_id, size_id).await?;

        size.name = name.trim().to_string();
        size.value = value.trim().to_string();
        size.updated_at = Some(Utc::now());

        self.sizes.update(&size).await?;
        Ok(size)
    }

    pub async fn delete(&self, store_id: Uuid, user_id: Uuid, size_id: Uuid) -> Result<()> {
        self.stores.owned_store(store_id, user_id).await?;
        self.find_in_store(store_id, size_id).await?;
        self.sizes.delete(size_id).await?;
        Ok(())
    }

    pub async fn find_in_store(&self, store_id: Uuid, size_id: Uuid) -> Result<Size> {
        self.sizes
            .find_by_id(size_id)
            .await?
            .filter(|size| size.store_id == store_id)
            .ok_or(AppError::SizeNotFound)
    }
}
