use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::store::Store;
use crate::repositories::store::StoreRepository;

/// Store CRUD plus the ownership check every tenant-scoped operation runs first.
#[derive(Clone)]
pub struct StoreService {
    stores: StoreRepository,
}

impl StoreService {
    pub fn new(stores: StoreRepository) -> Self {
        Self { stores }
    }

    pub async fn create_store(&self, name: &str, user_id: Uuid) -> Result<Store> {
        let store = Store::new(name, user_id);
        self.stores.create(&store).await?;

        tracing::info!("✅ Store {} created for user {}", store.id, user_id);
        Ok(store)
    }

    /// Fetches the store and checks that `user_id` owns it.
    ///
    /// # Returns
    ///
    /// `AppError::StoreNotFound` when the store does not exist and
    /// `AppError::StoreNotOwned` when it belongs to someone else.
    pub async fn owned_store(&self, store_id: Uuid, user_id: Uuid) -> Result<Store> {
        let store = self
            .stores
            .find_by_id(store_id)
            .await?
            .ok_or(AppError::StoreNotFound)?;

        if !store.is_owned_by(user_id) {
            tracing::warn!("🔐 User {} tried to access store {}", user_id, store_id);
            return Err(AppError::StoreNotOwned);
        }

        Ok(store)
    }

    pub async fn get_user_first_store(&self, user_id: Uuid) -> Result<Store> {
        self.stores
            .find_first_by_user(user_id)
            .await?
            .ok_or(AppError::StoreNotFound)
    }

    pub async fn list_user_stores(&self, user_id: Uuid) -> Result<Vec<Store>> {
        Ok(self.stores.find_all_by_user(user_id).await?)
    }

    pub async fn update_store(&self, store_id: Uuid, user_id: Uuid, name: &str) -> Result<Store> {
        let mut store = self.owned_store(store_id, user_id).await?;
        store.name = name.trim().to_string();
        store.updated_at = Some(Utc::now());

        self.stores.update(&store).await?;
        Ok(store)
    }

    /// Deletes the store; its catalog goes with it through the schema's cascades.
    pub async fn delete_store(&self, store_id: Uuid, user_id: Uuid) -> Result<()> {
        self.owned_store(store_id, user_id).await?;
        self.stores.delete(store_id).await?;

        tracing::info!("Store {} deleted", store_id);
        Ok(())
    }
}
