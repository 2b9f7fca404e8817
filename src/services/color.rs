use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::color::Color;
use crate::models::pagination::{Page, Pagination};
use crate::persistence::RepoError;
use crate::repositories::color::ColorRepository;
use crate::services::store::StoreService;

#[derive(Clone)]
pub struct ColorService {
    colors: ColorRepository,
    stores: StoreService,
}

impl ColorService {
    pub fn new(colors: ColorRepository, stores: StoreService) -> Self {
        Self { colors, stores }
    }

    /// Fails with `AppError::ColorHexAlreadyExists` unless `hex` is free in the
    /// store, ignoring the color being edited.
    async fn ensure_hex_available(&self, store_id: Uuid, hex: &str, editing: Option<Uuid>) -> Result<()> {
        match self.colors.find_by_hex(store_id, hex).await? {
            Some(existing) if Some(existing.id) != editing => Err(AppError::ColorHexAlreadyExists),
            _ => Ok(()),
        }
    }

    pub async fn create(&self, store_id: Uuid, user_id: Uuid, name: &str, hex: &str) -> Result<Color> {
        self.stores.owned_store(store_id, user_id).await?;

        let color = Color::new(name, hex, store_id);
        self.ensure_hex_available(store_id, &color.hex, None).await?;

        self.colors.create(&color).await.map_err(|e| match e {
            RepoError::Conflict(_) => AppError::ColorHexAlreadyExists,
            other => other.into(),
        })?;

        tracing::info!("✅ Color {} created in store {}", color.id, store_id);
        Ok(color)
    }

    pub async fn paged_list(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        pagination: Pagination,
        name: Option<&str>,
    ) -> Result<Page<Color>> {
        self.stores.owned_store(store_id, user_id).await?;
        Ok(self.colors.paged_list(store_id, pagination, name).await?)
    }

    pub async fn get(&self, store_id: Uuid, user_id: Uuid, color_id: Uuid) -> Result<Color> {
        self.stores.owned_store(store_id, user_id).await?;
        self.find_in_store(store_id, color_id).await
    }

    pub async fn update(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        color_id: Uuid,
        name: &str,
        hex: &str,
    ) -> Result<Color> {
        self.stores.owned_store(store_id, user_id).await?;
        let mut color = self.find_in_store(store_id, color_id).await?;

        let hex = hex.trim();
        self.ensure_hex_available(store_id, hex, Some(color.id)).await?;

        color.name = name.trim().to_string();
        color.hex = hex.to_string();
        color.updated_at = Some(Utc::now());

        self.colors.update(&color).await.map_err(|e| match e {
            RepoError::Conflict(_) => AppError::ColorHexAlreadyExists,
            other => other.into(),
        })?;
        Ok(color)
    }

    pub async fn delete(&self, store_id: Uuid, user_id: Uuid, color_id: Uuid) -> Result<()> {
        self.stores.owned_store(store_id, user_id).await?;
        self.find_in_store(store_id, color_id).await?;
        self.colors.delete(color_id).await?;
        Ok(())
    }

    pub async fn find_in_store(&self, store_id: Uuid, color_id: Uuid) -> Result<Color> {
        self.colors
            .find_by_id(color_id)
            .await?
            .filter(|color| color.store_id == store_id)
            .ok_or(AppError::ColorNotFound)
    }
}
