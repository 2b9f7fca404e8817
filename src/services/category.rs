use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::category::Category;
use crate::models::pagination::{Page, Pagination};
use crate::repositories::category::CategoryRepository;
use crate::services::billboard::BillboardService;
use crate::services::store::StoreService;

#[derive(Clone)]
pub struct CategoryService {
    categories: CategoryRepository,
    stores: StoreService,
    billboards: BillboardService,
}

impl CategoryService {
    pub fn new(
        categories: CategoryRepository,
        stores: StoreService,
        billboards: BillboardService,
    ) -> Self {
        Self {
            categories,
            stores,
            billboards,
        }
    }

    /// Creates a category under a billboard of the same store.
    pub async fn create(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        name: &str,
        billboard_id: Uuid,
    ) -> Result<Category> {
        self.stores.owned_store(store_id, user_id).await?;
        let billboard = self
            .billboards
            .billboard_in_store(store_id, billboard_id)
            .await?;

        let mut category = Category::new(name, store_id, billboard_id);
        self.categories.create(&category).await?;
        category.billboard = Some(billboard);

        tracing::info!("✅ Category {} created in store {}", category.id, store_id);
        Ok(category)
    }

    pub async fn paged_list(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        pagination: Pagination,
        name: Option<&str>,
        billboard_id: Option<Uuid>,
    ) -> Result<Page<Category>> {
        self.stores.owned_store(store_id, user_id).await?;
        Ok(self
            .categories
            .paged_list(store_id, pagination, name, billboard_id)
            .await?)
    }

    pub async fn get(&self, store_id: Uuid, user_id: Uuid, category_id: Uuid) -> Result<Category> {
        self.stores.owned_store(store_id, user_id).await?;
        self.find_in_store(store_id, category_id).await
    }

    pub async fn update(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        category_id: Uuid,
        name: &str,
        billboard_id: Uuid,
    ) -> Result<Category> {
        self.stores.owned_store(store_id, user_id).await?;
        let mut category = self.find_in_store(store_id, category_id).await?;

        if category.billboard_id != billboard_id {
            let billboard = self
                .billboards
                .billboard_in_store(store_id, billboard_id)
                .await?;
            category.billboard_id = billboard.id;
            category.billboard = Some(billboard);
        }
        category.name = name.trim().to_string();
        category.updated_at = Some(Utc::now());

        self.categories.update(&category).await?;
        Ok(category)
    }

    pub async fn delete(&self, store_id: Uuid, user_id: Uuid, category_id: Uuid) -> Result<()> {
        self.stores.owned_store(store_id, user_id).await?;
        self.find_in_store(store_id, category_id).await?;
        self.categories.delete(category_id).await?;
        Ok(())
    }

    /// A category of another store is reported as missing.
    pub async fn find_in_store(&self, store_id: Uuid, category_id: Uuid) -> Result<Category> {
        self.categories
            .find_by_id(category_id)
            .await?
            .filter(|category| category.store_id == store_id)
            .ok_or(AppError::CategoryNotFound)
    }
}
