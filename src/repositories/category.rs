use uuid::Uuid;

use super::Repo;
use crate::models::category::{BILLBOARD, Category};
use crate::models::pagination::{Page, Pagination};
use crate::persistence::{Optional, QueryOption, RepoError};

#[derive(Clone)]
pub struct CategoryRepository {
    repo: Repo<Category>,
}

impl CategoryRepository {
    pub fn new(repo: Repo<Category>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, category: &Category) -> Result<(), RepoError> {
        self.repo.create(category).await
    }

    /// Finds a category with its billboard preloaded.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        self.repo
            .find_one(&[QueryOption::eq("id", id), QueryOption::Preload(BILLBOARD)])
            .await
            .optional()
    }

    pub async fn paged_list(
        &self,
        store_id: Uuid,
        pagination: Pagination,
        name: Option<&str>,
        billboard_id: Option<Uuid>,
    ) -> Result<Page<Category>, RepoError> {
        let mut options = vec![
            QueryOption::eq("store_id", store_id),
            QueryOption::Preload(BILLBOARD),
        ];
        if let Some(name) = name {
            options.push(QueryOption::like("name", name));
        }
        if let Some(billboard_id) = billboard_id {
            options.push(QueryOption::eq("billboard_id", billboard_id));
        }
        options.push(QueryOption::newest_first());

        self.repo.paginate(pagination, &options).await
    }

    pub async fn update(&self, category: &Category) -> Result<(), RepoError> {
        self.repo.update(category).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.repo.delete(id).await
    }
}
