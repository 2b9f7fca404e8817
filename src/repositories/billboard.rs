use uuid::Uuid;

use super::Repo;
use crate::models::billboard::Billboard;
use crate::models::pagination::{Page, Pagination};
use crate::persistence::{Optional, QueryOption, RepoError};

#[derive(Clone)]
pub struct BillboardRepository {
    repo: Repo<Billboard>,
}

impl BillboardRepository {
    pub fn new(repo: Repo<Billboard>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, billboard: &Billboard) -> Result<(), RepoError> {
        self.repo.create(billboard).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Billboard>, RepoError> {
        self.repo.find_by_id(id).await.optional()
    }

    /// Newest-first page of a store's billboards, optionally filtered by label.
    pub async fn paged_list(
        &self,
        store_id: Uuid,
        pagination: Pagination,
        label: Option<&str>,
    ) -> Result<Page<Billboard>, RepoError> {
        let mut options = vec![QueryOption::eq("store_id", store_id)];
        if let Some(label) = label {
            options.push(QueryOption::like("label", label));
        }
        options.push(QueryOption::newest_first());

        self.repo.paginate(pagination, &options).await
    }

    pub async fn update(&self, billboard: &Billboard) -> Result<(), RepoError> {
        self.repo.update(billboard).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.repo.delete(id).await
    }
}
