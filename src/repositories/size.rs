use uuid::Uuid;

use super::Repo;
use crate::models::pagination::{Page, Pagination};
use crate::models::size::Size;
use crate::persistence::{Optional, QueryOption, RepoError};

#[derive(Clone)]
pub struct SizeRepository {
    repo: Repo<Size>,
}

impl SizeRepository {
    pub fn new(repo: Repo<Size>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, size: &Size) -> Result<(), RepoError> {
        self.repo.create(size).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Size>, RepoError> {
        self.repo.find_by_id(id).await.optional()
    }

    pub async fn paged_list(
        &self,
        store_id: Uuid,
        pagination: Pagination,
        name: Option<&str>,
    ) -> Result<Page<Size>, RepoError> {
        let mut options = vec![QueryOption::eq("store_id", store_id)];
        if let Some(name) = name {
            options.push(QueryOption::like("name", name));
        }
        options.push(QueryOption::newest_first());

        self.repo.paginate(pagination, &options).await
    }

    pub async fn update(&self, size: &Size) -> Result<(), RepoError> {
        self.repo.update(size).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.repo.delete(id).await
    }
}
