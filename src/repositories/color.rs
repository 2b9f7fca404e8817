use uuid::Uuid;

use super::Repo;
use crate::models::color::Color;
use crate::models::pagination::{Page, Pagination};
use crate::persistence::{Optional, QueryOption, RepoError};

#[derive(Clone)]
pub struct ColorRepository {
    repo: Repo<Color>,
}

impl ColorRepository {
    pub fn new(repo: Repo<Color>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, color: &Color) -> Result<(), RepoError> {
        self.repo.create(color).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Color>, RepoError> {
        self.repo.find_by_id(id).await.optional()
    }

    pub async fn find_by_hex(&self, store_id: Uuid, hex: &str) -> Result<Option<Color>, RepoError> {
        self.repo
            .find_one(&[
                QueryOption::eq("store_id", store_id),
                QueryOption::eq("hex", hex),
            ])
            .await
            .optional()
    }

    pub async fn paged_list(
        &self,
        store_id: Uuid,
        pagination: Pagination,
        name: Option<&str>,
    ) -> Result<Page<Color>, RepoError> {
        let mut options = vec![QueryOption::eq("store_id", store_id)];
        if let Some(name) = name {
            options.push(QueryOption::like("name", name));
        }
        options.push(QueryOption::newest_first());

        self.repo.paginate(pagination, &options).await
    }

    pub async fn update(&self, color: &Color) -> Result<(), RepoError> {
        self.repo.update(color).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.repo.delete(id).await
    }
}
