use uuid::Uuid;

use super::Repo;
use crate::models::store::Store;
use crate::persistence::{Optional, QueryOption, RepoError};

#[derive(Clone)]
pub struct StoreRepository {
    repo: Repo<Store>,
}

impl StoreRepository {
    pub fn new(repo: Repo<Store>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, store: &Store) -> Result<(), RepoError> {
        self.repo.create(store).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Store>, RepoError> {
        self.repo.find_by_id(id).await.optional()
    }

    /// The user's oldest store.
    pub async fn find_first_by_user(&self, user_id: Uuid) -> Result<Option<Store>, RepoError> {
        self.repo
            .find_one(&[
                QueryOption::eq("user_id", user_id),
                QueryOption::oldest_first(),
            ])
            .await
            .optional()
    }

    pub async fn find_all_by_user(&self, user_id: Uuid) -> Result<Vec<Store>, RepoError> {
        self.repo
            .find_all(&[
                QueryOption::eq("user_id", user_id),
                QueryOption::oldest_first(),
            ])
            .await
    }

    pub async fn update(&self, store: &Store) -> Result<(), RepoError> {
        self.repo.update(store).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.repo.delete(id).await
    }
}
