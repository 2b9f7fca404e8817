use uuid::Uuid;

use super::Repo;
use crate::models::otp::Otp;
use crate::persistence::{Optional, QueryOption, RepoError};

#[derive(Clone)]
pub struct OtpRepository {
    repo: Repo<Otp>,
}

impl OtpRepository {
    pub fn new(repo: Repo<Otp>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, otp: &Otp) -> Result<(), RepoError> {
        self.repo.create(otp).await
    }

    pub async fn find_by_verification_token(&self, token: &str) -> Result<Option<Otp>, RepoError> {
        self.repo
            .find_one(&[QueryOption::eq("verification_token", token)])
            .await
            .optional()
    }

    pub async fn update(&self, otp: &Otp) -> Result<(), RepoError> {
        self.repo.update(otp).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.repo.delete(id).await
    }
}
