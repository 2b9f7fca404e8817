use super::Repo;
use crate::models::user::User;
use crate::persistence::{Optional, QueryOption, RepoError};

#[derive(Clone)]
pub struct UserRepository {
    repo: Repo<User>,
}

impl UserRepository {
    pub fn new(repo: Repo<User>) -> Self {
        Self { repo }
    }

    /// Creates a new user in the database.
    pub async fn create_user(&self, user: &User) -> Result<(), RepoError> {
        self.repo.create(user).await
    }

    /// Finds a user by their email address.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        self.repo
            .find_one(&[QueryOption::eq("email", email)])
            .await
            .optional()
    }
}
