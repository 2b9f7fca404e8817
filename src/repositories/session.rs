use super::Repo;
use crate::models::session::Session;
use crate::persistence::{Optional, QueryOption, RepoError};

#[derive(Clone)]
pub struct SessionRepository {
    repo: Repo<Session>,
}

impl SessionRepository {
    pub fn new(repo: Repo<Session>) -> Self {
        Self { repo }
    }

    /// Creates the session if its id is unknown, otherwise replaces it.
    pub async fn upsert(&self, session: &Session) -> Result<(), RepoError> {
        match self.repo.find_by_id(session.id).await.optional()? {
            Some(_) => self.repo.update(session).await,
            None => self.repo.create(session).await,
        }
    }

    /// Finds the session currently holding `token`.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<Session>, RepoError> {
        self.repo
            .find_one(&[QueryOption::eq("token", token)])
            .await
            .optional()
    }
}
