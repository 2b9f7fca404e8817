use crate::error::{AppError, Result};
use crate::models::user::User;
use crate::repositories::user::UserRepository;

#[derive(Clone)]
pub struct UserManager {
    users: UserRepository,
}

impl UserManager {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Persists `user` unless its email is already registered.
    pub async fn create_user(&self, user: &User) -> Result<()> {
        if self.users.find_by_email(&user.email).await?.is_some() {
            return Err(AppError::UserAlreadyExists);
        }

        self.users.create_user(user).await.map_err(|e| match e {
            // lost a race against a concurrent registration
            crate::persistence::RepoError::Conflict(_) => AppError::UserAlreadyExists,
            other => other.into(),
        })?;

        tracing::info!("✅ User registered: {}", user.id);
        Ok(())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or(AppError::UserNotFound)
    }
}
