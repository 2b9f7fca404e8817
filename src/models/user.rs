use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::persistence::{Entity, RepoError, Value, column};

/// Represents a user in the system.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's full name.
    pub name: String,
    /// The user's username. Registration sets it to the email.
    pub username: String,
    /// The user's email address, unique across users.
    pub email: String,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the user was last updated.
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            username: email.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "username", "email", "created_at", "updated_at"];
    const UNIQUE_KEYS: &'static [&'static [&'static str]] = &[&["username"], &["email"]];

    fn id(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.name.clone().into(),
            self.username.clone().into(),
            self.email.clone().into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(User {
            id: column(row, "id")?,
            name: column(row, "name")?,
            username: column(row, "username")?,
            email: column(row, "email")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

/// The request payload for user registration.
#[derive(Deserialize, Debug, Validate)]
pub struct CreateUserPayload {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(email)]
    pub email: String,
}

/// The request payload for user login.
#[derive(Deserialize, Debug, Validate)]
pub struct LoginPayload {
    #[garde(email)]
    pub email: String,
}
