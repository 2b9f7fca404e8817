use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::persistence::{Entity, RepoError, Value, column};

/// A tenant: every catalog entity hangs off exactly one store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Store {
    pub fn new(name: &str, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            user_id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

impl Entity for Store {
    const TABLE: &'static str = "stores";
    const COLUMNS: &'static [&'static str] = &["id", "name", "user_id", "created_at", "updated_at"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.name.clone().into(),
            self.user_id.into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Store {
            id: column(row, "id")?,
            name: column(row, "name")?,
            user_id: column(row, "user_id")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

#[derive(Deserialize, Debug, Validate)]
pub struct StorePayload {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreResponse {
    pub store_id: Uuid,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Store> for StoreResponse {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            name: store.name,
            created_at: store.created_at,
        }
    }
}
