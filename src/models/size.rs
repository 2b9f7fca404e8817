use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::persistence::{Entity, RepoError, Value, column};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Size {
    pub id: Uuid,
    pub name: String,
    pub value: String,
    pub store_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Size {
    pub fn new(name: &str, value: &str, store_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            value: value.trim().to_string(),
            store_id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

impl Entity for Size {
    const TABLE: &'static str = "sizes";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "value", "store_id", "created_at", "updated_at"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.name.clone().into(),
            self.value.clone().into(),
            self.store_id.into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Size {
            id: column(row, "id")?,
            name: column(row, "name")?,
            value: column(row, "value")?,
            store_id: column(row, "store_id")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

#[derive(Deserialize, Debug, Validate)]
pub struct SizePayload {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(length(min = 1, max = 64))]
    pub value: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SizeResponse {
    pub id: Uuid,
    pub name: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
}

impl From<Size> for SizeResponse {
    fn from(size: Size) -> Self {
        Self {
            id: size.id,
            name: size.name,
            value: size.value,
            created_at: size.created_at,
        }
    }
}
