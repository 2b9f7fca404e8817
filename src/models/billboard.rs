use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::persistence::{Entity, RepoError, Value, column};

/// A promotional banner of a store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Billboard {
    pub id: Uuid,
    pub label: String,
    pub image_url: Option<String>,
    pub store_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Billboard {
    pub fn new(label: &str, store_id: Uuid, image_url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.trim().to_string(),
            image_url: image_url.filter(|url| !url.is_empty()),
            store_id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

impl Entity for Billboard {
    const TABLE: &'static str = "billboards";
    const COLUMNS: &'static [&'static str] =
        &["id", "label", "image_url", "store_id", "created_at", "updated_at"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.label.clone().into(),
            self.image_url.clone().into(),
            self.store_id.into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Billboard {
            id: column(row, "id")?,
            label: column(row, "label")?,
            image_url: column(row, "image_url")?,
            store_id: column(row, "store_id")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BillboardResponse {
    pub id: Uuid,
    pub label: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<Billboard> for BillboardResponse {
    fn from(billboard: Billboard) -> Self {
        Self {
            id: billboard.id,
            label: billboard.label,
            image_url: billboard.image_url.unwrap_or_default(),
            created_at: billboard.created_at,
        }
    }
}

/// The short form embedded in category responses.
#[derive(Serialize, Debug)]
pub struct BillboardBasicResponse {
    pub id: Uuid,
    pub label: String,
}

impl From<&Billboard> for BillboardBasicResponse {
    fn from(billboard: &Billboard) -> Self {
        Self {
            id: billboard.id,
            label: billboard.label.clone(),
        }
    }
}
