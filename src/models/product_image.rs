use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::persistence::{Entity, RepoError, Value, column};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: Uuid,
    pub image_url: String,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProductImage {
    pub fn new(product_id: Uuid, image_url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_url,
            product_id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

impl Entity for ProductImage {
    const TABLE: &'static str = "product_images";
    const COLUMNS: &'static [&'static str] =
        &["id", "image_url", "product_id", "created_at", "updated_at"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.image_url.clone().into(),
            self.product_id.into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(ProductImage {
            id: column(row, "id")?,
            image_url: column(row, "image_url")?,
            product_id: column(row, "product_id")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

/// An uploaded file waiting to be pushed to image storage.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: bytes::Bytes,
}
