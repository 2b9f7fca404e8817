use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::persistence::{Entity, RepoError, Value, column};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price_in_cents: i64,
    pub is_featured: bool,
    pub is_archived: bool,
    pub store_id: Uuid,
    pub category_id: Uuid,
    pub color_id: Uuid,
    pub size_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Product {
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "price_in_cents",
        "is_featured",
        "is_archived",
        "store_id",
        "category_id",
        "color_id",
        "size_id",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.name.clone().into(),
            self.price_in_cents.into(),
            self.is_featured.into(),
            self.is_archived.into(),
            self.store_id.into(),
            self.category_id.into(),
            self.color_id.into(),
            self.size_id.into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Product {
            id: column(row, "id")?,
            name: column(row, "name")?,
            price_in_cents: column(row, "price_in_cents")?,
            is_featured: column(row, "is_featured")?,
            is_archived: column(row, "is_archived")?,
            store_id: column(row, "store_id")?,
            category_id: column(row, "category_id")?,
            color_id: column(row, "color_id")?,
            size_id: column(row, "size_id")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

/// Product fields collected from the multipart form.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price_in_cents: i64,
    pub is_featured: bool,
    pub is_archived: bool,
    pub category_id: Uuid,
    pub color_id: Uuid,
    pub size_id: Uuid,
}

impl NewProduct {
    pub fn into_product(self, store_id: Uuid) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: self.name,
            price_in_cents: self.price_in_cents,
            is_featured: self.is_featured,
            is_archived: self.is_archived,
            store_id,
            category_id: self.category_id,
            color_id: self.color_id,
            size_id: self.size_id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductResponse {
    pub product_id: Uuid,
}
