use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use super::billboard::{Billboard, BillboardBasicResponse};
use crate::persistence::{Entity, Relation, RepoError, Value, column};

/// Eager-load handle for a category's billboard.
pub const BILLBOARD: Relation = Relation {
    name: "billboard",
    table: "billboards",
    foreign_key: "billboard_id",
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub store_id: Uuid,
    pub billboard_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Populated only when the query preloads [`BILLBOARD`].
    #[serde(skip)]
    pub billboard: Option<Billboard>,
}

impl Category {
    pub fn new(name: &str, store_id: Uuid, billboard_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            store_id,
            billboard_id,
            created_at: Utc::now(),
            updated_at: None,
            billboard: None,
        }
    }
}

impl Entity for Category {
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "store_id",
        "billboard_id",
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
            self.store_id.into(),
            self.billboard_id.into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Category {
            id: column(row, "id")?,
            name: column(row, "name")?,
            store_id: column(row, "store_id")?,
            billboard_id: column(row, "billboard_id")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
            billboard: None,
        })
    }

    fn attach(&mut self, relation: &Relation, related: serde_json::Value) -> Result<(), RepoError> {
        if *relation == BILLBOARD {
            self.billboard = Some(serde_json::from_value(related)?);
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(skip)]
    pub billboard_id: Uuid,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub billboard: Option<BillboardBasicResponse>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            created_at: category.created_at,
            billboard: category.billboard.as_ref().map(BillboardBasicResponse::from),
        }
    }
}
