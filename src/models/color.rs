use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::persistence::{Entity, RepoError, Value, column};
use crate::validation::catalog::hex_color;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Color {
    pub id: Uuid,
    pub name: String,
    /// `#RGB` or `#RRGGBB`, unique within a store.
    pub hex: String,
    pub store_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Color {
    pub fn new(name: &str, hex: &str, store_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            hex: hex.trim().to_string(),
            store_id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

impl Entity for Color {
    const TABLE: &'static str = "colors";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "hex", "store_id", "created_at", "updated_at"];
    const UNIQUE_KEYS: &'static [&'static [&'static str]] = &[&["store_id", "hex"]];

    fn id(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.name.clone().into(),
            self.hex.clone().into(),
            self.store_id.into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, RepoError> {
        Ok(Color {
            id: column(row, "id")?,
            name: column(row, "name")?,
            hex: column(row, "hex")?,
            store_id: column(row, "store_id")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

#[derive(Deserialize, Debug, Validate)]
pub struct ColorPayload {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(custom(hex_color))]
    pub hex: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ColorResponse {
    pub id: Uuid,
    pub name: String,
    pub hex: String,
    pub created_at: DateTime<Utc>,
}

impl From<Color> for ColorResponse {
    fn from(color: Color) -> Self {
        Self {
            id: color.id,
            name: color.name,
            hex: color.hex,
            created_at: color.created_at,
        }
    }
}
