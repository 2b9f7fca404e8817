//! Generic persistence layer.
//!
//! Every entity is stored through the same [`Repository`] contract. Two
//! backends implement it: [`PgRepository`] on top of a deadpool-postgres pool
//! and [`MemoryRepository`] on top of a shared in-process [`MemoryDatabase`].

use async_trait::async_trait;
use bytes::BytesMut;
use chrono::{DateTime, Utc};
use postgres_types::{IsNull, ToSql, Type, to_sql_checked};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio_postgres::Row;
use tokio_postgres::error::SqlState;
use uuid::Uuid;

use crate::models::pagination::{Page, Pagination};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryDatabase, MemoryRepository};
pub use postgres::PgRepository;

/// Errors raised by a repository backend.
#[derive(Error, Debug)]
pub enum RepoError {
    /// No row matched the lookup.
    #[error("record not found")]
    NotFound,

    /// A unique constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("database error: {0}")]
    Database(tokio_postgres::Error),

    /// A column expected by the entity was absent or had the wrong type.
    #[error("missing data: {0}")]
    MissingData(String),

    #[error("row encoding error: {0}")]
    Encoding(String),
}

impl From<tokio_postgres::Error> for RepoError {
    fn from(e: tokio_postgres::Error) -> Self {
        match e.code() {
            Some(code) if *code == SqlState::UNIQUE_VIOLATION => {
                let detail = e
                    .as_db_error()
                    .map(|db| db.message().to_string())
                    .unwrap_or_else(|| e.to_string());
                RepoError::Conflict(detail)
            }
            _ => RepoError::Database(e),
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(e: serde_json::Error) -> Self {
        RepoError::Encoding(e.to_string())
    }
}

/// A dynamically typed column value used for filters and writes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// The value as it appears in a serialized entity row.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Int(v) => serde_json::Value::from(*v),
            Value::Text(v) => serde_json::Value::String(v.clone()),
            Value::Uuid(v) => serde_json::Value::String(v.to_string()),
            Value::Timestamp(v) => serde_json::to_value(v).unwrap_or(serde_json::Value::Null),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => v.to_sql_checked(ty, out),
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => v.to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Sort direction for [`QueryOption::OrderBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// A to-one relation that can be eagerly loaded next to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Name the related row is attached under.
    pub name: &'static str,
    /// Table holding the related rows.
    pub table: &'static str,
    /// Column on the owning entity pointing at the related row's id.
    pub foreign_key: &'static str,
}

/// A composable query option: filters, ordering and eager loading.
#[derive(Debug, Clone)]
pub enum QueryOption {
    Eq(&'static str, Value),
    /// Substring match (`LIKE %needle%`).
    Like(&'static str, String),
    OrderBy(&'static str, Direction),
    Preload(Relation),
}

impl QueryOption {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        QueryOption::Eq(column, value.into())
    }

    pub fn like(column: &'static str, needle: impl Into<String>) -> Self {
        QueryOption::Like(column, needle.into())
    }

    pub fn newest_first() -> Self {
        QueryOption::OrderBy("created_at", Direction::Desc)
    }

    pub fn oldest_first() -> Self {
        QueryOption::OrderBy("created_at", Direction::Asc)
    }
}

/// A persisted record.
///
/// `COLUMNS` starts with `id`, and `values` yields one value per column in the
/// same order. Serde field names match column names so the memory backend can
/// filter on serialized rows.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    /// Column sets that must be unique across the table, mirroring the
    /// UNIQUE constraints of the schema.
    const UNIQUE_KEYS: &'static [&'static [&'static str]] = &[];

    fn id(&self) -> Uuid;

    fn values(&self) -> Vec<Value>;

    fn from_row(row: &Row) -> Result<Self, RepoError>;

    /// Attaches an eagerly loaded related row.
    fn attach(&mut self, relation: &Relation, related: serde_json::Value) -> Result<(), RepoError> {
        let _ = (relation, related);
        Ok(())
    }
}

/// Reads a column from a row, reporting the column name when it is missing.
pub(crate) fn column<'a, T>(row: &'a Row, name: &str) -> Result<T, RepoError>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(name)
        .map_err(|_| RepoError::MissingData(name.to_string()))
}

/// The CRUD + pagination contract shared by every entity.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn create(&self, entity: &T) -> Result<(), RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<T, RepoError>;

    async fn update(&self, entity: &T) -> Result<(), RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    async fn find_all(&self, options: &[QueryOption]) -> Result<Vec<T>, RepoError>;

    async fn find_one(&self, options: &[QueryOption]) -> Result<T, RepoError>;

    async fn paginate(
        &self,
        pagination: Pagination,
        options: &[QueryOption],
    ) -> Result<Page<T>, RepoError>;
}

/// Turns the `NotFound` signal into an `Option` for callers that treat
/// absence as a normal outcome.
pub trait Optional<T> {
    fn optional(self) -> Result<Option<T>, RepoError>;
}

impl<T> Optional<T> for Result<T, RepoError> {
    fn optional(self) -> Result<Option<T>, RepoError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(RepoError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
