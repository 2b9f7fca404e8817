use std::cmp::Ordering;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as Json;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Direction, Entity, QueryOption, Relation, RepoError, Repository};
use crate::models::pagination::{Page, Pagination};

/// In-process tables of serialized rows, shared by every [`MemoryRepository`]
/// created from it so relations can be preloaded across tables.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<RwLock<HashMap<&'static str, Vec<Json>>>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repository<T: Entity>(&self) -> MemoryRepository<T> {
        MemoryRepository {
            db: self.clone(),
            _entity: PhantomData,
        }
    }

    /// Number of rows currently stored in `table`.
    pub async fn count(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

/// A [`Repository`] over a [`MemoryDatabase`].
pub struct MemoryRepository<T> {
    db: MemoryDatabase,
    _entity: PhantomData<fn() -> T>,
}

fn id_of(row: &Json) -> Option<&str> {
    row.get("id").and_then(Json::as_str)
}

fn as_timestamp(value: &Json) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn compare(a: &Json, b: &Json) -> Ordering {
    match (a, b) {
        (Json::Null, Json::Null) => Ordering::Equal,
        (Json::Null, _) => Ordering::Less,
        (_, Json::Null) => Ordering::Greater,
        (Json::Number(x), Json::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Json::Bool(x), Json::Bool(y)) => x.cmp(y),
        (Json::String(x), Json::String(y)) => match (as_timestamp(a), as_timestamp(b)) {
            (Some(ta), Some(tb)) => ta.cmp(&tb),
            _ => x.cmp(y),
        },
        _ => Ordering::Equal,
    }
}

/// The first unique key of `T` that `row` shares with another row of `table`.
fn unique_violation<T: Entity>(table: &[Json], row: &Json) -> Option<String> {
    let id = id_of(row);
    T::UNIQUE_KEYS.iter().find_map(|key| {
        let values: Vec<&Json> = key
            .iter()
            .map(|column| row.get(*column).unwrap_or(&Json::Null))
            .collect();
        if values.iter().any(|value| value.is_null()) {
            return None;
        }

        let taken = table.iter().any(|other| {
            id_of(other) != id
                && key
                    .iter()
                    .zip(&values)
                    .all(|(column, value)| other.get(*column) == Some(*value))
        });
        taken.then(|| format!("{}.({})", T::TABLE, key.join(", ")))
    })
}

fn matches(row: &Json, options: &[QueryOption]) -> bool {
    options.iter().all(|option| match option {
        QueryOption::Eq(column, value) => {
            let expected = value.to_json();
            let actual = row.get(*column).unwrap_or(&Json::Null);
            match (actual, &expected) {
                (Json::String(_), Json::String(_)) => {
                    match (as_timestamp(actual), as_timestamp(&expected)) {
                        (Some(a), Some(b)) => a == b,
                        _ => *actual == expected,
                    }
                }
                _ => *actual == expected,
            }
        }
        QueryOption::Like(column, needle) => row
            .get(*column)
            .and_then(Json::as_str)
            .is_some_and(|s| s.contains(needle.as_str())),
        QueryOption::OrderBy(..) | QueryOption::Preload(_) => true,
    })
}

fn sort(rows: &mut [Json], options: &[QueryOption]) {
    let orderings: Vec<(&str, Direction)> = options
        .iter()
        .filter_map(|option| match option {
            QueryOption::OrderBy(column, direction) => Some((*column, *direction)),
            _ => None,
        })
        .collect();

    if orderings.is_empty() {
        return;
    }

    rows.sort_by(|a, b| {
        for (column, direction) in &orderings {
            let ordering = compare(
                a.get(*column).unwrap_or(&Json::Null),
                b.get(*column).unwrap_or(&Json::Null),
            );
            let ordering = match direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

impl<T: Entity> MemoryRepository<T> {
    async fn select(&self, options: &[QueryOption]) -> Vec<Json> {
        let tables = self.db.tables.read().await;
        let mut rows: Vec<Json> = tables
            .get(T::TABLE)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches(row, options))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sort(&mut rows, options);
        rows
    }

    async fn hydrate(&self, rows: Vec<Json>, options: &[QueryOption]) -> Result<Vec<T>, RepoError> {
        let relations: Vec<Relation> = options
            .iter()
            .filter_map(|option| match option {
                QueryOption::Preload(relation) => Some(*relation),
                _ => None,
            })
            .collect();

        let tables = self.db.tables.read().await;
        let mut entities = Vec::with_capacity(rows.len());

        for row in rows {
            let mut entity: T = serde_json::from_value(row.clone())?;
            for relation in &relations {
                let foreign_id = row.get(relation.foreign_key).and_then(Json::as_str);
                let related = tables.get(relation.table).and_then(|related_rows| {
                    related_rows
                        .iter()
                        .find(|r| foreign_id.is_some() && id_of(r) == foreign_id)
                });
                if let Some(related) = related {
                    entity.attach(relation, related.clone())?;
                }
            }
            entities.push(entity);
        }

        Ok(entities)
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn create(&self, entity: &T) -> Result<(), RepoError> {
        let row = serde_json::to_value(entity)?;
        let id = entity.id().to_string();
        let mut tables = self.db.tables.write().await;
        let table = tables.entry(T::TABLE).or_default();

        if table.iter().any(|r| id_of(r) == Some(id.as_str())) {
            return Err(RepoError::Conflict(format!("{}.id {}", T::TABLE, id)));
        }
        if let Some(key) = unique_violation::<T>(table, &row) {
            return Err(RepoError::Conflict(key));
        }

        table.push(row);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<T, RepoError> {
        self.find_one(&[QueryOption::eq("id", id)]).await
    }

    async fn update(&self, entity: &T) -> Result<(), RepoError> {
        let row = serde_json::to_value(entity)?;
        let id = entity.id().to_string();
        let mut tables = self.db.tables.write().await;
        let table = tables.get_mut(T::TABLE).ok_or(RepoError::NotFound)?;
        if !table.iter().any(|r| id_of(r) == Some(id.as_str())) {
            return Err(RepoError::NotFound);
        }
        if let Some(key) = unique_violation::<T>(table, &row) {
            return Err(RepoError::Conflict(key));
        }

        if let Some(slot) = table.iter_mut().find(|r| id_of(r) == Some(id.as_str())) {
            *slot = row;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let id = id.to_string();
        let mut tables = self.db.tables.write().await;
        let table = tables.get_mut(T::TABLE).ok_or(RepoError::NotFound)?;
        let before = table.len();
        table.retain(|r| id_of(r) != Some(id.as_str()));

        if table.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn find_all(&self, options: &[QueryOption]) -> Result<Vec<T>, RepoError> {
        let rows = self.select(options).await;
        self.hydrate(rows, options).await
    }

    async fn find_one(&self, options: &[QueryOption]) -> Result<T, RepoError> {
        let mut rows = self.select(options).await;
        rows.truncate(1);
        self.hydrate(rows, options)
            .await?
            .into_iter()
            .next()
            .ok_or(RepoError::NotFound)
    }

    async fn paginate(
        &self,
        pagination: Pagination,
        options: &[QueryOption],
    ) -> Result<Page<T>, RepoError> {
        let rows = self.select(options).await;
        let total = rows.len() as i64;
        let window: Vec<Json> = rows
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .collect();

        let data = self.hydrate(window, options).await?;
        Ok(Page::new(data, total, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::billboard::Billboard;
    use crate::models::category::{BILLBOARD, Category};
    use crate::models::color::Color;
    use crate::models::user::User;

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let db = MemoryDatabase::new();
        let repo = db.repository::<Billboard>();

        assert!(matches!(
            repo.find_by_id(Uuid::new_v4()).await,
            Err(RepoError::NotFound)
        ));
        assert!(matches!(
            repo.delete(Uuid::new_v4()).await,
            Err(RepoError::NotFound)
        ));
        let ghost = Billboard::new("ghost", Uuid::new_v4(), None);
        assert!(matches!(repo.update(&ghost).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn duplicate_ids_conflict() {
        let db = MemoryDatabase::new();
        let repo = db.repository::<Billboard>();
        let billboard = Billboard::new("hero", Uuid::new_v4(), None);

        repo.create(&billboard).await.unwrap();
        assert!(matches!(
            repo.create(&billboard).await,
            Err(RepoError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn filters_order_and_paginate() {
        let db = MemoryDatabase::new();
        let repo = db.repository::<Billboard>();
        let store = Uuid::new_v4();

        for label in ["summer", "winter", "summer nights"] {
            repo.create(&Billboard::new(label, store, None)).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        repo.create(&Billboard::new("summer", Uuid::new_v4(), None))
            .await
            .unwrap();

        let page = repo
            .paginate(
                Pagination { page: 1, limit: 1 },
                &[
                    QueryOption::eq("store_id", store),
                    QueryOption::like("label", "summer"),
                    QueryOption::newest_first(),
                ],
            )
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].label, "summer nights");
    }

    #[tokio::test]
    async fn preload_attaches_related_row() {
        let db = MemoryDatabase::new();
        let store = Uuid::new_v4();
        let billboard = Billboard::new("hero", store, Some("https://img/1".to_string()));
        db.repository::<Billboard>().create(&billboard).await.unwrap();

        let categories = db.repository::<Category>();
        let category = Category::new("shoes", store, billboard.id);
        categories.create(&category).await.unwrap();

        let plain = categories.find_by_id(category.id).await.unwrap();
        assert!(plain.billboard.is_none());

        let loaded = categories
            .find_one(&[
                QueryOption::eq("id", category.id),
                QueryOption::Preload(BILLBOARD),
            ])
            .await
            .unwrap();
        assert_eq!(loaded.billboard.unwrap().label, "hero");
    }

    #[tokio::test]
    async fn unique_keys_are_enforced_on_insert() {
        let db = MemoryDatabase::new();
        let users = db.repository::<User>();

        users.create(&User::new("Ana", "ana@example.com")).await.unwrap();
        assert!(matches!(
            users.create(&User::new("Other Ana", "ana@example.com")).await,
            Err(RepoError::Conflict(_))
        ));
        assert_eq!(db.count("users").await, 1);
    }

    #[tokio::test]
    async fn color_hex_is_unique_per_store() {
        let db = MemoryDatabase::new();
        let colors = db.repository::<Color>();
        let store = Uuid::new_v4();

        colors.create(&Color::new("Black", "#000", store)).await.unwrap();
        colors
            .create(&Color::new("Black", "#000", Uuid::new_v4()))
            .await
            .unwrap();
        assert!(matches!(
            colors.create(&Color::new("Jet", "#000", store)).await,
            Err(RepoError::Conflict(_))
        ));

        let mut white = Color::new("White", "#fff", store);
        colors.create(&white).await.unwrap();
        white.hex = "#000".to_string();
        assert!(matches!(
            colors.update(&white).await,
            Err(RepoError::Conflict(_))
        ));

        // a row may keep its own key on update
        white.hex = "#fff".to_string();
        white.name = "Snow".to_string();
        colors.update(&white).await.unwrap();
    }
}
