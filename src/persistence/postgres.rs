use std::marker::PhantomData;

use async_trait::async_trait;
use deadpool_postgres::Pool;
use postgres_types::ToSql;
use tokio_postgres::Row;
use uuid::Uuid;

use super::{Direction, Entity, QueryOption, Relation, RepoError, Repository, Value};
use crate::models::pagination::{Page, Pagination};

/// A [`Repository`] backed by PostgreSQL.
pub struct PgRepository<T> {
    pool: Pool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> PgRepository<T> {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

/// The WHERE/ORDER/JOIN fragments compiled from a list of [`QueryOption`]s.
///
/// The owning table is always aliased `t`; each preloaded relation is joined
/// under its own name and selected back as a JSON object.
#[derive(Default)]
struct CompiledQuery {
    joins: Vec<String>,
    selects: Vec<String>,
    clauses: Vec<String>,
    order: Vec<String>,
    params: Vec<Value>,
    preloads: Vec<Relation>,
}

impl CompiledQuery {
    fn compile(options: &[QueryOption]) -> Self {
        let mut query = CompiledQuery::default();

        for option in options {
            match option {
                QueryOption::Eq(column, Value::Null) => {
                    query.clauses.push(format!("t.{column} IS NULL"));
                }
                QueryOption::Eq(column, value) => {
                    query.params.push(value.clone());
                    query
                        .clauses
                        .push(format!("t.{column} = ${}", query.params.len()));
                }
                QueryOption::Like(column, needle) => {
                    query.params.push(Value::Text(format!("%{needle}%")));
                    query
                        .clauses
                        .push(format!("t.{column} LIKE ${}", query.params.len()));
                }
                QueryOption::OrderBy(column, direction) => {
                    let dir = match direction {
                        Direction::Asc => "ASC",
                        Direction::Desc => "DESC",
                    };
                    query.order.push(format!("t.{column} {dir}"));
                }
                QueryOption::Preload(relation) => {
                    let Relation {
                        name,
                        table,
                        foreign_key,
                    } = relation;
                    query.joins.push(format!(
                        "LEFT JOIN {table} {name} ON {name}.id = t.{foreign_key}"
                    ));
                    query.selects.push(format!("to_jsonb({name}.*) AS {name}"));
                    query.preloads.push(*relation);
                }
            }
        }

        query
    }

    fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    fn select_sql(&self, table: &str) -> String {
        let mut sql = String::from("SELECT t.*");
        for select in &self.selects {
            sql.push_str(", ");
            sql.push_str(select);
        }
        sql.push_str(&format!(" FROM {table} t"));
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        sql.push_str(&self.where_sql());
        if !self.order.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.order.join(", ")));
        }
        sql
    }

    fn count_sql(&self, table: &str) -> String {
        format!("SELECT COUNT(*) FROM {table} t{}", self.where_sql())
    }

    fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect()
    }
}

fn hydrate<T: Entity>(row: &Row, preloads: &[Relation]) -> Result<T, RepoError> {
    let mut entity = T::from_row(row)?;
    for relation in preloads {
        let related: Option<serde_json::Value> = super::column(row, relation.name)?;
        if let Some(related) = related {
            entity.attach(relation, related)?;
        }
    }
    Ok(entity)
}

fn placeholders(range: std::ops::Range<usize>) -> String {
    range
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl<T: Entity> Repository<T> for PgRepository<T> {
    async fn create(&self, entity: &T) -> Result<(), RepoError> {
        let client = self.pool.get().await?;
        let values = entity.values();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::TABLE,
            T::COLUMNS.join(", "),
            placeholders(1..values.len() + 1),
        );
        let params: Vec<&(dyn ToSql + Sync)> =
            values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

        client.execute(sql.as_str(), &params).await?;
        tracing::debug!("📝 Inserted {} row {}", T::TABLE, entity.id());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<T, RepoError> {
        self.find_one(&[QueryOption::eq("id", id)]).await
    }

    async fn update(&self, entity: &T) -> Result<(), RepoError> {
        let client = self.pool.get().await?;
        let values = entity.values();
        let assignments = T::COLUMNS
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, column)| format!("{column} = ${}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {} SET {assignments} WHERE id = $1", T::TABLE);
        let params: Vec<&(dyn ToSql + Sync)> =
            values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

        let affected = client.execute(sql.as_str(), &params).await?;
        if affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let client = self.pool.get().await?;
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let affected = client.execute(sql.as_str(), &[&id]).await?;
        if affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn find_all(&self, options: &[QueryOption]) -> Result<Vec<T>, RepoError> {
        let client = self.pool.get().await?;
        let query = CompiledQuery::compile(options);
        let rows = client
            .query(query.select_sql(T::TABLE).as_str(), &query.params())
            .await?;

        rows.iter()
            .map(|row| hydrate(row, &query.preloads))
            .collect()
    }

    async fn find_one(&self, options: &[QueryOption]) -> Result<T, RepoError> {
        let client = self.pool.get().await?;
        let query = CompiledQuery::compile(options);
        let sql = format!("{} LIMIT 1", query.select_sql(T::TABLE));
        let row = client
            .query_opt(sql.as_str(), &query.params())
            .await?
            .ok_or(RepoError::NotFound)?;

        hydrate(&row, &query.preloads)
    }

    async fn paginate(
        &self,
        pagination: Pagination,
        options: &[QueryOption],
    ) -> Result<Page<T>, RepoError> {
        let client = self.pool.get().await?;
        let query = CompiledQuery::compile(options);

        let total: i64 = client
            .query_one(query.count_sql(T::TABLE).as_str(), &query.params())
            .await?
            .try_get(0)?;

        let sql = format!(
            "{} LIMIT {} OFFSET {}",
            query.select_sql(T::TABLE),
            pagination.limit,
            pagination.offset()
        );
        let rows = client.query(sql.as_str(), &query.params()).await?;
        let data = rows
            .iter()
            .map(|row| hydrate(row, &query.preloads))
            .collect::<Result<Vec<T>, RepoError>>()?;

        Ok(Page::new(data, total, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_filters_ordering_and_preloads() {
        let relation = Relation {
            name: "billboard",
            table: "billboards",
            foreign_key: "billboard_id",
        };
        let query = CompiledQuery::compile(&[
            QueryOption::eq("store_id", Uuid::nil()),
            QueryOption::like("name", "shoe"),
            QueryOption::Preload(relation),
            QueryOption::newest_first(),
        ]);

        assert_eq!(
            query.select_sql("categories"),
            "SELECT t.*, to_jsonb(billboard.*) AS billboard FROM categories t \
             LEFT JOIN billboards billboard ON billboard.id = t.billboard_id \
             WHERE t.store_id = $1 AND t.name LIKE $2 ORDER BY t.created_at DESC"
        );
        assert_eq!(
            query.count_sql("categories"),
            "SELECT COUNT(*) FROM categories t WHERE t.store_id = $1 AND t.name LIKE $2"
        );
        assert_eq!(query.params[1], Value::Text("%shoe%".to_string()));
    }

    #[test]
    fn null_equality_becomes_is_null() {
        let query = CompiledQuery::compile(&[QueryOption::eq("image_url", Value::Null)]);
        assert_eq!(query.where_sql(), " WHERE t.image_url IS NULL");
        assert!(query.params.is_empty());
    }
}
