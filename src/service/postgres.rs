//! [`RecordRepository`] over a PostgreSQL pool.

use crate::error::AppError;
use crate::model::Model;
use crate::service::repository::{ListQuery, Page, RecordRepository};
use crate::sql::{count, delete, insert, select_by_id, select_list, update, QueryBuf};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        PgRepository { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn query_many(&self, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(q).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn query_optional(&self, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(q).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }
}

fn bind_all(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

#[async_trait]
impl RecordRepository for PgRepository {
    async fn list(&self, model: &Model, query: &ListQuery) -> Result<Page, AppError> {
        let count_q = count(model, query.predicate.as_ref())?;
        tracing::debug!(sql = %count_q.sql, params = ?count_q.params, "query");
        let mut total_query = sqlx::query_scalar::<_, i64>(&count_q.sql);
        for p in &count_q.params {
            total_query = total_query.bind(p.clone());
        }
        let total = total_query.fetch_one(&self.pool).await?;

        let list_q = select_list(model, query.predicate.as_ref(), &query.order, query.limit, query.offset)?;
        let rows = self.query_many(&list_q).await?;
        Ok(Page {
            rows,
            total: total.max(0) as u64,
        })
    }

    async fn get_by_id(&self, model: &Model, id: &str) -> Result<Option<Value>, AppError> {
        self.query_optional(&select_by_id(model, id)?).await
    }

    async fn create(&self, model: &Model, body: &Map<String, Value>) -> Result<Value, AppError> {
        self.query_optional(&insert(model, body)?)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn update(&self, model: &Model, id: &str, body: &Map<String, Value>) -> Result<Option<Value>, AppError> {
        self.query_optional(&update(model, id, body)?).await
    }

    async fn delete(&self, model: &Model, id: &str) -> Result<bool, AppError> {
        Ok(self.query_optional(&delete(model, id)?).await?.is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

fn row_to_json(row: &PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

/// Decode a cell by trying the types a CRUD table commonly holds. Unknown types become null.
fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::from(n);
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::from(n);
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::from(n);
    }
    if let Ok(Some(n)) = row.try_get::<Option<f32>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n as f64) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
