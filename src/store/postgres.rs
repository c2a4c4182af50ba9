//! PostgreSQL store: executes built statements against a sqlx pool and
//! decodes rows to JSON objects.

use crate::error::AdminError;
use crate::resource::Resource;
use crate::sql::{self, PgBind, PgDialect, Predicate, QueryDialect, SqlQuery};
use crate::store::Store;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    dialect: PgDialect,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore {
            pool,
            dialect: PgDialect,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Cheap liveness probe for readiness endpoints.
    pub async fn ping(&self) -> Result<(), AdminError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn prepared<'a>(&self, q: &'a SqlQuery) -> sqlx::query::Query<'a, sqlx::Postgres, PgArguments> {
        tracing::debug!(sql = %q.sql, binds = ?q.binds, "query");
        let mut query = sqlx::query(&q.sql);
        for bind in &q.binds {
            query = query.bind(PgBind::from_value(bind));
        }
        query
    }
}

#[async_trait]
impl Store for PgStore {
    fn dialect(&self) -> &dyn QueryDialect {
        &self.dialect
    }

    async fn fetch_one(
        &self,
        resource: &Resource,
        predicate: &Predicate,
    ) -> Result<Value, AdminError> {
        let q = sql::select_one(resource, &self.dialect, predicate);
        let row = self.prepared(&q).fetch_optional(&self.pool).await?;
        row.map(|r| row_to_json(&r))
            .ok_or_else(|| AdminError::NotFound(resource.name.clone()))
    }

    async fn fetch_all(&self, resource: &Resource) -> Result<Vec<Value>, AdminError> {
        let q = sql::select_all(resource, &self.dialect);
        let rows = self.prepared(&q).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn count(&self, resource: &Resource) -> Result<u64, AdminError> {
        use sqlx::Row;
        let q = sql::count(resource, &self.dialect);
        let row = self.prepared(&q).fetch_one(&self.pool).await?;
        let total: i64 = row.try_get(0)?;
        Ok(total.max(0) as u64)
    }

    async fn save(&self, resource: &Resource, record: &Value) -> Result<Value, AdminError> {
        let Value::Object(map) = record else {
            return Err(AdminError::BadRequest("record must be a JSON object".into()));
        };
        let include_pk = !self.dialect.primary_key_zero(resource, record);
        let q = sql::upsert(resource, &self.dialect, map, include_pk);
        let row = self.prepared(&q).fetch_optional(&self.pool).await?;
        row.map(|r| row_to_json(&r))
            .ok_or_else(|| AdminError::NotFound(resource.name.clone()))
    }

    async fn delete(
        &self,
        resource: &Resource,
        predicate: &Predicate,
    ) -> Result<u64, AdminError> {
        // An empty predicate would drop every row in the table.
        if predicate.is_empty() {
            return Err(AdminError::BadRequest(
                "refusing to delete without a primary-key predicate".into(),
            ));
        }
        let q = sql::delete(resource, &self.dialect, predicate);
        let result = self.prepared(&q).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

fn row_to_json(row: &PgRow) -> Value {
    use sqlx::{Column, Row};
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        map.insert(col.name().to_string(), cell_to_value(row, col.name()));
    }
    Value::Object(map)
}

/// Decode one cell by probing the common PostgreSQL types in order.
fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    macro_rules! probe {
        ($ty:ty, $v:ident => $into:expr) => {
            if let Ok(Some($v)) = row.try_get::<Option<$ty>, _>(name) {
                return $into;
            }
        };
    }
    probe!(i16, n => Value::Number(n.into()));
    probe!(i32, n => Value::Number(n.into()));
    probe!(i64, n => Value::Number(n.into()));
    probe!(f32, n => float_value(f64::from(n)));
    probe!(f64, n => float_value(n));
    probe!(bool, b => Value::Bool(b));
    probe!(uuid::Uuid, u => Value::String(u.to_string()));
    probe!(chrono::DateTime<chrono::Utc>, d => Value::String(d.to_rfc3339()));
    probe!(chrono::NaiveDateTime, d => Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string()));
    probe!(chrono::NaiveDate, d => Value::String(d.format("%Y-%m-%d").to_string()));
    probe!(String, s => Value::String(s));
    probe!(Value, j => j);
    Value::Null
}

fn float_value(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
