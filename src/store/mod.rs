//! Store abstraction: the database operations the CRUD handlers delegate to.

mod postgres;

pub use postgres::PgStore;

use crate::error::AdminError;
use crate::resource::Resource;
use crate::sql::{Predicate, QueryDialect};
use async_trait::async_trait;
use serde_json::Value;

/// The database access the handlers need, and nothing more. Rows travel as
/// JSON objects. Blocking, retries, and timeouts are the implementation's
/// business; errors pass through unchanged.
#[async_trait]
pub trait Store: Send + Sync {
    /// The dialect used for predicate building against this store.
    fn dialect(&self) -> &dyn QueryDialect;

    /// Fetch the single row matching a primary-key predicate. Zero rows is
    /// a not-found error.
    async fn fetch_one(
        &self,
        resource: &Resource,
        predicate: &Predicate,
    ) -> Result<Value, AdminError>;

    /// Fetch every row, ordered by primary key descending.
    async fn fetch_all(&self, resource: &Resource) -> Result<Vec<Value>, AdminError>;

    /// Count all rows.
    async fn count(&self, resource: &Resource) -> Result<u64, AdminError>;

    /// Upsert one record: insert when its key is unset, update otherwise.
    /// Returns the persisted row.
    async fn save(&self, resource: &Resource, record: &Value) -> Result<Value, AdminError>;

    /// Delete rows matching a primary-key predicate. Returns the number of
    /// rows removed.
    async fn delete(&self, resource: &Resource, predicate: &Predicate)
        -> Result<u64, AdminError>;
}
