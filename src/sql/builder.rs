//! Assembles parameterized statements from resource metadata. Identifiers
//! come from resource configuration only; values are always bound.

use crate::resource::Resource;
use crate::sql::{Predicate, QueryDialect};
use serde_json::{Map, Value};

/// One statement ready for execution: SQL text plus bind values in
/// placeholder order.
#[derive(Debug, Clone)]
pub struct SqlQuery {
    pub sql: String,
    pub binds: Vec<Value>,
}

impl SqlQuery {
    fn new(sql: String, binds: Vec<Value>) -> Self {
        SqlQuery { sql, binds }
    }
}

fn predicate_binds(predicate: &Predicate) -> Vec<Value> {
    predicate
        .params
        .iter()
        .map(|p| Value::String(p.clone()))
        .collect()
}

/// Columns that order a full listing: declared primary fields, or the
/// dialect's auto-detected primary column.
fn order_columns(resource: &Resource, dialect: &dyn QueryDialect) -> Vec<String> {
    if resource.primary_fields.is_empty() {
        return dialect
            .auto_primary_column()
            .map(|c| vec![dialect.quote(c)])
            .unwrap_or_default();
    }
    resource
        .primary_fields
        .iter()
        .map(|f| dialect.quote(&f.column))
        .collect()
}

/// Single-row fetch filtered by a primary-key predicate.
pub fn select_one(
    resource: &Resource,
    dialect: &dyn QueryDialect,
    predicate: &Predicate,
) -> SqlQuery {
    let sql = format!(
        "SELECT * FROM {} WHERE {} LIMIT 1",
        dialect.table_name(resource),
        predicate.clause
    );
    SqlQuery::new(sql, predicate_binds(predicate))
}

/// Full listing, ordered by primary key descending.
pub fn select_all(resource: &Resource, dialect: &dyn QueryDialect) -> SqlQuery {
    let table = dialect.table_name(resource);
    let order = order_columns(resource, dialect);
    let sql = if order.is_empty() {
        format!("SELECT * FROM {}", table)
    } else {
        let order = order
            .iter()
            .map(|c| format!("{} DESC", c))
            .collect::<Vec<_>>()
            .join(", ");
        format!("SELECT * FROM {} ORDER BY {}", table, order)
    };
    SqlQuery::new(sql, Vec::new())
}

/// Row count for the whole resource.
pub fn count(resource: &Resource, dialect: &dyn QueryDialect) -> SqlQuery {
    SqlQuery::new(
        format!("SELECT COUNT(*) FROM {}", dialect.table_name(resource)),
        Vec::new(),
    )
}

/// Upsert one record.
///
/// With `include_pk` false (unset key) the primary columns are omitted so
/// the database assigns them. With `include_pk` true the statement is an
/// INSERT .. ON CONFLICT on the primary columns that updates every other
/// submitted column. Returns the persisted row.
pub fn upsert(
    resource: &Resource,
    dialect: &dyn QueryDialect,
    record: &Map<String, Value>,
    include_pk: bool,
) -> SqlQuery {
    let table = dialect.table_name(resource);
    let pk_columns: Vec<&str> = resource
        .primary_fields
        .iter()
        .map(|f| f.column.as_str())
        .collect();
    let pk_columns: Vec<&str> = if pk_columns.is_empty() {
        dialect.auto_primary_column().into_iter().collect()
    } else {
        pk_columns
    };

    let mut columns = Vec::new();
    let mut placeholders = Vec::new();
    let mut binds = Vec::new();
    for (name, value) in record {
        let is_pk = pk_columns.contains(&name.as_str());
        if is_pk && !include_pk {
            continue;
        }
        binds.push(value.clone());
        let field = resource.primary_fields.iter().find(|f| f.column == *name);
        columns.push(dialect.quote(name));
        placeholders.push(dialect.placeholder(binds.len(), field));
    }

    let sql = if include_pk && !pk_columns.is_empty() {
        let conflict = pk_columns
            .iter()
            .map(|c| dialect.quote(c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sets: Vec<String> = record
            .keys()
            .filter(|k| !pk_columns.contains(&k.as_str()))
            .map(|k| format!("{} = EXCLUDED.{}", dialect.quote(k), dialect.quote(k)))
            .collect();
        if sets.is_empty() {
            // No-op assignment so RETURNING still yields the row on conflict.
            let pk = dialect.quote(pk_columns[0]);
            sets.push(format!("{} = EXCLUDED.{}", pk, pk));
        }
        format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {} RETURNING *",
            table,
            columns.join(", "),
            placeholders.join(", "),
            conflict,
            sets.join(", ")
        )
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            table,
            columns.join(", "),
            placeholders.join(", ")
        )
    };
    SqlQuery::new(sql, binds)
}

/// Delete rows matching a primary-key predicate.
pub fn delete(
    resource: &Resource,
    dialect: &dyn QueryDialect,
    predicate: &Predicate,
) -> SqlQuery {
    let sql = format!(
        "DELETE FROM {} WHERE {}",
        dialect.table_name(resource),
        predicate.clause
    );
    SqlQuery::new(sql, predicate_binds(predicate))
}
