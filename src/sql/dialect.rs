//! Query-builder capability interface: the narrow slice of store metadata
//! the predicate builder depends on.

use crate::resource::{PrimaryField, Resource};
use serde_json::Value;

/// What a backing store must expose for predicate building: identifier
/// quoting, table naming, positional placeholders, primary-key detection,
/// and the unset-key test. Keeping this narrow keeps the predicate logic
/// independent of any one database client.
pub trait QueryDialect: Send + Sync {
    /// Quote a single identifier.
    fn quote(&self, ident: &str) -> String;

    /// Quoted, schema-qualified table reference for a resource.
    fn table_name(&self, resource: &Resource) -> String;

    /// Positional placeholder, 1-based. When the field declares a type name,
    /// the placeholder carries a cast so string parameters bind correctly.
    fn placeholder(&self, position: usize, field: Option<&PrimaryField>) -> String;

    /// Column assumed primary when a resource declares no primary fields.
    fn auto_primary_column(&self) -> Option<&str>;

    /// True when every primary-key slot of the record is unset.
    fn primary_key_zero(&self, resource: &Resource, record: &Value) -> bool {
        let Value::Object(obj) = record else {
            return true;
        };
        let mut columns: Vec<&str> = resource
            .primary_fields
            .iter()
            .map(|f| f.column.as_str())
            .collect();
        if columns.is_empty() {
            match self.auto_primary_column() {
                Some(col) => columns.push(col),
                None => return true,
            }
        }
        columns
            .iter()
            .all(|col| obj.get(*col).map(value_is_zero).unwrap_or(true))
    }
}

/// Unset for key purposes: null, empty string, zero number, nil UUID.
fn value_is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            s.is_empty()
                || uuid::Uuid::parse_str(s)
                    .map(|u| u.is_nil())
                    .unwrap_or(false)
        }
        Value::Number(n) => n.as_i64() == Some(0) || n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// PostgreSQL dialect: `"ident"` quoting, `$n` placeholders, `id` as the
/// auto-detected primary column.
#[derive(Debug, Default, Clone, Copy)]
pub struct PgDialect;

impl QueryDialect for PgDialect {
    fn quote(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn table_name(&self, resource: &Resource) -> String {
        format!(
            "{}.{}",
            self.quote(&resource.schema_name),
            self.quote(&resource.table_name)
        )
    }

    fn placeholder(&self, position: usize, field: Option<&PrimaryField>) -> String {
        match field.and_then(|f| f.pg_type.as_deref()) {
            Some(pg_type) => format!("${}::{}", position, pg_type),
            None => format!("${}", position),
        }
    }

    fn auto_primary_column(&self) -> Option<&str> {
        Some("id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource() -> Resource {
        Resource::new("books", "books")
            .primary_field(PrimaryField::new("id", "id"))
    }

    #[test]
    fn quote_doubles_embedded_quotes() {
        assert_eq!(PgDialect.quote("plain"), "\"plain\"");
        assert_eq!(PgDialect.quote("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn table_name_is_schema_qualified() {
        let res = Resource::new("books", "books").schema("library");
        assert_eq!(PgDialect.table_name(&res), "\"library\".\"books\"");
    }

    #[test]
    fn placeholder_casts_when_field_declares_a_type() {
        let field = PrimaryField::new("id", "id").pg_type("int8");
        assert_eq!(PgDialect.placeholder(2, Some(&field)), "$2::int8");
        assert_eq!(PgDialect.placeholder(2, None), "$2");
    }

    #[test]
    fn primary_key_zero_on_unset_values() {
        let res = resource();
        for record in [
            json!({}),
            json!({"id": null}),
            json!({"id": ""}),
            json!({"id": 0}),
            json!({"id": "00000000-0000-0000-0000-000000000000"}),
        ] {
            assert!(
                PgDialect.primary_key_zero(&res, &record),
                "expected zero key for {record}"
            );
        }
        assert!(!PgDialect.primary_key_zero(&res, &json!({"id": 7})));
        assert!(!PgDialect.primary_key_zero(&res, &json!({"id": "abc"})));
    }

    #[test]
    fn composite_key_is_zero_only_when_all_parts_are() {
        let res = Resource::new("order_items", "order_items")
            .primary_field(PrimaryField::new("order_id", "order_id"))
            .primary_field(PrimaryField::new("item_id", "item_id"));
        assert!(PgDialect.primary_key_zero(&res, &json!({"order_id": 0, "item_id": null})));
        assert!(!PgDialect.primary_key_zero(&res, &json!({"order_id": 1, "item_id": null})));
    }
}
