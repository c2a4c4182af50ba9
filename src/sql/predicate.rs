//! Primary-key predicates: parameterized filter conditions identifying
//! records by key.

use crate::meta::{render_param, MetaValues};
use crate::resource::Resource;
use crate::sql::QueryDialect;

/// A parameterized SQL condition plus its positional parameter values.
/// An empty predicate means no key could be resolved from the input.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub clause: String,
    pub params: Vec<String>,
}

impl Predicate {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }
}

/// Build the predicate for a raw identifier string.
///
/// With multiple declared primary fields, a comma-separated value that
/// splits into exactly that many parts becomes a conjunction of per-field
/// equality clauses in declared order. Otherwise the first declared field
/// takes the whole value; with none declared, the dialect's auto-detected
/// primary column does. Empty input yields an empty predicate.
pub fn primary_key_predicate(
    resource: &Resource,
    dialect: &dyn QueryDialect,
    primary_value: &str,
) -> Predicate {
    if primary_value.is_empty() {
        return Predicate::empty();
    }
    let table = dialect.table_name(resource);

    if resource.primary_fields.len() > 1 {
        let parts: Vec<&str> = primary_value.split(',').collect();
        if parts.len() == resource.primary_fields.len() {
            let clause = resource
                .primary_fields
                .iter()
                .enumerate()
                .map(|(i, field)| {
                    format!(
                        "{}.{} = {}",
                        table,
                        dialect.quote(&field.column),
                        dialect.placeholder(i + 1, Some(field))
                    )
                })
                .collect::<Vec<_>>()
                .join(" AND ");
            return Predicate {
                clause,
                params: parts.iter().map(|p| p.to_string()).collect(),
            };
        }
    }

    if let Some(field) = resource.primary_fields.first() {
        return Predicate {
            clause: format!(
                "{}.{} = {}",
                table,
                dialect.quote(&field.column),
                dialect.placeholder(1, Some(field))
            ),
            params: vec![primary_value.to_string()],
        };
    }

    match dialect.auto_primary_column() {
        Some(column) => Predicate {
            clause: format!(
                "{}.{} = {}",
                table,
                dialect.quote(column),
                dialect.placeholder(1, None)
            ),
            params: vec![primary_value.to_string()],
        },
        None => Predicate::empty(),
    }
}

/// Build the predicate from submitted meta values: declared primary fields
/// present in the input, in declared order. Missing fields are silently
/// skipped.
pub fn primary_key_predicate_from_meta(
    resource: &Resource,
    dialect: &dyn QueryDialect,
    meta_values: &MetaValues,
) -> Predicate {
    let table = dialect.table_name(resource);
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    for field in &resource.primary_fields {
        if let Some(mv) = meta_values.get(&field.name) {
            clauses.push(format!(
                "{}.{} = {}",
                table,
                dialect.quote(&field.column),
                dialect.placeholder(clauses.len() + 1, Some(field))
            ));
            params.push(render_param(&mv.value));
        }
    }

    Predicate {
        clause: clauses.join(" AND "),
        params,
    }
}
