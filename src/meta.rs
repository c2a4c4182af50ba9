//! Meta values: the field/value pairs of one incoming write request.

use serde_json::{Map, Value};

/// Control pseudo-field marking a nested record for deletion.
pub const DESTROY_FIELD: &str = "_destroy";

#[derive(Debug, Clone)]
pub struct MetaValue {
    pub name: String,
    pub value: Value,
}

/// Ordered field/value pairs from one submission (form body, nested record).
/// Lookup is by field name; order is submission order.
#[derive(Debug, Default, Clone)]
pub struct MetaValues {
    values: Vec<MetaValue>,
}

impl MetaValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object, keeping the object's key order.
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        let values = obj
            .iter()
            .map(|(name, value)| MetaValue {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();
        Self { values }
    }

    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.values.push(MetaValue {
            name: name.into(),
            value,
        });
    }

    pub fn get(&self, name: &str) -> Option<&MetaValue> {
        self.values.iter().find(|mv| mv.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when a `_destroy` marker is present with any value other than "0".
    pub fn destroy_requested(&self) -> bool {
        self.get(DESTROY_FIELD)
            .map(|mv| render_param(&mv.value) != "0")
            .unwrap_or(false)
    }
}

/// Render a JSON value as a plain string for use as a positional SQL
/// parameter: strings unquoted, null empty, everything else via Display.
pub fn render_param(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
