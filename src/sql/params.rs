//! Convert JSON values into types sqlx can bind to PostgreSQL.

use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// One bind value for a PostgreSQL statement, inferred from JSON: numbers
/// bind as integers or floats, strings that parse as UUIDs bind as their
/// canonical text, arrays and objects bind as JSON.
#[derive(Clone, Debug)]
pub enum PgBind {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
    Uuid(uuid::Uuid),
    Json(Value),
}

impl PgBind {
    pub fn from_value(v: &Value) -> Self {
        match v {
            Value::Null => PgBind::Null,
            Value::Bool(b) => PgBind::Bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => PgBind::I64(i),
                (None, Some(f)) => PgBind::F64(f),
                (None, None) => PgBind::Null,
            },
            Value::String(s) => match uuid::Uuid::parse_str(s) {
                Ok(u) => PgBind::Uuid(u),
                Err(_) => PgBind::Text(s.clone()),
            },
            Value::Array(_) | Value::Object(_) => PgBind::Json(v.clone()),
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBind {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBind::Null => <Option<i32> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            PgBind::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            PgBind::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBind::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBind::Text(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
            PgBind::Uuid(u) => {
                let text = u.to_string();
                <&str as Encode<Postgres>>::encode_by_ref(&text.as_str(), buf)?
            }
            PgBind::Json(v) => <Value as Encode<Postgres>>::encode_by_ref(v, buf)?,
        })
    }
}

impl sqlx::Type<Postgres> for PgBind {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}
