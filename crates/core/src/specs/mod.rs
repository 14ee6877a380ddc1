//! Category-specific technical specifications.
//!
//! Each of the twelve known category kinds stores its specs in its own table
//! with its own columns. [`registry`] holds the static schema for every kind
//! together with an explicit record type; records flatten into the uniform
//! [`Specs`] map that the rest of the system works with.

pub mod registry;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio_rusqlite::rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use tokio_rusqlite::rusqlite;

pub use registry::{SpecKind, SpecRecord};

/// Normalized specs: camelCase attribute name to value.
pub type Specs = BTreeMap<String, SpecValue>;

/// A single spec attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum SpecValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SpecValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SpecValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SpecValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for SpecValue {
    fn from(s: &str) -> Self {
        SpecValue::Text(s.to_string())
    }
}

impl From<String> for SpecValue {
    fn from(s: String) -> Self {
        SpecValue::Text(s)
    }
}

impl From<i64> for SpecValue {
    fn from(v: i64) -> Self {
        SpecValue::Integer(v)
    }
}

impl From<f64> for SpecValue {
    fn from(v: f64) -> Self {
        SpecValue::Real(v)
    }
}

impl<T: Into<SpecValue>> From<Option<T>> for SpecValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SpecValue::Null, Into::into)
    }
}

impl FromSql for SpecValue {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => SpecValue::Null,
            ValueRef::Integer(i) => SpecValue::Integer(i),
            ValueRef::Real(f) => SpecValue::Real(f),
            ValueRef::Text(t) => SpecValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => SpecValue::Text(String::from_utf8_lossy(b).into_owned()),
        })
    }
}

impl ToSql for SpecValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(match self {
            SpecValue::Null => ValueRef::Null,
            SpecValue::Integer(i) => ValueRef::Integer(*i),
            SpecValue::Real(f) => ValueRef::Real(*f),
            SpecValue::Text(s) => ValueRef::Text(s.as_bytes()),
        }))
    }
}

/// Convert a snake_case identifier to camelCase.
///
/// The first segment is kept as is; every later segment has its first
/// character upper-cased. Empty segments (from doubled or trailing
/// underscores) contribute nothing.
pub fn to_camel_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    for (i, segment) in ident.split('_').enumerate() {
        if i == 0 {
            out.push_str(segment);
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
