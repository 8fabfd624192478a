//! Wire conversion traits and lenient field decoders
//!
//! SOAP leaves arrive typed by `xsi:type` when the server bothers to set it,
//! and as plain strings when it doesn't. The helpers here accept both.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::DespatchResult;

/// Serialize an entity into the carrier's request shape
pub trait ToWire: Serialize {
    fn to_wire(&self) -> DespatchResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Rebuild an entity from a decoded SOAP response
pub trait FromWire: DeserializeOwned {
    fn from_wire(value: Value) -> DespatchResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// `Option<i64>` from a number or a numeric string. Empty strings map to `None`.
pub(crate) fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(n)) => Ok(Some(n)),
        Some(Scalar::Float(f)) if f.fract() == 0.0 => Ok(Some(f as i64)),
        Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Scalar::Text(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
        Some(_) => Err(D::Error::custom("expected an integer")),
    }
}

/// `Option<f64>` from a number or a numeric string. Empty strings map to `None`.
pub(crate) fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(n)) => Ok(Some(n as f64)),
        Some(Scalar::Float(f)) => Ok(Some(f)),
        Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Scalar::Text(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
        Some(Scalar::Bool(_)) => Err(D::Error::custom("expected a number")),
    }
}

/// `Option<bool>` from a boolean, `"true"`/`"false"` or `"1"`/`"0"`.
pub(crate) fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Bool(b)) => Ok(Some(b)),
        Some(Scalar::Int(n)) => Ok(Some(n != 0)),
        Some(Scalar::Text(s)) => match s.trim() {
            "" => Ok(None),
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            other => Err(D::Error::custom(format!("invalid boolean: {}", other))),
        },
        Some(Scalar::Float(_)) => Err(D::Error::custom("expected a boolean")),
    }
}

/// `Option<String>` that also takes numbers (ids typed as `xsd:int`).
pub(crate) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => None,
        Some(Scalar::Int(n)) => Some(n.to_string()),
        Some(Scalar::Float(f)) => Some(f.to_string()),
        Some(Scalar::Bool(b)) => Some(b.to_string()),
        Some(Scalar::Text(s)) => Some(s),
    })
}

/// `Option<T>` for a nested struct. An empty element decodes as `""`, which
/// maps to `None` like a nil one.
pub(crate) fn opt_struct<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        value => serde_json::from_value(value).map(Some).map_err(D::Error::custom),
    }
}

/// `Vec<T>` from an array, a lone struct, or nothing at all.
pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
        .collect()
}
