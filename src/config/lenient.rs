//! Forgiving field decoders for hand-edited JSON.
//!
//! Event configs are edited by hand and by tools that do not agree on number formatting, so
//! scalar fields accept integers, floats and numeric strings. A value that cannot be read as the
//! wanted type decodes to `None`, which makes the consumer fall back to its documented default.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn value_as_i32(v: &Value) -> Option<i32> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .and_then(|i| i32::try_from(i).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        Value::Bool(b) => Some(i32::from(*b)),
        _ => None,
    }
}

pub(crate) fn value_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

pub(crate) fn value_as_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => Some(!s.is_empty()),
        Value::Array(a) => Some(!a.is_empty()),
        Value::Object(o) => Some(!o.is_empty()),
    }
}

pub(crate) fn value_as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn opt_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_i32(&Value::deserialize(deserializer)?))
}

pub(crate) fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_f64(&Value::deserialize(deserializer)?))
}

pub(crate) fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_bool(&Value::deserialize(deserializer)?))
}

pub(crate) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_string(&Value::deserialize(deserializer)?))
}

/// Keep only object entries of a list, decoded as `T`; anything else is skipped.
///
/// An empty list reads as absent. A non-empty list without any object decodes to `Some(vec![])`.
pub(crate) fn opt_object_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    if items.is_empty() {
        return Ok(None);
    }
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if !item.is_object() {
            continue;
        }
        out.push(serde_json::from_value(item).map_err(serde::de::Error::custom)?);
    }
    Ok(Some(out))
}

#[cfg(test)]
#[path = "../../tests/unit/config/lenient.rs"]
mod tests;
