//! Wire shapes for Catalog Store payloads.
//!
//! The Catalog Store is loose about shapes: references are either bare IDs or
//! populated documents, flags are booleans or `"1"`/`"0"`, and counters may be
//! strings. Everything here collapses those variants so the public types in
//! [`super::catalog`] only ever hold one canonical shape.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// A reference to another entity, bare or populated.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRef {
    Id(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl RawRef {
    pub fn into_parts(self) -> (String, Option<String>) {
        match self {
            Self::Id(id) => (id, None),
            Self::Populated { id, name } => (id, name),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseInt {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Deserialize `true`, `1`, `"1"`, `"true"` (any case) as `true`; null or
/// absent as `false`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LooseFlag>::deserialize(deserializer)?;
    Ok(match raw {
        Some(LooseFlag::Bool(b)) => b,
        Some(LooseFlag::Int(n)) => n != 0,
        Some(LooseFlag::Text(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        None => false,
    })
}

/// Deserialize a string that may be null as an empty string.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Deserialize an optional non-negative integer from a number or numeric
/// string. Empty strings, negatives and garbage become `None`.
pub fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LooseInt>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        LooseInt::Int(n) => u32::try_from(n).ok(),
        LooseInt::Float(f) => float_to_u32(f),
        LooseInt::Text(s) => s.trim().parse::<u32>().ok(),
    }))
}

/// Like [`opt_u32`] but defaulting to zero.
pub fn u32_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    opt_u32(deserializer).map(Option::unwrap_or_default)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_u32(f: f64) -> Option<u32> {
    (f.is_finite() && f >= 0.0 && f <= f64::from(u32::MAX) && f.fract() == 0.0).then(|| f as u32)
}

/// Deserialize a weight label that may be a number or a string.
pub fn opt_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty()))
}

/// Deserialize an optional decimal amount from a number or numeric string.
/// Empty strings and unparsable values become `None`.
pub fn opt_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let text = match raw {
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::String(s)) => s.trim().to_owned(),
        _ => return Ok(None),
    };
    Ok(Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok())
}
