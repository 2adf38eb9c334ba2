//! Typed list response envelope.

use serde::{Deserialize, Deserializer};

/// A list response from the Catalog Store.
///
/// Some endpoints answer `{"data": [...]}`, others a bare array. Both parse
/// into this one type; call [`ListEnvelope::into_items`] to get the list.
/// A `{"data": null}` body is treated as an empty list; an object without a
/// `data` key is not a list response and fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged, bound(deserialize = "T: Deserialize<'de>"))]
pub enum ListEnvelope<T> {
    Wrapped {
        #[serde(deserialize_with = "nullable")]
        data: Option<Vec<T>>,
    },
    Bare(Vec<T>),
}

/// `data` must be present, but may be null.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::deserialize(deserializer)
}

impl<T> ListEnvelope<T> {
    /// Collapse the envelope into its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Wrapped { data } => data.unwrap_or_default(),
            Self::Bare(items) => items,
        }
    }
}
