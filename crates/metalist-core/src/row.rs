//! Row addressing: stable row keys and the per-row context of a pass.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque primary key of a data row.
///
/// Keys are normalised to their textual form, so `1` and `"1"` address the
/// same row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(String);

impl RowKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Derives a key from a JSON value, e.g. the `id` column of a record.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(text) => Self(text.clone()),
            other => Self(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for RowKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<i64> for RowKey {
    fn from(raw: i64) -> Self {
        Self(raw.to_string())
    }
}

impl From<i32> for RowKey {
    fn from(raw: i32) -> Self {
        Self(raw.to_string())
    }
}

impl From<u64> for RowKey {
    fn from(raw: u64) -> Self {
        Self(raw.to_string())
    }
}

impl From<usize> for RowKey {
    fn from(raw: usize) -> Self {
        Self(raw.to_string())
    }
}

/// Where a row sits for the current pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowContext {
    /// Absolute index of the row across pages; this is `currentIndex`.
    pub row_index: usize,
    /// Position inside the rendered window.
    pub view_index: usize,
    /// Position of the record inside the `data` handed to the generator.
    pub data_index: usize,
    pub key: RowKey,
}

impl RowContext {
    pub fn new(row_index: usize, view_index: usize, data_index: usize, key: RowKey) -> Self {
        Self {
            row_index,
            view_index,
            data_index,
            key,
        }
    }
}
