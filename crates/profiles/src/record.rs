//! Raw profile records as supplied by callers.
//!
//! A record is a loose attribute-name → value mapping. It only becomes a
//! `Profile` after `parser::parse_profile` has validated it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ProfileError, Result};

/// Attribute name → JSON value mapping for one person.
///
/// ```ignore
/// let record = ProfileRecord::new()
///     .with("age", 27)
///     .with("gender", "female")
///     .with("hobbies", vec!["reading", "art"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileRecord {
    fields: Map<String, Value>,
}

impl ProfileRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (builder pattern).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Set a field in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Remove a field, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Get a field. JSON `null` is treated as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a record from a JSON object string.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ProfileError::NotAnObject(e.to_string()))?;
        Self::try_from(value)
    }
}

impl TryFrom<Value> for ProfileRecord {
    type Error = ProfileError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ProfileError::NotAnObject(other.to_string())),
        }
    }
}

impl From<Map<String, Value>> for ProfileRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
