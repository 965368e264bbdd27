//! The typed session bag.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::SessionError;

/// String-keyed JSON state owned by a conversation and carried across turns.
///
/// Values round-trip in two shapes: the raw [`Value`] stored under a key, or
/// a typed reconstruction of it via serde. Both views carry the same data.
/// Keys a turn does not touch are returned exactly as they came in —
/// `SessionState` never normalizes or reorders entries it did not write
/// (object key order is preserved by the underlying map).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState {
    entries: Map<String, Value>,
}

impl SessionState {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing map, e.g. one deserialized from a protocol payload.
    #[must_use]
    pub fn from_map(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    /// Raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Typed reconstruction of the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent and `Err` when the stored
    /// value does not fit the requested type.
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| SessionError::decode(key, e.to_string())),
        }
    }

    /// Store a raw JSON value under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Serialize `value` and store it under `key`.
    pub fn set_typed<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> Result<(), SessionError> {
        let key = key.into();
        let value =
            serde_json::to_value(value).map_err(|e| SessionError::encode(&key, e.to_string()))?;
        self.entries.insert(key, value);
        Ok(())
    }

    /// Remove and return the value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// Consume the session into its underlying map.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.entries
    }
}

impl From<Map<String, Value>> for SessionState {
    fn from(entries: Map<String, Value>) -> Self {
        Self::from_map(entries)
    }
}
