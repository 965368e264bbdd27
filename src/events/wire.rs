//! NDJSON wire format for turn events.
//!
//! One JSON-encoded event per line. Decoding is tolerant of event kinds
//! added after this build: an unrecognized `type` yields `Ok(None)`, so an
//! old reader skips what it cannot understand instead of failing the
//! stream. A known kind with a malformed payload is still an error.

use serde_json::Value;
use thiserror::Error;

use super::event::{EventKind, TurnEvent};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("invalid event json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("event line has no 'type' field")]
    MissingType,
}

/// Encode one event as a single NDJSON line, without the trailing newline.
pub fn encode(event: &TurnEvent) -> Result<String, WireError> {
    Ok(serde_json::to_string(event)?)
}

/// Decode one NDJSON line.
///
/// Returns `Ok(None)` for blank lines and for events of an unknown kind.
pub fn decode(line: &str) -> Result<Option<TurnEvent>, WireError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(line)?;
    let tag = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(WireError::MissingType)?;

    // Gate on the kind first so unknown tags skip instead of erroring.
    if serde_json::from_value::<EventKind>(Value::String(tag.to_string())).is_err() {
        return Ok(None);
    }

    Ok(Some(serde_json::from_value(value)?))
}
