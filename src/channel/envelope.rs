//! Wire format for events crossing an execution-context boundary.
//!
//! Only plain data crosses: an event name and a list of JSON arguments.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum length for raw frames in logs.
const MAX_RAW_LOG_PREVIEW: usize = 200;

/// Truncated preview of a raw frame for logging.
pub fn log_preview(raw: &str) -> &str {
    if raw.len() <= MAX_RAW_LOG_PREVIEW {
        return raw;
    }
    let mut end = MAX_RAW_LOG_PREVIEW;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    &raw[..end]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Envelope {
    pub fn new(event: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            event: event.into(),
            args,
        }
    }
}

/// Result of parsing a frame received from the peer.
#[derive(Debug)]
pub enum EnvelopeParse {
    Ok(Envelope),
    /// Valid JSON without a string `event` field
    MissingEvent { raw: String },
    /// Known shape but wrong field types
    InvalidPayload {
        event: String,
        error: String,
        raw: String,
    },
    /// Not JSON at all
    ParseError(serde_json::Error),
}

/// Classify a frame instead of failing on the first malformed one.
pub fn parse_envelope_graceful(frame: &str) -> EnvelopeParse {
    let preview = log_preview(frame);
    let value: Value = match serde_json::from_str(frame) {
        Ok(v) => v,
        Err(e) => return EnvelopeParse::ParseError(e),
    };

    let event = match value.get("event").and_then(|e| e.as_str()) {
        Some(e) => e.to_string(),
        None => {
            return EnvelopeParse::MissingEvent {
                raw: preview.to_string(),
            }
        }
    };

    match serde_json::from_value::<Envelope>(value) {
        Ok(envelope) => EnvelopeParse::Ok(envelope),
        Err(e) => EnvelopeParse::InvalidPayload {
            event,
            error: e.to_string(),
            raw: preview.to_string(),
        },
    }
}
