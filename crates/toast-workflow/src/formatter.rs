//! Media-type formatting for outbound payloads and inbound envelopes.

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("content is empty")]
    Empty,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializes payloads and deserializes response envelopes for one media type.
///
/// Works on [`serde_json::Value`] so the trait stays object-safe; typed
/// conversion happens in the workflow.
pub trait MediaFormatter: Send + Sync {
    fn media_type(&self) -> &str;
    fn encode(&self, value: &Value) -> Result<Vec<u8>, FormatError>;
    fn decode(&self, bytes: &[u8]) -> Result<Value, FormatError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl MediaFormatter for JsonFormatter {
    fn media_type(&self) -> &str {
        "application/json"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, FormatError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, FormatError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(FormatError::Empty);
        }
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_content_is_distinguished() {
        assert!(matches!(JsonFormatter.decode(b"  \n"), Err(FormatError::Empty)));
        assert!(matches!(JsonFormatter.decode(b"{ nope"), Err(FormatError::Json(_))));
    }

    #[test]
    fn encodes_compact_json() {
        let bytes = JsonFormatter
            .encode(&json!({ "body": "hi", "sendNo": "15990000" }))
            .unwrap();
        let back = JsonFormatter.decode(&bytes).unwrap();
        assert_eq!(back["sendNo"], "15990000");
    }
}
