//! Realtime frame envelope and codec.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taleweave_core::error::EventError;

/// A named realtime event: `{ "event": "<name>", "data": <json> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event name.
    pub event: String,
    /// Event payload. Absent payloads decode as `null`.
    #[serde(default)]
    pub data: Value,
}

impl EventEnvelope {
    /// Creates an envelope.
    #[must_use]
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Deserializes the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns `EventError::MalformedPayload` if the payload does not match `T`.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, EventError> {
        T::deserialize(&self.data).map_err(|e| EventError::malformed(&self.event, e.to_string()))
    }
}

/// Encodes and decodes envelopes carried in text frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCodec;

impl MessageCodec {
    /// Creates a new message codec.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Encodes an envelope to frame text.
    ///
    /// # Errors
    ///
    /// Returns `EventError::InvalidFrame` if serialization fails.
    pub fn encode(&self, envelope: &EventEnvelope) -> Result<String, EventError> {
        serde_json::to_string(envelope).map_err(|e| EventError::InvalidFrame {
            reason: format!("Failed to serialize envelope: {e}"),
        })
    }

    /// Decodes frame text into an envelope.
    ///
    /// # Errors
    ///
    /// Returns `EventError::InvalidFrame` if the text is not an envelope or the
    /// event name is empty.
    pub fn decode(&self, text: &str) -> Result<EventEnvelope, EventError> {
        let envelope: EventEnvelope =
            serde_json::from_str(text).map_err(|e| EventError::InvalidFrame {
                reason: e.to_string(),
            })?;
        if envelope.event.trim().is_empty() {
            return Err(EventError::InvalidFrame {
                reason: "empty event name".to_string(),
            });
        }
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Progress {
        story_id: String,
        progress: u8,
    }

    #[test]
    fn test_codec_encodes_envelope_shape() {
        let codec = MessageCodec::new();
        let text = codec
            .encode(&EventEnvelope::new("identify", json!({"userId": "u1"})))
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"event": "identify", "data": {"userId": "u1"}}));
    }

    #[test]
    fn test_codec_decodes_missing_data_as_null() {
        let envelope = MessageCodec::new()
            .decode(r#"{"event":"presence-update"}"#)
            .unwrap();
        assert_eq!(envelope.event, "presence-update");
        assert_eq!(envelope.data, Value::Null);
    }

    #[test]
    fn test_codec_rejects_non_envelopes() {
        let codec = MessageCodec::new();
        assert!(matches!(
            codec.decode("not json"),
            Err(EventError::InvalidFrame { .. })
        ));
        assert!(codec.decode(r#"{"data": 1}"#).is_err());
        assert!(codec.decode(r#"{"event": " ", "data": 1}"#).is_err());
        assert!(codec.decode("[1,2]").is_err());
    }

    #[test]
    fn test_payload_typed_access() {
        let envelope = EventEnvelope::new(
            "story:progress",
            json!({"story_id": "s1", "progress": 40}),
        );
        let progress: Progress = envelope.payload().unwrap();
        assert_eq!(progress.progress, 40);

        let bad = EventEnvelope::new("story:progress", json!({"progress": "lots"}));
        let err = bad.payload::<Progress>().unwrap_err();
        assert_eq!(err.event(), Some("story:progress"));
    }
}
