//! The relayed message payload.

use serde::{Deserialize, Serialize};

use crate::errors::TransportError;

/// A single relayed message.
///
/// Wire form is a JSON object with one recognized field, `text`. Unknown
/// fields are ignored and a missing `text` decodes as an empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message body.
    #[serde(default)]
    pub text: String,
}

impl Message {
    /// Create a message from any string-like value.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Decode a message from its JSON wire form.
    pub fn from_json(raw: &str) -> Result<Self, TransportError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Decode a message from JSON bytes (binary frames).
    pub fn from_json_slice(raw: &[u8]) -> Result<Self, TransportError> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Encode this message to its JSON wire form.
    pub fn to_json(&self) -> Result<String, TransportError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self { text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_single_text_field() {
        let json = Message::new("hello").to_json().unwrap();
        assert_eq!(json, r#"{"text":"hello"}"#);
    }

    #[test]
    fn decodes_text_field() {
        let msg = Message::from_json(r#"{"text":"hi there"}"#).unwrap();
        assert_eq!(msg.text, "hi there");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let msg = Message::from_json(r#"{"text":"x","sender":"bob","seq":4}"#).unwrap();
        assert_eq!(msg, Message::new("x"));
    }

    #[test]
    fn missing_text_decodes_empty() {
        let msg = Message::from_json("{}").unwrap();
        assert!(msg.text.is_empty());
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = Message::from_json("not json").unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }

    #[test]
    fn non_object_is_malformed() {
        let err = Message::from_json("[1,2,3]").unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }

    #[test]
    fn wrong_text_type_is_malformed() {
        assert!(Message::from_json(r#"{"text":42}"#).is_err());
    }

    #[test]
    fn decodes_from_bytes() {
        let msg = Message::from_json_slice(br#"{"text":"bin"}"#).unwrap();
        assert_eq!(msg.text, "bin");
    }

    #[test]
    fn unicode_survives() {
        let original = Message::new("héllo 🌍");
        let back = Message::from_json(&original.to_json().unwrap()).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn from_owned_line() {
        let line = String::from("typed at the terminal");
        assert_eq!(Message::from(line).text, "typed at the terminal");
    }
}
