//! Body encoders.
//!
//! Encoders are resolved at configuration time and injected into the
//! request factory; there is no process-wide registry. When a step does not
//! pin one with `encode_as`, the factory picks by the resolved
//! `Content-Type` after transforms ran.

use bytes::Bytes;
use serde_json::Value;

use crate::error::{InputError, Result};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Serializes the transformed body for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoder {
    Json,
    Form,
}

impl Encoder {
    /// Resolves an `encode_as` configuration value.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "json" => Ok(Encoder::Json),
            "form" => Ok(Encoder::Form),
            other => Err(InputError::Config(format!(
                "unknown encoder {other:?} (expected \"json\" or \"form\")"
            ))),
        }
    }

    /// Default encoder keyed off the resolved `Content-Type`.
    pub fn for_content_type(content_type: &str) -> Self {
        if content_type.starts_with(CONTENT_TYPE_FORM) {
            Encoder::Form
        } else {
            Encoder::Json
        }
    }

    pub fn encode(&self, body: &Value) -> Result<Bytes> {
        match self {
            Encoder::Json => serde_json::to_vec(body)
                .map(Bytes::from)
                .map_err(|err| InputError::Build(format!("cannot encode json body: {err}"))),
            Encoder::Form => serde_urlencoded::to_string(body)
                .map(|encoded| Bytes::from(encoded.into_bytes()))
                .map_err(|err| InputError::Build(format!("cannot encode form body: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_is_the_default_for_unknown_content_types() {
        assert_eq!(Encoder::for_content_type("text/plain"), Encoder::Json);
        assert_eq!(Encoder::for_content_type(CONTENT_TYPE_JSON), Encoder::Json);
        assert_eq!(
            Encoder::for_content_type("application/x-www-form-urlencoded; charset=utf-8"),
            Encoder::Form
        );
    }

    #[test]
    fn form_encoding_flattens_a_scalar_object() {
        let body = json!({"page": "2", "q": "error"});
        let encoded = Encoder::Form.encode(&body).expect("encodable body");
        let text = String::from_utf8(encoded.to_vec()).expect("utf8");
        assert!(text.contains("page=2"), "encoded was {text}");
        assert!(text.contains("q=error"), "encoded was {text}");
    }

    #[test]
    fn unknown_encoder_names_are_config_errors() {
        assert!(Encoder::from_name("xml").is_err());
    }
}
