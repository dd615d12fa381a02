//! The downstream event sink consumed by the response processor.

use serde_json::Value;

use crate::cursor::CursorMap;

/// Error returned by a publisher for a single rejected event.
///
/// Rejections are event-scoped: the processor logs them and moves on to the
/// next event in the bucket.
#[derive(Debug, thiserror::Error)]
#[error("publisher rejected event: {0}")]
pub struct PublishError(pub String);

impl PublishError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Host-owned event sink.
///
/// Called once per successfully decoded event in the final bucket, in
/// emission order, together with the cursor state current *before* the
/// event's own cursor advancement.
pub trait Publisher {
    fn publish(&mut self, event: &Value, cursor: &CursorMap) -> Result<(), PublishError>;
}
