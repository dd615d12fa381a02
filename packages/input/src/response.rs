//! Turning collected responses into events and cursor updates.
//!
//! Final buckets are published; intermediate buckets only advance the
//! last-event snapshot. Failures here are event-scoped: a body that does
//! not decode, a split target that is missing, or a publisher rejection is
//! logged and skipped without touching sibling events or the cycle.

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cursor::{CursorEntry, TransformContext};
use crate::jsonpath::{LookupPath, PathError};
use crate::publisher::Publisher;

/// Compiled response-splitting configuration: a wildcard-free path to an
/// array whose elements become individual events.
#[derive(Debug, Clone)]
pub struct Split {
    target: LookupPath,
    raw: String,
}

impl Split {
    pub fn compile(target: &str) -> Result<Self, PathError> {
        Ok(Self {
            target: LookupPath::compile(target)?,
            raw: target.to_string(),
        })
    }

    /// The event list for one decoded document, or `None` when the target
    /// is missing or not an array (an event-scoped failure).
    fn events<'a>(&self, document: &'a Value) -> Option<&'a [Value]> {
        match self.target.get(document) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        }
    }
}

/// Decodes buckets into events, drives the publisher, and advances the
/// interval snapshots and cursor.
pub struct ResponseProcessor {
    cursor: Vec<CursorEntry>,
}

impl ResponseProcessor {
    pub fn new(cursor: Vec<CursorEntry>) -> Self {
        Self { cursor }
    }

    /// Processes the final bucket: decodes each body, publishes each event
    /// in order, and returns the published count.
    pub fn process_bodies<P: Publisher>(
        &self,
        bodies: &[Bytes],
        split: Option<&Split>,
        ctx: &mut TransformContext,
        publisher: &mut P,
    ) -> u64 {
        let mut published = 0;
        for body in bodies {
            let document: Value = match serde_json::from_slice(body) {
                Ok(document) => document,
                Err(err) => {
                    warn!(error = %err, "skipping response that did not decode as json");
                    continue;
                }
            };
            published += self.publish_document(&document, split, ctx, publisher);
        }
        published
    }

    /// Processes an intermediate bucket: events advance the last-event
    /// snapshot but are never handed to the publisher.
    pub fn track_documents(
        &self,
        documents: &[Value],
        split: Option<&Split>,
        ctx: &mut TransformContext,
    ) {
        for document in documents {
            for event in split_events(document, split) {
                if !event.is_object() {
                    warn!("skipping non-object event from intermediate response");
                    continue;
                }
                ctx.update_last_event(event);
            }
        }
    }

    fn publish_document<P: Publisher>(
        &self,
        document: &Value,
        split: Option<&Split>,
        ctx: &mut TransformContext,
        publisher: &mut P,
    ) -> u64 {
        let mut published = 0;
        for event in split_events(document, split) {
            if !event.is_object() {
                warn!("skipping non-object event");
                continue;
            }
            if let Err(err) = publisher.publish(event, ctx.cursor()) {
                warn!(error = %err, "failed to publish event");
                continue;
            }
            ctx.update_first_event(event);
            ctx.update_last_event(event);
            ctx.apply_cursor(&self.cursor);
            published += 1;
        }
        debug!(published, "processed response document");
        published
    }
}

/// Applies the split configuration to one decoded document. Without a
/// split the document itself is the single event.
fn split_events<'a>(document: &'a Value, split: Option<&Split>) -> Vec<&'a Value> {
    match split {
        None => vec![document],
        Some(split) => match split.events(document) {
            Some(items) => items.iter().collect(),
            None => {
                warn!(target_path = %split.raw, "split target missing or not an array");
                Vec::new()
            }
        },
    }
}
