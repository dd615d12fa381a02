//! Cursor state threaded between poll cycles.
//!
//! The cursor map itself is opaque to the engine: entries are filled from
//! configured lookups into the last seen event and handed to the publisher,
//! which owns durable persistence. The first/last event snapshots are
//! interval-relative scratch state, cleared at the start of every cycle and
//! readable by request transforms while the cycle runs.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::jsonpath::LookupPath;

/// Opaque key/value checkpoint handed to the publisher with every event.
pub type CursorMap = BTreeMap<String, Value>;

/// One configured cursor entry: `name` is refreshed from a wildcard-free
/// lookup into the last event after each published event.
#[derive(Debug, Clone)]
pub struct CursorEntry {
    pub name: String,
    pub path: LookupPath,
}

/// Execution context shared by transforms and the response processor.
#[derive(Debug, Default)]
pub struct TransformContext {
    cursor: CursorMap,
    first_event: Option<Value>,
    last_event: Option<Value>,
}

impl TransformContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a cursor persisted by the host after an earlier run.
    pub fn with_cursor(cursor: CursorMap) -> Self {
        Self {
            cursor,
            first_event: None,
            last_event: None,
        }
    }

    /// Drops the interval-relative snapshots at the start of a cycle. The
    /// cursor map survives; it is the cross-cycle checkpoint.
    pub fn clear_interval_data(&mut self) {
        self.first_event = None;
        self.last_event = None;
    }

    pub fn cursor(&self) -> &CursorMap {
        &self.cursor
    }

    pub fn cursor_value(&self, key: &str) -> Option<&Value> {
        self.cursor.get(key)
    }

    pub fn first_event(&self) -> Option<&Value> {
        self.first_event.as_ref()
    }

    pub fn last_event(&self) -> Option<&Value> {
        self.last_event.as_ref()
    }

    /// Set at most once per cycle, on the first successfully published
    /// event; [`clear_interval_data`](Self::clear_interval_data) re-arms it.
    pub fn update_first_event(&mut self, event: &Value) {
        if self.first_event.is_none() {
            self.first_event = Some(event.clone());
        }
    }

    /// Overwritten on every successfully decoded event, including events
    /// from intermediate (unpublished) buckets.
    pub fn update_last_event(&mut self, event: &Value) {
        self.last_event = Some(event.clone());
    }

    /// Refresh configured cursor entries from the last event. Entries whose
    /// lookup misses are left untouched.
    pub fn apply_cursor(&mut self, entries: &[CursorEntry]) {
        let Some(last) = self.last_event.as_ref() else {
            return;
        };
        for entry in entries {
            if let Some(value) = entry.path.get(last) {
                self.cursor.insert(entry.name.clone(), value.clone());
            }
        }
    }
}
