//! The dot-separated path dialect used for id harvesting.
//!
//! This is deliberately not a JSONPath engine. The grammar is
//! `segment ('.' segment)*` where a segment is either an object key or the
//! array wildcard `#`, and evaluation produces the ordered string values the
//! path addresses. A `#` consumes the following segment as a projection key
//! applied to every array element; anything the projection yields that is
//! not a string is handled by recursing over the remaining segments.
//!
//! Expressions are compiled once at configuration time; syntax problems are
//! configuration errors, never runtime surprises.

mod evaluator;
mod parser;

pub use parser::{PathExpr, Segment};

use serde_json::Value;

/// Errors from compiling or evaluating a path expression.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// The expression itself is malformed (empty segment, trailing `#`, ...).
    #[error("invalid path expression: {0}")]
    Syntax(String),

    /// The input payload is not valid JSON.
    #[error("cannot decode input data: {0}")]
    Decode(#[from] serde_json::Error),

    /// The document's shape does not match the path (wrong type at a
    /// segment, or a missing key).
    #[error("path does not match document: {0}")]
    Miss(String),
}

/// A compiled wildcard-free path used for plain value lookups (cursor
/// entries, response splitting, transform value sources). Unlike
/// [`PathExpr`] evaluation, a miss here is an `Option`, not an error.
#[derive(Debug, Clone)]
pub struct LookupPath {
    segments: Vec<String>,
}

impl LookupPath {
    pub fn compile(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Syntax("empty lookup path".into()));
        }
        let mut segments = Vec::new();
        for segment in raw.split('.') {
            match segment {
                "" => {
                    return Err(PathError::Syntax(format!(
                        "empty segment in lookup path {raw:?}"
                    )))
                }
                "#" => {
                    return Err(PathError::Syntax(format!(
                        "wildcards are not allowed in lookup path {raw:?}"
                    )))
                }
                key => segments.push(key.to_string()),
            }
        }
        Ok(Self { segments })
    }

    /// Walks object keys down the document; `None` on any miss.
    pub fn get<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for segment in &self.segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}
