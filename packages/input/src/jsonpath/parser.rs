//! Compilation of raw dot-separated expressions into segment lists.

use serde_json::Value;

use super::evaluator;
use super::PathError;

/// One element of a compiled path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A literal object key.
    Key(String),
    /// The array wildcard `#`; always followed by the projection key it
    /// consumes.
    Wildcard,
}

/// A compiled path expression.
///
/// Compilation validates the narrow grammar up front so that evaluation can
/// only fail on document shape, not on the expression itself.
#[derive(Debug, Clone)]
pub struct PathExpr {
    raw: String,
    segments: Vec<Segment>,
}

impl PathExpr {
    pub fn compile(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Syntax("empty path expression".into()));
        }
        let mut segments = Vec::new();
        for piece in raw.split('.') {
            match piece {
                "" => {
                    return Err(PathError::Syntax(format!(
                        "empty segment in path expression {raw:?}"
                    )))
                }
                "#" => segments.push(Segment::Wildcard),
                key => segments.push(Segment::Key(key.to_string())),
            }
        }
        // every '#' consumes the following segment as its projection key
        for (index, segment) in segments.iter().enumerate() {
            if *segment == Segment::Wildcard {
                match segments.get(index + 1) {
                    Some(Segment::Key(_)) => {}
                    Some(Segment::Wildcard) => {
                        return Err(PathError::Syntax(format!(
                            "'#' must be followed by a projection key in {raw:?}"
                        )))
                    }
                    None => {
                        return Err(PathError::Syntax(format!(
                            "path expression {raw:?} ends with '#'"
                        )))
                    }
                }
            }
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Decodes `payload` as JSON and collects the string values this
    /// expression addresses, in document order.
    pub fn evaluate(&self, payload: &[u8]) -> Result<Vec<String>, PathError> {
        let document: Value = serde_json::from_slice(payload)?;
        self.evaluate_value(&document)
    }

    /// Same as [`evaluate`](Self::evaluate) over an already-parsed document.
    pub fn evaluate_value(&self, document: &Value) -> Result<Vec<String>, PathError> {
        let mut values = Vec::new();
        evaluator::walk(document, self.segments(), &mut values)?;
        Ok(values)
    }
}
