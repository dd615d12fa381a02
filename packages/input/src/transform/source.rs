//! Value sources for `append` and `set` transforms.

use serde_json::Value;

use crate::cursor::TransformContext;
use crate::error::{InputError, Result};
use crate::jsonpath::LookupPath;

/// Where a transform's value comes from. Parsed from configuration: the
/// prefixes `cursor.`, `first_event.`, and `last_event.` address interval
/// state, the keyword `now` is the build-time timestamp, and anything else
/// is a literal.
#[derive(Debug, Clone)]
pub enum ValueSource {
    Literal(String),
    Cursor(String),
    FirstEvent(LookupPath),
    LastEvent(LookupPath),
    Now,
}

impl ValueSource {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw == "now" {
            return Ok(ValueSource::Now);
        }
        if let Some(key) = raw.strip_prefix("cursor.") {
            if key.is_empty() {
                return Err(InputError::Config(format!(
                    "value source {raw:?} names no cursor key"
                )));
            }
            return Ok(ValueSource::Cursor(key.to_string()));
        }
        if let Some(path) = raw.strip_prefix("first_event.") {
            return Ok(ValueSource::FirstEvent(compile_lookup(raw, path)?));
        }
        if let Some(path) = raw.strip_prefix("last_event.") {
            return Ok(ValueSource::LastEvent(compile_lookup(raw, path)?));
        }
        Ok(ValueSource::Literal(raw.to_string()))
    }

    /// Resolves against the execution context. Missing interval state
    /// resolves to an empty string rather than failing the build.
    pub fn resolve(&self, ctx: &TransformContext) -> String {
        match self {
            ValueSource::Literal(text) => text.clone(),
            ValueSource::Cursor(key) => ctx.cursor_value(key).map(render).unwrap_or_default(),
            ValueSource::FirstEvent(path) => ctx
                .first_event()
                .and_then(|event| path.get(event))
                .map(render)
                .unwrap_or_default(),
            ValueSource::LastEvent(path) => ctx
                .last_event()
                .and_then(|event| path.get(event))
                .map(render)
                .unwrap_or_default(),
            ValueSource::Now => chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn compile_lookup(raw: &str, path: &str) -> Result<LookupPath> {
    LookupPath::compile(path)
        .map_err(|err| InputError::Config(format!("value source {raw:?}: {err}")))
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn literals_pass_through() {
        let ctx = TransformContext::new();
        let source = ValueSource::parse("plain text").expect("valid source");
        assert_eq!(source.resolve(&ctx), "plain text");
    }

    #[test]
    fn cursor_and_event_lookups_read_the_context() {
        let mut ctx = TransformContext::with_cursor(
            [("page".to_string(), json!(3))].into_iter().collect(),
        );
        ctx.update_last_event(&json!({"id": "9", "nested": {"k": "v"}}));

        let cursor = ValueSource::parse("cursor.page").expect("valid source");
        assert_eq!(cursor.resolve(&ctx), "3");

        let last = ValueSource::parse("last_event.nested.k").expect("valid source");
        assert_eq!(last.resolve(&ctx), "v");
    }

    #[test]
    fn missing_state_resolves_to_empty() {
        let ctx = TransformContext::new();
        let source = ValueSource::parse("last_event.id").expect("valid source");
        assert_eq!(source.resolve(&ctx), "");
    }

    #[test]
    fn invalid_lookup_paths_are_config_errors() {
        assert!(ValueSource::parse("last_event.a.#.b").is_err());
        assert!(ValueSource::parse("cursor.").is_err());
    }
}
