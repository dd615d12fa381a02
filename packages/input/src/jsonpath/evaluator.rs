//! Recursive evaluation of compiled path expressions.
//!
//! The walk is an exhaustive match over the parsed document, never an
//! untyped cast. A wildcard segment always terminates the outer walk: the
//! segments after its projection key are handled only through recursion on
//! each projected value.

use serde_json::Value;

use super::parser::Segment;
use super::PathError;

pub(super) fn walk(
    document: &Value,
    segments: &[Segment],
    values: &mut Vec<String>,
) -> Result<(), PathError> {
    let mut current = document;
    for (index, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Key(key) => {
                let object = match current {
                    Value::Object(object) => object,
                    other => {
                        return Err(PathError::Miss(format!(
                            "expected an object at {key:?}, found {}",
                            type_name(other)
                        )))
                    }
                };
                let Some(next) = object.get(key) else {
                    return Err(PathError::Miss(format!("key {key:?} not found")));
                };
                if index + 1 == segments.len() {
                    if let Value::String(value) = next {
                        values.push(value.clone());
                    }
                }
                current = next;
            }
            Segment::Wildcard => {
                let items = match current {
                    Value::Array(items) => items,
                    other => {
                        return Err(PathError::Miss(format!(
                            "expected an array at '#', found {}",
                            type_name(other)
                        )))
                    }
                };
                let projection = match segments.get(index + 1) {
                    Some(Segment::Key(key)) => key,
                    _ => {
                        return Err(PathError::Syntax(
                            "'#' must be followed by a projection key".into(),
                        ))
                    }
                };
                let rest = &segments[index + 2..];
                for item in items {
                    let object = match item {
                        Value::Object(object) => object,
                        other => {
                            return Err(PathError::Miss(format!(
                                "expected array elements to be objects, found {}",
                                type_name(other)
                            )))
                        }
                    };
                    let Some(projected) = object.get(projection) else {
                        return Err(PathError::Miss(format!(
                            "key {projection:?} not found in array element"
                        )));
                    };
                    match projected {
                        Value::String(value) => values.push(value.clone()),
                        other if rest.is_empty() => {
                            return Err(PathError::Miss(format!(
                                "projection {projection:?} yielded {} with no remaining path",
                                type_name(other)
                            )))
                        }
                        other => walk(other, rest, values)?,
                    }
                }
                // the wildcard delegated everything after it to recursion
                return Ok(());
            }
        }
    }
    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::super::PathExpr;
    use super::*;

    fn eval(payload: &str, path: &str) -> Result<Vec<String>, PathError> {
        PathExpr::compile(path)
            .expect("valid expression")
            .evaluate(payload.as_bytes())
    }

    #[test]
    fn plain_keys_resolve_to_a_single_string() {
        let values = eval(r#"{"a":{"b":"b_value"}}"#, "a.b").expect("match");
        assert_eq!(values, ["b_value"]);
    }

    #[test]
    fn wildcard_projects_across_the_array_in_order() {
        let values = eval(
            r#"{"a":[{"b":"b_value_1"},{"b":"b_value_2"},{"b":"b_value_3"}]}"#,
            "a.#.b",
        )
        .expect("match");
        assert_eq!(values, ["b_value_1", "b_value_2", "b_value_3"]);
    }

    #[test]
    fn wildcard_at_the_root_projects_the_document_array() {
        let values = eval(r#"[{"a":"a_value_1"},{"a":"a_value_2"}]"#, "#.a").expect("match");
        assert_eq!(values, ["a_value_1", "a_value_2"]);
    }

    #[test]
    fn projects_through_nested_objects() {
        // the projection yields objects; the remaining segment is evaluated
        // against each of them and the results are flattened in array order
        let values = eval(
            r#"{"a":[{"b":{"c":"v1"}},{"b":{"c":"v2"}}]}"#,
            "a.#.b.c",
        )
        .expect("match");
        assert_eq!(values, ["v1", "v2"]);
    }

    #[test]
    fn non_string_terminal_projection_errors() {
        // with no segments left after the projection key, a non-string
        // projected value has no path to consume
        let err = eval(r#"{"a":[{"b":{"c":"v1"}}]}"#, "a.#.b").expect_err("path miss");
        assert!(matches!(err, PathError::Miss(_)), "got {err:?}");
    }

    #[test]
    fn nested_wildcard_recurses() {
        let values = eval(
            r#"{"a":[{"b":[{"c":"v1"},{"c":"v2"}]},{"b":[{"c":"v3"}]}]}"#,
            "a.#.b.#.c",
        )
        .expect("match");
        assert_eq!(values, ["v1", "v2", "v3"]);
    }

    #[test]
    fn missing_key_is_an_error_not_an_empty_result() {
        let err = eval(r#"{"a":{"b":"x"}}"#, "a.c").expect_err("path miss");
        assert!(matches!(err, PathError::Miss(_)), "got {err:?}");
    }

    #[test]
    fn missing_projection_key_in_any_element_fails_the_whole_call() {
        let err = eval(r#"{"a":[{"b":"x"},{"c":"y"}]}"#, "a.#.b").expect_err("path miss");
        assert!(matches!(err, PathError::Miss(_)), "got {err:?}");
    }

    #[test]
    fn type_mismatch_is_an_error() {
        assert!(matches!(
            eval(r#"{"a":"not an array"}"#, "a.#.b"),
            Err(PathError::Miss(_))
        ));
        assert!(matches!(
            eval(r#"{"a":["not an object"]}"#, "a.#.b"),
            Err(PathError::Miss(_))
        ));
        assert!(matches!(
            eval(r#"{"a":3}"#, "a.b"),
            Err(PathError::Miss(_))
        ));
    }

    #[test]
    fn non_string_terminal_under_a_plain_key_yields_nothing() {
        let values = eval(r#"{"a":{"b":3}}"#, "a.b").expect("match");
        assert!(values.is_empty());
    }

    #[test]
    fn empty_array_yields_an_empty_result() {
        let values = eval(r#"{"a":[]}"#, "a.#.b").expect("match");
        assert!(values.is_empty());
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let err = eval("{not json", "a.b").expect_err("decode failure");
        assert!(matches!(err, PathError::Decode(_)), "got {err:?}");
    }

    #[test]
    fn evaluation_is_a_pure_function_of_payload_and_path() {
        let payload = br#"{"a":[{"b":"v1"},{"b":"v2"}]}"#;
        let expr = PathExpr::compile("a.#.b").expect("valid expression");
        let first = expr.evaluate(payload).expect("match");
        let second = expr.evaluate(payload).expect("match");
        assert_eq!(first, second);
        assert_eq!(first, ["v1", "v2"]);
    }
}
