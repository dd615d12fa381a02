//! The `set` transform.

use http::HeaderValue;
use serde_json::Value;
use url::Url;

use super::target::{self, Target};
use super::{Transform, Transformable, ValueSource};
use crate::cursor::TransformContext;
use crate::error::{InputError, Result};

/// Overwrites the target with the resolved value. `set` is the only
/// transform allowed to replace the whole url (`url.value`).
#[derive(Debug, Clone)]
pub struct Set {
    target: Target,
    value: ValueSource,
}

impl Set {
    pub fn new(target: &str, value: &str) -> Result<Self> {
        Ok(Self {
            target: Target::parse(target)?,
            value: ValueSource::parse(value)?,
        })
    }
}

impl Transform for Set {
    fn name(&self) -> &'static str {
        "set"
    }

    fn run(&self, ctx: &TransformContext, mut request: Transformable) -> Result<Transformable> {
        let value = self.value.resolve(ctx);
        match &self.target {
            Target::BodyField(path) => {
                let (parent, leaf) = target::body_slot(&mut request.body, path)?;
                parent.insert(leaf.to_string(), Value::String(value));
            }
            Target::Header(name) => {
                let header = HeaderValue::from_str(&value).map_err(|_| {
                    InputError::Build(format!("value {value:?} is not a valid header value"))
                })?;
                request.headers.insert(name.clone(), header);
            }
            Target::UrlParam(name) => {
                target::set_query_param(&mut request.url, name, &value);
            }
            Target::UrlValue => {
                request.url = Url::parse(&value).map_err(|err| {
                    InputError::Build(format!("value {value:?} is not a valid url: {err}"))
                })?;
            }
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use http::Method;
    use serde_json::json;

    use super::*;

    fn request() -> Transformable {
        Transformable {
            url: Url::parse("https://api.test/items?page=1").expect("valid url"),
            method: Method::GET,
            headers: http::HeaderMap::new(),
            body: None,
        }
    }

    #[test]
    fn set_overwrites_a_body_field() {
        let transform = Set::new("body.filter.after", "cursor.page").expect("valid transform");
        let ctx = TransformContext::with_cursor(
            [("page".to_string(), json!("2026-01-01"))].into_iter().collect(),
        );
        let mut req = request();
        req.body = Some(json!({"filter": {"after": "old"}}));
        let out = transform.run(&ctx, req).expect("run");
        assert_eq!(out.body, Some(json!({"filter": {"after": "2026-01-01"}})));
    }

    #[test]
    fn set_replaces_a_url_parameter() {
        let transform = Set::new("url.params.page", "5").expect("valid transform");
        let out = transform.run(&TransformContext::new(), request()).expect("run");
        assert_eq!(out.url.query(), Some("page=5"));
    }

    #[test]
    fn set_replaces_the_whole_url() {
        let transform = Set::new("url.value", "https://other.test/v2").expect("valid transform");
        let out = transform.run(&TransformContext::new(), request()).expect("run");
        assert_eq!(out.url.as_str(), "https://other.test/v2");
    }

    #[test]
    fn unresolvable_url_value_aborts_the_build() {
        let transform = Set::new("url.value", "last_event.next").expect("valid transform");
        let err = transform
            .run(&TransformContext::new(), request())
            .expect_err("empty lookup is not a url");
        assert!(matches!(err, InputError::Build(_)), "got {err:?}");
    }
}
