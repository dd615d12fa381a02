//! The `delete` transform.

use super::target::{self, Target};
use super::{Transform, Transformable};
use crate::cursor::TransformContext;
use crate::error::{InputError, Result};

/// Removes the target from the request. Deleting something that is not
/// there is a no-op.
#[derive(Debug, Clone)]
pub struct Delete {
    target: Target,
}

impl Delete {
    pub fn new(target: &str) -> Result<Self> {
        let target = Target::parse(target)?;
        if matches!(target, Target::UrlValue) {
            return Err(InputError::Config(
                "delete cannot target url.value".into(),
            ));
        }
        Ok(Self { target })
    }
}

impl Transform for Delete {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn run(&self, _ctx: &TransformContext, mut request: Transformable) -> Result<Transformable> {
        match &self.target {
            Target::BodyField(path) => {
                if let Some(body) = request.body.as_mut() {
                    remove_body_field(body, path);
                }
            }
            Target::Header(name) => {
                request.headers.remove(name);
            }
            Target::UrlParam(name) => {
                target::delete_query_param(&mut request.url, name);
            }
            Target::UrlValue => {
                return Err(InputError::Build("delete cannot target url.value".into()))
            }
        }
        Ok(request)
    }
}

fn remove_body_field(body: &mut serde_json::Value, path: &[String]) {
    let mut current = body;
    for segment in &path[..path.len() - 1] {
        match current.as_object_mut().and_then(|object| object.get_mut(segment)) {
            Some(next) => current = next,
            None => return,
        }
    }
    if let Some(object) = current.as_object_mut() {
        object.remove(&path[path.len() - 1]);
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderValue, Method};
    use serde_json::json;
    use url::Url;

    use super::*;

    #[test]
    fn delete_strips_body_header_and_param() {
        let mut request = Transformable {
            url: Url::parse("https://api.test/items?page=1&size=10").expect("valid url"),
            method: Method::POST,
            headers: http::HeaderMap::new(),
            body: Some(json!({"filter": {"after": "x"}, "keep": true})),
        };
        request
            .headers
            .insert("x-debug", HeaderValue::from_static("1"));

        let ctx = TransformContext::new();
        let request = Delete::new("body.filter.after")
            .expect("valid transform")
            .run(&ctx, request)
            .expect("run");
        let request = Delete::new("header.X-Debug")
            .expect("valid transform")
            .run(&ctx, request)
            .expect("run");
        let request = Delete::new("url.params.page")
            .expect("valid transform")
            .run(&ctx, request)
            .expect("run");

        assert_eq!(request.body, Some(json!({"filter": {}, "keep": true})));
        assert!(request.headers.get("x-debug").is_none());
        assert_eq!(request.url.query(), Some("size=10"));
    }

    #[test]
    fn deleting_a_missing_field_is_a_noop() {
        let request = Transformable {
            url: Url::parse("https://api.test/items").expect("valid url"),
            method: Method::GET,
            headers: http::HeaderMap::new(),
            body: None,
        };
        let out = Delete::new("body.missing.key")
            .expect("valid transform")
            .run(&TransformContext::new(), request)
            .expect("run");
        assert!(out.body.is_none());
    }

    #[test]
    fn delete_of_url_value_is_rejected_at_setup() {
        assert!(Delete::new("url.value").is_err());
    }
}
