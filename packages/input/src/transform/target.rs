//! Transform targets and the shared plumbing for reaching them.

use http::header::HeaderName;
use serde_json::{Map, Value};
use url::Url;

use crate::error::{InputError, Result};

/// Where a transform points inside the request.
#[derive(Debug, Clone)]
pub enum Target {
    /// A dotted key path into the JSON body; intermediate objects are
    /// created on write.
    BodyField(Vec<String>),
    /// A named header.
    Header(HeaderName),
    /// A query-string parameter.
    UrlParam(String),
    /// The whole request url (set only).
    UrlValue,
}

impl Target {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw == "url.value" {
            return Ok(Target::UrlValue);
        }
        if let Some(rest) = raw.strip_prefix("body.") {
            let segments: Vec<String> = rest.split('.').map(str::to_string).collect();
            if segments.iter().any(String::is_empty) {
                return Err(InputError::Config(format!(
                    "transform target {raw:?} has an empty body key"
                )));
            }
            return Ok(Target::BodyField(segments));
        }
        if let Some(rest) = raw.strip_prefix("header.") {
            let name = HeaderName::from_bytes(rest.as_bytes()).map_err(|_| {
                InputError::Config(format!("transform target {raw:?} is not a valid header name"))
            })?;
            return Ok(Target::Header(name));
        }
        if let Some(rest) = raw.strip_prefix("url.params.") {
            if rest.is_empty() {
                return Err(InputError::Config(format!(
                    "transform target {raw:?} names no url parameter"
                )));
            }
            return Ok(Target::UrlParam(rest.to_string()));
        }
        Err(InputError::Config(format!(
            "unknown transform target {raw:?}"
        )))
    }
}

/// Walks to the parent object of a dotted body path, creating intermediate
/// objects as needed, and returns it with the leaf key.
pub(super) fn body_slot<'a>(
    body: &'a mut Option<Value>,
    path: &'a [String],
) -> Result<(&'a mut Map<String, Value>, &'a str)> {
    let root = body.get_or_insert_with(|| Value::Object(Map::new()));
    let mut current = root;
    for segment in &path[..path.len() - 1] {
        let object = current.as_object_mut().ok_or_else(|| {
            InputError::Build(format!("body key {segment:?} is not an object"))
        })?;
        current = object
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    let leaf = path[path.len() - 1].as_str();
    let parent = current.as_object_mut().ok_or_else(|| {
        InputError::Build(format!("body parent of {leaf:?} is not an object"))
    })?;
    Ok((parent, leaf))
}

/// Replaces any existing values of a query parameter with a single value.
pub(super) fn set_query_param(url: &mut Url, name: &str, value: &str) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key.as_ref() != name)
        .map(|(key, val)| (key.into_owned(), val.into_owned()))
        .collect();
    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (key, val) in &kept {
        pairs.append_pair(key, val);
    }
    pairs.append_pair(name, value);
}

/// Removes every value of a query parameter.
pub(super) fn delete_query_param(url: &mut Url, name: &str) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key.as_ref() != name)
        .map(|(key, val)| (key.into_owned(), val.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
        return;
    }
    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (key, val) in &kept {
        pairs.append_pair(key, val);
    }
}
