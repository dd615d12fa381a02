//! The `append` transform.

use http::HeaderValue;
use serde_json::Value;

use super::target::{self, Target};
use super::{Transform, Transformable, ValueSource};
use crate::cursor::TransformContext;
use crate::error::{InputError, Result};

/// Adds a value without displacing what is already there: body scalars are
/// promoted to arrays, headers and url parameters gain another value.
#[derive(Debug, Clone)]
pub struct Append {
    target: Target,
    value: ValueSource,
}

impl Append {
    pub fn new(target: &str, value: &str) -> Result<Self> {
        let target = Target::parse(target)?;
        if matches!(target, Target::UrlValue) {
            return Err(InputError::Config(
                "append cannot target url.value".into(),
            ));
        }
        Ok(Self {
            target,
            value: ValueSource::parse(value)?,
        })
    }
}

impl Transform for Append {
    fn name(&self) -> &'static str {
        "append"
    }

    fn run(&self, ctx: &TransformContext, mut request: Transformable) -> Result<Transformable> {
        let value = self.value.resolve(ctx);
        match &self.target {
            Target::BodyField(path) => {
                let (parent, leaf) = target::body_slot(&mut request.body, path)?;
                match parent.entry(leaf.to_string()) {
                    serde_json::map::Entry::Vacant(slot) => {
                        slot.insert(Value::String(value));
                    }
                    serde_json::map::Entry::Occupied(mut slot) => match slot.get_mut() {
                        Value::Array(items) => items.push(Value::String(value)),
                        existing => {
                            let previous = existing.take();
                            *existing = Value::Array(vec![previous, Value::String(value)]);
                        }
                    },
                }
            }
            Target::Header(name) => {
                let header = HeaderValue::from_str(&value).map_err(|_| {
                    InputError::Build(format!("value {value:?} is not a valid header value"))
                })?;
                request.headers.append(name.clone(), header);
            }
            Target::UrlParam(name) => {
                request.url.query_pairs_mut().append_pair(name, &value);
            }
            Target::UrlValue => {
                return Err(InputError::Build("append cannot target url.value".into()))
            }
        }
        Ok(request)
    }
}
