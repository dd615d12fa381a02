//! Input configuration.
//!
//! Raw deserialized structs on one side, compiled artifacts (parsed urls,
//! compiled patterns, boxed transforms) on the other. Everything that can
//! be rejected is rejected here, at setup time: a running cycle never hits
//! a configuration error.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::auth::basic_auth;
use crate::chain::ReplacePattern;
use crate::client::RateLimiter;
use crate::cursor::CursorEntry;
use crate::error::{InputError, Result};
use crate::jsonpath::LookupPath;
use crate::request::{Encoder, RequestFactory};
use crate::response::{ResponseProcessor, Split};
use crate::transform::{Append, Delete, Set, Transform};

/// Top-level configuration of one chained-request input.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub request: RequestConfig,
    #[serde(default)]
    pub response: Option<ResponseConfig>,
    #[serde(default)]
    pub chain: Vec<ChainConfig>,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    /// Cursor entries: checkpoint name to a wildcard-free lookup into the
    /// last event.
    #[serde(default)]
    pub cursor: BTreeMap<String, String>,
}

/// The first (and possibly only) request of the chain.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub transforms: Vec<TransformConfig>,
    #[serde(default)]
    pub encode_as: Option<String>,
    /// Bounds one gated call: limiter wait plus the transport exchange.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimitConfig {
    /// Steady rate in requests per second.
    pub limit: f64,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_burst() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub basic: Option<BasicAuthConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasicAuthConfig {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseConfig {
    #[serde(default)]
    pub split: Option<SplitConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SplitConfig {
    /// Wildcard-free path to the array whose elements become events.
    pub target: String,
}

/// One chain step after the first request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub step: StepConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepConfig {
    pub request: StepRequestConfig,
    /// Dual-purpose pattern: the path harvested from the predecessor's
    /// responses and the placeholder replaced in this step's url.
    pub replace: String,
    #[serde(default)]
    pub response: Option<ResponseConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepRequestConfig {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub body: Option<Value>,
}

/// Everything a [`crate::ChainInput`] needs, fully validated.
pub struct CompiledInput {
    pub factories: Vec<RequestFactory>,
    pub processor: ResponseProcessor,
    pub limiter: RateLimiter,
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for CompiledInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledInput")
            .field("factories", &self.factories.len())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl InputConfig {
    pub fn compile(&self) -> Result<CompiledInput> {
        let transforms: Arc<[Box<dyn Transform>]> =
            compile_transforms(&self.request.transforms)?.into();
        let encoder = self
            .request
            .encode_as
            .as_deref()
            .map(Encoder::from_name)
            .transpose()?;
        let auth = match self.auth.as_ref().and_then(|auth| auth.basic.as_ref()) {
            Some(basic) => Some(basic_auth(&basic.user, Some(&basic.password))?),
            None => None,
        };

        let mut factories = Vec::with_capacity(1 + self.chain.len());
        factories.push(RequestFactory {
            url: parse_url(&self.request.url)?,
            method: parse_method(&self.request.method)?,
            body: normalize_body(self.request.body.clone()),
            transforms: transforms.clone(),
            encoder,
            basic_auth: auth.clone(),
            replace: None,
            split: compile_split(self.response.as_ref())?,
        });

        for (index, link) in self.chain.iter().enumerate() {
            let step = &link.step;
            if step.replace.trim().is_empty() {
                return Err(InputError::Config(format!(
                    "chain step {} must declare a replace pattern",
                    index + 1
                )));
            }
            factories.push(RequestFactory {
                url: parse_url(&step.request.url)?,
                method: parse_method(&step.request.method)?,
                body: normalize_body(step.request.body.clone()),
                transforms: transforms.clone(),
                encoder,
                basic_auth: auth.clone(),
                replace: Some(ReplacePattern::compile(&step.replace)?),
                split: compile_split(step.response.as_ref())?,
            });
        }

        let limiter = match self.request.rate_limit {
            Some(RateLimitConfig { limit, .. }) if limit <= 0.0 => {
                return Err(InputError::Config(format!(
                    "rate limit must be positive, got {limit}"
                )))
            }
            Some(RateLimitConfig { limit, burst }) => RateLimiter::new(Some(limit), burst),
            None => RateLimiter::unlimited(),
        };

        Ok(CompiledInput {
            factories,
            processor: ResponseProcessor::new(compile_cursor(&self.cursor)?),
            limiter,
            timeout: self.request.timeout_secs.map(Duration::from_secs),
        })
    }
}

/// Configured transforms, one shape per operation, deserialized from
/// `[{"set": {"target": ..., "value": ...}}, ...]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformConfig {
    Append { target: String, value: String },
    Set { target: String, value: String },
    Delete { target: String },
}

fn compile_transforms(configs: &[TransformConfig]) -> Result<Vec<Box<dyn Transform>>> {
    configs
        .iter()
        .map(|config| -> Result<Box<dyn Transform>> {
            match config {
                TransformConfig::Append { target, value } => {
                    Ok(Box::new(Append::new(target, value)?))
                }
                TransformConfig::Set { target, value } => Ok(Box::new(Set::new(target, value)?)),
                TransformConfig::Delete { target } => Ok(Box::new(Delete::new(target)?)),
            }
        })
        .collect()
}

fn compile_split(response: Option<&ResponseConfig>) -> Result<Option<Split>> {
    match response.and_then(|response| response.split.as_ref()) {
        Some(split) => Split::compile(&split.target)
            .map(Some)
            .map_err(|err| InputError::Config(format!("split target: {err}"))),
        None => Ok(None),
    }
}

fn compile_cursor(entries: &BTreeMap<String, String>) -> Result<Vec<CursorEntry>> {
    entries
        .iter()
        .map(|(name, path)| {
            Ok(CursorEntry {
                name: name.clone(),
                path: LookupPath::compile(path).map_err(|err| {
                    InputError::Config(format!("cursor entry {name:?}: {err}"))
                })?,
            })
        })
        .collect()
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|err| InputError::Config(format!("invalid url {raw:?}: {err}")))
}

fn parse_method(raw: &str) -> Result<Method> {
    Method::from_bytes(raw.to_uppercase().as_bytes())
        .map_err(|_| InputError::Config(format!("invalid http method {raw:?}")))
}

/// Empty body templates are treated as absent, so GET steps configured with
/// `{}` do not grow a body.
fn normalize_body(body: Option<Value>) -> Option<Value> {
    body.filter(|body| match body {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    })
}
