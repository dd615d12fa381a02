//! Request construction for one chain step.
//!
//! A factory owns a step's compiled configuration and turns it into a
//! concrete HTTP request: seed url/method/default headers, deep-copy the
//! body template, run the shared transform pipeline, default the
//! `Content-Type`, encode the body, and apply basic auth last. No network
//! I/O happens here.

mod encode;

pub use encode::{Encoder, CONTENT_TYPE_FORM, CONTENT_TYPE_JSON};

use std::sync::Arc;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method, Request};
use serde_json::Value;
use url::Url;

use crate::chain::ReplacePattern;
use crate::cursor::TransformContext;
use crate::error::{InputError, Result};
use crate::response::Split;
use crate::transform::{Transform, Transformable};

const DEFAULT_USER_AGENT: &str = concat!("restchain/", env!("CARGO_PKG_VERSION"));

/// Builds requests for one configured chain step.
pub struct RequestFactory {
    pub(crate) url: Url,
    pub(crate) method: Method,
    pub(crate) body: Option<Value>,
    pub(crate) transforms: Arc<[Box<dyn Transform>]>,
    pub(crate) encoder: Option<Encoder>,
    pub(crate) basic_auth: Option<HeaderValue>,
    pub(crate) replace: Option<ReplacePattern>,
    pub(crate) split: Option<Split>,
}

impl RequestFactory {
    /// The configured url template. Chain steps substitute harvested ids
    /// into this, never into a previously substituted url.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The substitution pattern; `None` exactly for step 0.
    pub fn replace(&self) -> Option<&ReplacePattern> {
        self.replace.as_ref()
    }

    pub fn split(&self) -> Option<&Split> {
        self.split.as_ref()
    }

    /// Builds the step's request at its configured url.
    pub fn build(&self, ctx: &TransformContext) -> Result<Request<Bytes>> {
        self.build_at(self.url.clone(), ctx)
    }

    /// Builds the step's request at a substituted url (id fan-out).
    pub fn build_at(&self, url: Url, ctx: &TransformContext) -> Result<Request<Bytes>> {
        let transformed = self.transformable(url, ctx)?;
        let body = self.encode_body(&transformed)?;

        let mut request = Request::builder()
            .method(transformed.method.clone())
            .uri(transformed.url.as_str())
            .body(body)
            .map_err(|err| InputError::Build(err.to_string()))?;
        *request.headers_mut() = transformed.headers;

        // applied after the pipeline so transforms can never displace it
        if let Some(auth) = &self.basic_auth {
            request.headers_mut().insert(AUTHORIZATION, auth.clone());
        }

        tracing::debug!(method = %request.method(), url = %request.uri(), "built request");
        Ok(request)
    }

    fn transformable(&self, url: Url, ctx: &TransformContext) -> Result<Transformable> {
        let mut request = Transformable {
            url,
            method: self.method.clone(),
            headers: default_headers(),
            // deep copy keeps the template pristine across fan-out builds
            body: self.body.clone(),
        };

        for transform in self.transforms.iter() {
            request = transform.run(ctx, request)?;
            tracing::trace!(transform = transform.name(), "applied request transform");
        }

        if body_bearing(&request.method) && !request.headers.contains_key(CONTENT_TYPE) {
            request
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        }
        Ok(request)
    }

    fn encode_body(&self, request: &Transformable) -> Result<Bytes> {
        if !body_bearing(&request.method) {
            return Ok(Bytes::new());
        }
        let Some(body) = &request.body else {
            return Ok(Bytes::new());
        };
        let encoder = self.encoder.unwrap_or_else(|| {
            let content_type = request
                .headers
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or(CONTENT_TYPE_JSON);
            Encoder::for_content_type(content_type)
        });
        encoder.encode(body)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(CONTENT_TYPE_JSON));
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers
}

fn body_bearing(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}
