//! The transport seam.
//!
//! The execution client talks to the wire through this trait so tests can
//! substitute scripted responses. The production implementation wraps a
//! pooled `reqwest` client (rustls); the pool is the only transport state
//! shared across cycles.

use std::future::Future;

use bytes::Bytes;
use http::{Request, Response};

use crate::error::{BoxError, InputError, Result};

/// One-shot request dispatch. Implementations collect the full response
/// body before returning so callers never hold a half-read connection.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = std::result::Result<Response<Bytes>, BoxError>> + Send;
}

/// Production transport over a pooled HTTP client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| InputError::Transport(Box::new(err)))?;
        Ok(Self { client })
    }

    /// Wraps an externally configured client (proxy settings, custom roots).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = std::result::Result<Response<Bytes>, BoxError>> + Send {
        let client = self.client.clone();
        async move {
            let request = reqwest::Request::try_from(request)?;
            let response = client.execute(request).await?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;

            let mut collected = Response::builder().status(status).body(body)?;
            *collected.headers_mut() = headers;
            Ok(collected)
        }
    }
}
