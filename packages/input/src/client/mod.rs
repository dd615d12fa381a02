//! Rate-limited request execution.
//!
//! Exactly one attempt per call: the limiter gates the transport call, the
//! configured timeout bounds the whole gated call (limiter wait included),
//! and any response with a status of 400 or above is drained and returned
//! as an error. Retry policy belongs to the owning scheduler, not here.

mod limiter;
mod transport;

pub use limiter::RateLimiter;
pub use transport::{ReqwestTransport, Transport};

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{Request, Response};
use tracing::debug;

use crate::error::{InputError, Result};

/// Maximum number of error-body bytes carried in a status error.
const ERROR_BODY_LIMIT: usize = 2048;

/// The shared execution client: one per input instance, used by every chain
/// step of every cycle.
pub struct HttpClient<T> {
    transport: T,
    limiter: Arc<RateLimiter>,
    timeout: Option<Duration>,
}

impl<T: Transport> HttpClient<T> {
    pub fn new(transport: T, limiter: Arc<RateLimiter>, timeout: Option<Duration>) -> Self {
        Self {
            transport,
            limiter,
            timeout,
        }
    }

    /// Executes one request through the limiter. Non-success statuses are
    /// mapped to [`InputError::Status`]; a deadline hit anywhere in the
    /// gated call is [`InputError::Timeout`].
    pub async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let gated = async {
            self.limiter.acquire().await;
            self.transport
                .send(request)
                .await
                .map_err(InputError::Transport)
        };

        let response = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, gated)
                .await
                .map_err(|_| InputError::Timeout)??,
            None => gated.await?,
        };

        let status = response.status();
        debug!(status = status.as_u16(), "received response");
        if status.as_u16() >= 400 {
            let body = response.into_body();
            return Err(InputError::Status {
                status,
                body: body_excerpt(&body),
            });
        }
        Ok(response)
    }
}

fn body_excerpt(body: &Bytes) -> String {
    let end = body.len().min(ERROR_BODY_LIMIT);
    String::from_utf8_lossy(&body[..end]).into_owned()
}
