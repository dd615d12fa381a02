//! Error taxonomy for the chained-request input.
//!
//! Configuration problems surface at setup time and never mid-cycle; every
//! other variant aborts the current poll cycle and leaves retry policy to
//! the owning scheduler. Event-level failures (a single bad document, a
//! publisher rejection) are logged and skipped by the response processor and
//! never appear here.

use http::StatusCode;

/// Boxed error used where the concrete cause is owned by a collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A Result alias where the Err case is [`InputError`].
pub type Result<T> = std::result::Result<T, InputError>;

/// Errors produced while configuring or driving a poll cycle.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// Malformed configuration, detected before the first cycle runs.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A request could not be assembled (transform failure, bad header
    /// value, unencodable body).
    #[error("failed to build request: {0}")]
    Build(String),

    /// The transport failed before a response was received.
    #[error("failed to execute request: {0}")]
    Transport(#[source] BoxError),

    /// The server answered with a non-success status. The body is drained
    /// and captured (truncated) for diagnostics.
    #[error("server responded with status code {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The gated call (limiter wait plus transport) exceeded the configured
    /// api timeout.
    #[error("request exceeded the configured api timeout")]
    Timeout,

    /// Id harvesting between chain steps failed; later steps cannot
    /// proceed without ids.
    #[error("failed to harvest ids for the next chain step: {0}")]
    Harvest(#[source] BoxError),

    /// Substituting a harvested id into a step's url template produced an
    /// unparsable url.
    #[error("failed to build chain url: {0}")]
    UrlTemplate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_includes_code_and_body() {
        let err = InputError::Status {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "slow down".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("429"), "missing code: {rendered}");
        assert!(rendered.contains("slow down"), "missing body: {rendered}");
    }
}
