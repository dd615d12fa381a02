//! # restchain
//!
//! A chained-request REST polling input for log and metrics shipping
//! agents. Each poll cycle issues a configured chain of dependent HTTP
//! calls — step N's urls are built from ids harvested out of step N-1's
//! responses via a narrow dot-path dialect — turns the final responses
//! into structured events, and hands them to a host-owned publisher
//! together with a resumable cursor.
//!
//! What lives here: the chain executor, the path evaluator, the request
//! transform pipeline, the rate-limited execution client, and the response
//! processor. What deliberately does not: scheduling, retry/backoff, and
//! cursor persistence, which belong to the host framework driving
//! [`ChainInput::run_cycle`].
//!
//! ```no_run
//! use restchain::{ChainInput, CursorMap, InputConfig, PublishError, Publisher, ReqwestTransport};
//!
//! struct Stdout;
//!
//! impl Publisher for Stdout {
//!     fn publish(
//!         &mut self,
//!         event: &serde_json::Value,
//!         _cursor: &CursorMap,
//!     ) -> Result<(), PublishError> {
//!         println!("{event}");
//!         Ok(())
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config: InputConfig = serde_json::from_str(
//!     r#"{
//!         "request": {"url": "https://api.example.com/exports"},
//!         "response": {"split": {"target": "records"}},
//!         "cursor": {"last_id": "id"}
//!     }"#,
//! )?;
//! let mut input = ChainInput::new(&config, ReqwestTransport::new()?)?;
//! let _published = input.run_cycle(&mut Stdout).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod chain;
pub mod client;
pub mod config;
pub mod cursor;
pub mod error;
pub mod jsonpath;
pub mod publisher;
pub mod request;
pub mod response;
pub mod transform;

mod input;

pub use chain::{ReplacePattern, Requester};
pub use client::{HttpClient, RateLimiter, ReqwestTransport, Transport};
pub use config::{CompiledInput, InputConfig};
pub use cursor::{CursorMap, TransformContext};
pub use error::{BoxError, InputError, Result};
pub use input::ChainInput;
pub use jsonpath::{LookupPath, PathError, PathExpr};
pub use publisher::{PublishError, Publisher};
pub use request::RequestFactory;
pub use response::{ResponseProcessor, Split};
