//! Request transforms.
//!
//! A transform is a named, configured operation that rewrites the
//! transformable request before it is dispatched: `append`, `set`, and
//! `delete`, each aimed at a target inside the request (body field, header,
//! url parameter, or the whole url). The configured list is applied in
//! declared order by the request factory and is shared by every chain step.

mod append;
mod delete;
mod set;
mod source;
mod target;

pub use append::Append;
pub use delete::Delete;
pub use set::Set;
pub use source::ValueSource;
pub use target::Target;

use http::{HeaderMap, Method};
use serde_json::Value;
use url::Url;

use crate::cursor::TransformContext;
use crate::error::Result;

/// The mutable request representation transforms operate on. Owned by the
/// request factory for the duration of one build, then encoded and dropped.
#[derive(Debug, Clone)]
pub struct Transformable {
    pub url: Url,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

/// One configured request transform.
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rewrites the request, reading interval state (cursor, first/last
    /// event) from the execution context. An error aborts the whole build.
    fn run(&self, ctx: &TransformContext, request: Transformable) -> Result<Transformable>;
}
