//! The top-level input: compiled configuration plus cross-cycle state.

use std::sync::Arc;

use tracing::error;

use crate::client::{HttpClient, Transport};
use crate::config::InputConfig;
use crate::cursor::{CursorMap, TransformContext};
use crate::error::Result;
use crate::chain::Requester;
use crate::publisher::Publisher;

/// A configured chained-request input.
///
/// Cycle scheduling is the caller's job: invoke
/// [`run_cycle`](Self::run_cycle) on whatever interval (and retry policy)
/// the host uses. The rate limiter and the transport's connection pool
/// live here and persist across cycles; everything cycle-scoped is created
/// and dropped inside `run_cycle`.
pub struct ChainInput<T> {
    requester: Requester<T>,
    ctx: TransformContext,
    cycles_failed: u64,
}

impl<T: Transport> ChainInput<T> {
    pub fn new(config: &InputConfig, transport: T) -> Result<Self> {
        let compiled = config.compile()?;
        let client = HttpClient::new(transport, Arc::new(compiled.limiter), compiled.timeout);
        Ok(Self {
            requester: Requester::new(client, compiled.factories, compiled.processor),
            ctx: TransformContext::new(),
            cycles_failed: 0,
        })
    }

    /// Resumes from a cursor the host persisted after an earlier run.
    pub fn resume(mut self, cursor: CursorMap) -> Self {
        self.ctx = TransformContext::with_cursor(cursor);
        self
    }

    /// Runs one poll cycle and returns the number of published events.
    ///
    /// A failed cycle is logged once with its cause and counted; the error
    /// is returned so the scheduler can apply its own backoff.
    pub async fn run_cycle<P: Publisher>(&mut self, publisher: &mut P) -> Result<u64> {
        match self.requester.execute_cycle(&mut self.ctx, publisher).await {
            Ok(published) => Ok(published),
            Err(err) => {
                self.cycles_failed += 1;
                error!(error = %err, "poll cycle aborted");
                Err(err)
            }
        }
    }

    /// The cursor to persist between runs.
    pub fn cursor(&self) -> &CursorMap {
        self.ctx.cursor()
    }

    pub fn cycles_failed(&self) -> u64 {
        self.cycles_failed
    }
}
