//! The chain executor.
//!
//! One poll cycle drives the configured steps in order: step 0 issues a
//! single request, every later step fans out one request per id harvested
//! from its predecessor's responses. Responses are collected into per-step
//! buckets — intermediate buckets feed harvesting and the last-event
//! snapshot, the final bucket feeds the publisher. Everything is strictly
//! sequential; emission order is id order is request order.

use bytes::Bytes;
use regex::{NoExpand, Regex};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::client::{HttpClient, Transport};
use crate::cursor::TransformContext;
use crate::error::{InputError, Result};
use crate::jsonpath::PathExpr;
use crate::publisher::Publisher;
use crate::request::RequestFactory;
use crate::response::ResponseProcessor;

/// A chain step's compiled substitution pattern.
///
/// One configuration string serves both directions: compiled as a path
/// expression it harvests ids from the predecessor's responses, compiled as
/// a regex it locates the placeholder to replace inside the step's url
/// template.
#[derive(Debug, Clone)]
pub struct ReplacePattern {
    pattern: Regex,
    path: PathExpr,
}

impl ReplacePattern {
    pub fn compile(raw: &str) -> Result<Self> {
        let path = PathExpr::compile(raw)
            .map_err(|err| InputError::Config(format!("replace pattern {raw:?}: {err}")))?;
        let pattern = Regex::new(raw)
            .map_err(|err| InputError::Config(format!("replace pattern {raw:?}: {err}")))?;
        Ok(Self { pattern, path })
    }

    /// The path expression evaluated against predecessor responses.
    pub fn path(&self) -> &PathExpr {
        &self.path
    }

    /// Substitutes one harvested id into the configured template.
    pub fn substitute(&self, template: &Url, id: &str) -> Result<Url> {
        let replaced = self.pattern.replace_all(template.as_str(), NoExpand(id));
        Url::parse(&replaced).map_err(|err| {
            InputError::UrlTemplate(format!("substituted url {replaced:?} does not parse: {err}"))
        })
    }
}

/// Drives the request factories of one input through a full poll cycle.
pub struct Requester<T> {
    client: HttpClient<T>,
    factories: Vec<RequestFactory>,
    processor: ResponseProcessor,
}

impl<T: Transport> Requester<T> {
    pub fn new(
        client: HttpClient<T>,
        factories: Vec<RequestFactory>,
        processor: ResponseProcessor,
    ) -> Self {
        Self {
            client,
            factories,
            processor,
        }
    }

    /// Runs one cycle and returns the number of published events.
    ///
    /// Fatal failures abort immediately; cursor advancement already applied
    /// for earlier events stays in effect.
    pub async fn execute_cycle<P: Publisher>(
        &self,
        ctx: &mut TransformContext,
        publisher: &mut P,
    ) -> Result<u64> {
        ctx.clear_interval_data();

        let mut ids: Vec<String> = Vec::new();
        let mut published = 0u64;
        let total = self.factories.len();

        for (index, factory) in self.factories.iter().enumerate() {
            let last_step = index + 1 == total;
            let mut bucket: Vec<Bytes> = Vec::new();

            if index == 0 {
                let response = self.client.execute(factory.build(ctx)?).await?;
                bucket.push(response.into_body());
            } else {
                let pattern = factory.replace().ok_or_else(|| {
                    InputError::Config(format!("chain step {index} has no replace pattern"))
                })?;
                // zero harvested ids is a valid empty cycle, not an error
                for id in &ids {
                    let url = pattern.substitute(factory.url(), id)?;
                    let response = self.client.execute(factory.build_at(url, ctx)?).await?;
                    bucket.push(response.into_body());
                }
            }

            if last_step {
                published =
                    self.processor
                        .process_bodies(&bucket, factory.split(), ctx, publisher);
            } else {
                let documents = decode_documents(&bucket)?;
                let next = self.factories[index + 1].replace().ok_or_else(|| {
                    InputError::Config(format!("chain step {} has no replace pattern", index + 1))
                })?;
                ids = harvest_ids(&documents, next.path())?;
                debug!(step = index, ids = ids.len(), "harvested ids for next chain step");
                self.processor
                    .track_documents(&documents, factory.split(), ctx);
            }
        }

        info!(published, "request cycle finished");
        Ok(published)
    }
}

/// Each intermediate body is read exactly once; a body that does not decode
/// makes the whole cycle fail, since later steps cannot proceed without it.
fn decode_documents(bodies: &[Bytes]) -> Result<Vec<Value>> {
    bodies
        .iter()
        .map(|body| {
            serde_json::from_slice(body).map_err(|err| InputError::Harvest(Box::new(err)))
        })
        .collect()
}

/// Ids from multiple responses are concatenated in response order.
fn harvest_ids(documents: &[Value], path: &PathExpr) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for document in documents {
        let values = path
            .evaluate_value(document)
            .map_err(|err| InputError::Harvest(Box::new(err)))?;
        ids.extend(values);
    }
    Ok(ids)
}
