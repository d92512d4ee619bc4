//! Search context: the caller-facing handle over the engine transport
//!
//! Owns the long-lived transport handle and the connection's default index,
//! hands out per-request query builders, and exposes the thin document
//! pass-throughs (get by id, index, bulk, update). The pass-throughs carry no
//! query logic; their results reduce to the transport success flag.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::error;

use crate::error::{ElastiqError, Result};
use crate::query::SearchQuery;
use crate::transport::SearchTransport;

/// Handle over one engine connection
///
/// Cheap to clone; the transport is shared. Builders obtained from it are
/// independent and single-owner.
#[derive(Clone)]
pub struct SearchContext {
    transport: Arc<dyn SearchTransport>,
    default_index: Option<String>,
}

impl SearchContext {
    /// Wrap a transport handle with no default index
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        Self {
            transport,
            default_index: None,
        }
    }

    /// Set the index targeted when a request does not override it
    pub fn with_default_index(mut self, name: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(ElastiqError::InvalidArgument(
                "default index name must not be blank".to_string(),
            ));
        }
        self.default_index = Some(name.to_string());
        Ok(self)
    }

    /// The connection's default index, if configured
    pub fn default_index(&self) -> Option<&str> {
        self.default_index.as_deref()
    }

    /// Start a query builder for entity type `T` against the default index
    pub fn query<T>(&self) -> SearchQuery<T> {
        SearchQuery::new(self.transport.clone(), self.default_index.clone())
    }

    /// Start a query builder targeting a specific index
    pub fn query_on<T>(&self, index: &str) -> Result<SearchQuery<T>> {
        let mut query = self.query();
        query.index(index)?;
        Ok(query)
    }

    /// Fetch one document by id
    ///
    /// Returns `Ok(None)` when the engine reports a miss or the round trip
    /// fails; a source payload that does not deserialize into `T` is a
    /// serialization error.
    pub async fn get<T: DeserializeOwned>(&self, id: &str, index: Option<&str>) -> Result<Option<T>> {
        let raw = self.transport.get(self.pick(index), id).await;
        if !raw.success {
            error!(
                "get failed: uri={} error={}",
                raw.uri,
                raw.error.as_deref().unwrap_or("<none>")
            );
            return Ok(None);
        }
        match raw.body.as_ref().and_then(|b| b.get("_source")) {
            Some(source) => Ok(Some(serde_json::from_value(source.clone())?)),
            None => Ok(None),
        }
    }

    /// Index one document through the bulk endpoint
    pub async fn index_one<T: Serialize>(&self, doc: &T, index: Option<&str>) -> Result<bool> {
        self.index_many(std::slice::from_ref(doc), index).await
    }

    /// Index a batch of documents through the bulk endpoint
    pub async fn index_many<T: Serialize>(&self, docs: &[T], index: Option<&str>) -> Result<bool> {
        let mut payload = Vec::with_capacity(docs.len());
        for doc in docs {
            payload.push(serde_json::to_value(doc)?);
        }
        let raw = self.transport.bulk_index(self.pick(index), payload).await;
        if !raw.success {
            error!(
                "bulk index failed: uri={} error={}",
                raw.uri,
                raw.error.as_deref().unwrap_or("<none>")
            );
        }
        Ok(raw.success)
    }

    /// Update one document by id
    pub async fn update<T: Serialize>(&self, id: &str, doc: &T, index: Option<&str>) -> Result<bool> {
        let payload = serde_json::to_value(doc)?;
        let raw = self.transport.update(self.pick(index), id, payload).await;
        if !raw.success {
            error!(
                "update failed: uri={} error={}",
                raw.uri,
                raw.error.as_deref().unwrap_or("<none>")
            );
        }
        Ok(raw.success)
    }

    fn pick<'a>(&'a self, index: Option<&'a str>) -> Option<&'a str> {
        index.or(self.default_index.as_deref())
    }
}
