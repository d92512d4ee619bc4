//! Transport seam to the remote search engine
//!
//! The engine client is an external collaborator: a long-lived, thread-safe
//! handle owned by the surrounding application. This crate only depends on
//! the [`SearchTransport`] trait and the [`RawResponse`] envelope it returns.
//! Transports fold every failure into the envelope instead of returning
//! `Err`, so execution failures surface through outcome flags rather than
//! exceptions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw response envelope from one engine round trip
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawResponse {
    /// Transport-level success (the engine answered with a non-error status)
    pub success: bool,
    /// HTTP status, when one was received
    #[serde(default)]
    pub status: Option<u16>,
    /// Wire URI the request was sent to
    pub uri: String,
    /// Parsed response body, when one was received
    #[serde(default)]
    pub body: Option<Value>,
    /// Raw debug payload captured by the transport, for diagnostics
    #[serde(default)]
    pub debug_information: Option<String>,
    /// Message of the underlying transport error, if one was captured
    #[serde(default)]
    pub error: Option<String>,
    /// Whether the round trip was abandoned because a deadline elapsed
    #[serde(default)]
    pub timed_out: bool,
}

impl RawResponse {
    /// Successful round trip with a parsed body
    pub fn ok(uri: impl Into<String>, body: Value) -> Self {
        Self {
            success: true,
            status: Some(200),
            uri: uri.into(),
            body: Some(body),
            debug_information: None,
            error: None,
            timed_out: false,
        }
    }

    /// Failed round trip
    pub fn failure(
        uri: impl Into<String>,
        status: Option<u16>,
        debug_information: Option<String>,
        error: Option<String>,
    ) -> Self {
        Self {
            success: false,
            status,
            uri: uri.into(),
            body: None,
            debug_information,
            error,
            timed_out: false,
        }
    }

    /// Round trip abandoned because the caller's deadline elapsed
    pub fn timeout(uri: impl Into<String>) -> Self {
        Self {
            success: false,
            status: None,
            uri: uri.into(),
            body: None,
            debug_information: None,
            error: Some("deadline elapsed before the engine responded".to_string()),
            timed_out: true,
        }
    }
}

/// Async handle to the remote engine's standard endpoints
///
/// Implementations never return `Err`: connection failures, non-2xx statuses
/// and malformed payloads are all reported through the [`RawResponse`]
/// envelope.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// POST a compiled query body to the search endpoint of `index` (or the
    /// connection's default index when `None`)
    async fn search(&self, index: Option<&str>, body: &Value) -> RawResponse;

    /// Fetch one document by id
    async fn get(&self, index: Option<&str>, id: &str) -> RawResponse;

    /// Index a batch of documents through the bulk endpoint
    async fn bulk_index(&self, index: Option<&str>, docs: Vec<Value>) -> RawResponse;

    /// Update one document by id
    async fn update(&self, index: Option<&str>, id: &str, doc: Value) -> RawResponse;
}

/// Wire URI of the search endpoint for an index
pub(crate) fn search_uri(index: Option<&str>) -> String {
    format!("/{}/_search", index.unwrap_or("_all"))
}

/// Wire URI of the document endpoint for an index
pub(crate) fn doc_uri(index: Option<&str>, id: &str) -> String {
    format!("/{}/_doc/{}", index.unwrap_or("_all"), id)
}
