//! Test support: an in-memory canned transport
//!
//! Stands in for the remote engine in unit and integration tests. Serves a
//! fixed hit list for searches, keeps an id-keyed document map for the
//! pass-through operations, records every search body for wire-shape
//! assertions, and can simulate failures and slow engines.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::transport::{doc_uri, search_uri, RawResponse, SearchTransport};

/// One recorded search round trip
#[derive(Clone, Debug)]
pub struct RecordedSearch {
    pub index: Option<String>,
    pub body: Value,
}

enum Mode {
    Respond,
    Fail {
        debug_information: Option<String>,
        error: Option<String>,
    },
}

/// In-memory engine double
pub struct CannedTransport {
    hits: Vec<Value>,
    mode: Mode,
    delay: Option<Duration>,
    documents: Mutex<HashMap<String, Value>>,
    searches: Mutex<Vec<RecordedSearch>>,
}

impl CannedTransport {
    /// Transport whose searches answer with the given `_source` payloads
    pub fn with_hits(hits: Vec<Value>) -> Self {
        Self {
            hits,
            mode: Mode::Respond,
            delay: None,
            documents: Mutex::new(HashMap::new()),
            searches: Mutex::new(Vec::new()),
        }
    }

    /// Transport whose every round trip fails with the given diagnostics
    pub fn failing(debug_information: Option<&str>, error: Option<&str>) -> Self {
        Self {
            hits: Vec::new(),
            mode: Mode::Fail {
                debug_information: debug_information.map(str::to_string),
                error: error.map(str::to_string),
            },
            delay: None,
            documents: Mutex::new(HashMap::new()),
            searches: Mutex::new(Vec::new()),
        }
    }

    /// Delay every response, for exercising deadlines
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Seed the id-keyed document map served by `get`
    pub fn with_document(self, id: &str, source: Value) -> Self {
        self.documents
            .lock()
            .expect("document map poisoned")
            .insert(id.to_string(), source);
        self
    }

    /// Every search body recorded so far, oldest first
    pub fn searches(&self) -> Vec<RecordedSearch> {
        self.searches
            .lock()
            .expect("search log poisoned")
            .clone()
    }

    /// The most recent search body, if any
    pub fn last_search(&self) -> Option<RecordedSearch> {
        self.searches().pop()
    }

    /// Number of documents currently held
    pub fn document_count(&self) -> usize {
        self.documents.lock().expect("document map poisoned").len()
    }

    async fn simulate_latency(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn failure_for(&self, uri: String) -> Option<RawResponse> {
        match &self.mode {
            Mode::Respond => None,
            Mode::Fail {
                debug_information,
                error,
            } => Some(RawResponse::failure(
                uri,
                Some(500),
                debug_information.clone(),
                error.clone(),
            )),
        }
    }
}

/// Build an engine-shaped search body around `_source` payloads
pub fn search_hits_body(sources: &[Value]) -> Value {
    json!({
        "took": 1,
        "timed_out": false,
        "hits": {
            "total": { "value": sources.len(), "relation": "eq" },
            "hits": sources
                .iter()
                .map(|source| json!({ "_source": source }))
                .collect::<Vec<_>>(),
        }
    })
}

#[async_trait]
impl SearchTransport for CannedTransport {
    async fn search(&self, index: Option<&str>, body: &Value) -> RawResponse {
        self.searches
            .lock()
            .expect("search log poisoned")
            .push(RecordedSearch {
                index: index.map(str::to_string),
                body: body.clone(),
            });
        self.simulate_latency().await;
        let uri = search_uri(index);
        if let Some(failure) = self.failure_for(uri.clone()) {
            return failure;
        }
        RawResponse::ok(uri, search_hits_body(&self.hits))
    }

    async fn get(&self, index: Option<&str>, id: &str) -> RawResponse {
        self.simulate_latency().await;
        let uri = doc_uri(index, id);
        if let Some(failure) = self.failure_for(uri.clone()) {
            return failure;
        }
        let documents = self.documents.lock().expect("document map poisoned");
        let body = match documents.get(id) {
            Some(source) => json!({ "_id": id, "found": true, "_source": source }),
            None => json!({ "_id": id, "found": false }),
        };
        RawResponse::ok(uri, body)
    }

    async fn bulk_index(&self, index: Option<&str>, docs: Vec<Value>) -> RawResponse {
        self.simulate_latency().await;
        let uri = format!("/{}/_bulk", index.unwrap_or("_all"));
        if let Some(failure) = self.failure_for(uri.clone()) {
            return failure;
        }
        let mut documents = self.documents.lock().expect("document map poisoned");
        for doc in docs {
            let id = format!("auto-{}", documents.len() + 1);
            documents.insert(id, doc);
        }
        RawResponse::ok(uri, json!({ "errors": false }))
    }

    async fn update(&self, index: Option<&str>, id: &str, doc: Value) -> RawResponse {
        self.simulate_latency().await;
        let uri = format!("/{}/_update/{}", index.unwrap_or("_all"), id);
        if let Some(failure) = self.failure_for(uri.clone()) {
            return failure;
        }
        self.documents
            .lock()
            .expect("document map poisoned")
            .insert(id.to_string(), doc);
        RawResponse::ok(uri, json!({ "result": "updated" }))
    }
}
