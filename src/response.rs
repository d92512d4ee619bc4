//! Response normalization and diagnostics
//!
//! Turns a raw transport envelope into a typed [`SearchOutcome`] and logs one
//! structured line per round trip, mirroring the engine's own success and
//! validity flags. This path never fails: malformed payloads degrade the
//! outcome's flags, and a missing debug payload is logged as absent.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, info};

use crate::transport::RawResponse;

/// Diagnostic record populated when a round trip fails or is invalid
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostics {
    /// Wire URI the request was sent to
    pub uri: String,
    /// HTTP status, when one was received
    pub status: Option<u16>,
    /// Raw debug payload captured by the transport
    pub debug_information: Option<String>,
    /// Message of the underlying transport error
    pub error: Option<String>,
    /// Whether the failure was an elapsed deadline
    pub timed_out: bool,
}

/// Normalized result of one search round trip
///
/// Engine and transport failures are reported through the flags, never as an
/// `Err` from `execute()`; the caller decides whether a failed outcome is
/// fatal.
#[derive(Clone, Debug)]
pub struct SearchOutcome<T> {
    /// Transport-level success
    pub success: bool,
    /// Whether the engine answered with a well-formed, error-free payload
    pub valid: bool,
    /// Matched documents, in engine order
    pub documents: Vec<T>,
    /// Total hit count reported by the engine, when present
    pub total_hits: Option<u64>,
    /// Populated only when the outcome is failed or invalid
    pub diagnostics: Option<Diagnostics>,
}

impl<T> SearchOutcome<T> {
    /// Whether the round trip succeeded and the payload was clean
    pub fn is_ok(&self) -> bool {
        self.success && self.valid
    }

    /// Whether the request was abandoned on an elapsed deadline
    pub fn timed_out(&self) -> bool {
        self.diagnostics.as_ref().map_or(false, |d| d.timed_out)
    }
}

/// Normalize a raw engine response into a typed outcome
///
/// Success requires transport-level success and no elapsed deadline.
/// Validity additionally requires a parseable body carrying no engine error
/// payload, with every hit deserializing into `T`; a hit that fails to
/// deserialize is dropped and marks the outcome invalid.
pub fn normalize<T: DeserializeOwned>(raw: RawResponse) -> SearchOutcome<T> {
    let success = raw.success && !raw.timed_out;

    let mut documents = Vec::new();
    let mut total_hits = None;
    let mut valid = success;

    if success {
        match &raw.body {
            Some(body) if body.get("error").is_none() => {
                total_hits = read_total(body);
                for hit in read_hits(body) {
                    match serde_json::from_value::<T>(hit.clone()) {
                        Ok(doc) => documents.push(doc),
                        Err(_) => valid = false,
                    }
                }
            }
            _ => valid = false,
        }
    }

    info!(
        "[success:{}] [valid:{}] {}",
        success, valid, raw.uri
    );
    let diagnostics = if success && valid {
        None
    } else {
        error!(
            "search request failed: uri={} status={:?} timed_out={} error={} debug={}",
            raw.uri,
            raw.status,
            raw.timed_out,
            raw.error.as_deref().unwrap_or("<none>"),
            raw.debug_information.as_deref().unwrap_or("<absent>"),
        );
        Some(Diagnostics {
            uri: raw.uri,
            status: raw.status,
            debug_information: raw.debug_information,
            error: raw.error,
            timed_out: raw.timed_out,
        })
    };

    SearchOutcome {
        success,
        valid,
        documents,
        total_hits,
        diagnostics,
    }
}

/// Pull the `_source` of every hit out of the response body
fn read_hits(body: &Value) -> Vec<&Value> {
    body.get("hits")
        .and_then(|h| h.get("hits"))
        .and_then(Value::as_array)
        .map(|hits| hits.iter().filter_map(|h| h.get("_source")).collect())
        .unwrap_or_default()
}

/// Total hit count; supports both the object and bare-number shapes
fn read_total(body: &Value) -> Option<u64> {
    let total = body.get("hits")?.get("total")?;
    match total {
        Value::Number(n) => n.as_u64(),
        Value::Object(_) => total.get("value").and_then(Value::as_u64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Person {
        name: String,
        age: i64,
    }

    fn hits_body(sources: Vec<Value>) -> Value {
        json!({
            "took": 3,
            "hits": {
                "total": { "value": sources.len() },
                "hits": sources.into_iter().map(|s| json!({ "_source": s })).collect::<Vec<_>>(),
            }
        })
    }

    #[test]
    fn test_normalize_success() {
        let raw = RawResponse::ok(
            "/people/_search",
            hits_body(vec![
                json!({ "name": "后藤", "age": 31 }),
                json!({ "name": "张伟", "age": 25 }),
            ]),
        );
        let outcome: SearchOutcome<Person> = normalize(raw);
        assert!(outcome.is_ok());
        assert_eq!(outcome.total_hits, Some(2));
        assert_eq!(outcome.documents[0].name, "后藤");
        assert_eq!(outcome.documents[1].age, 25);
        assert!(outcome.diagnostics.is_none());
    }

    #[test]
    fn test_normalize_bare_number_total() {
        let raw = RawResponse::ok(
            "/people/_search",
            json!({ "hits": { "total": 7, "hits": [] } }),
        );
        let outcome: SearchOutcome<Person> = normalize(raw);
        assert!(outcome.is_ok());
        assert_eq!(outcome.total_hits, Some(7));
    }

    #[test]
    fn test_normalize_transport_failure() {
        let raw = RawResponse::failure(
            "/people/_search",
            Some(500),
            Some("connection reset".to_string()),
            Some("io error".to_string()),
        );
        let outcome: SearchOutcome<Person> = normalize(raw);
        assert!(!outcome.success);
        assert!(!outcome.valid);
        assert!(outcome.documents.is_empty());
        let diag = outcome.diagnostics.expect("diagnostics populated");
        assert_eq!(diag.uri, "/people/_search");
        assert_eq!(diag.error.as_deref(), Some("io error"));
        assert!(!diag.timed_out);
    }

    #[test]
    fn test_normalize_missing_debug_payload() {
        let raw = RawResponse::failure("/people/_search", None, None, None);
        let outcome: SearchOutcome<Person> = normalize(raw);
        let diag = outcome.diagnostics.expect("diagnostics populated");
        assert!(diag.debug_information.is_none());
    }

    #[test]
    fn test_normalize_engine_error_payload() {
        let raw = RawResponse::ok(
            "/people/_search",
            json!({ "error": { "type": "parsing_exception" } }),
        );
        let outcome: SearchOutcome<Person> = normalize(raw);
        assert!(outcome.success);
        assert!(!outcome.valid);
        assert!(outcome.diagnostics.is_some());
    }

    #[test]
    fn test_normalize_bad_hit_degrades_validity() {
        let raw = RawResponse::ok(
            "/people/_search",
            hits_body(vec![
                json!({ "name": "ok", "age": 1 }),
                json!({ "name": "broken" }),
            ]),
        );
        let outcome: SearchOutcome<Person> = normalize(raw);
        assert!(outcome.success);
        assert!(!outcome.valid);
        assert_eq!(outcome.documents.len(), 1);
    }

    #[test]
    fn test_normalize_timeout() {
        let raw = RawResponse::timeout("/people/_search");
        let outcome: SearchOutcome<Person> = normalize(raw);
        assert!(!outcome.success);
        assert!(outcome.timed_out());
    }
}
