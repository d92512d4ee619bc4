//! Per-request query accumulation, compilation and execution
//!
//! A [`SearchQuery`] is created per logical search request, mutated by one
//! caller, and discarded after execution. It accumulates ordered must and
//! must-not clause lists, an optional index override, pagination, and at most
//! one sort directive; `compile` is a pure function of that state and
//! `execute` is the single suspension point.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::error::{ElastiqError, Result};
use crate::field::FieldPath;
use crate::query::clause::Clause;
use crate::query::types::{SortOrder, SortSpec};
use crate::response::{normalize, SearchOutcome};
use crate::transport::{search_uri, RawResponse, SearchTransport};

/// Typed query builder bound to an entity type `T`
///
/// Not safe for concurrent mutation: concurrent callers must use independent
/// builders. Obtained from [`SearchContext::query`](crate::SearchContext::query).
pub struct SearchQuery<T> {
    transport: Arc<dyn SearchTransport>,
    default_index: Option<String>,
    index: Option<String>,
    must: Vec<Clause>,
    must_not: Vec<Clause>,
    skip: Option<u64>,
    take: Option<u64>,
    sort: Option<SortSpec>,
    timeout: Option<Duration>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for SearchQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchQuery").finish_non_exhaustive()
    }
}

impl<T> SearchQuery<T> {
    pub(crate) fn new(transport: Arc<dyn SearchTransport>, default_index: Option<String>) -> Self {
        Self {
            transport,
            default_index,
            index: None,
            must: Vec::new(),
            must_not: Vec::new(),
            skip: None,
            take: None,
            sort: None,
            timeout: None,
            _entity: PhantomData,
        }
    }

    /// Target a specific index instead of the connection default
    ///
    /// An explicitly supplied name must be non-blank.
    pub fn index(&mut self, name: &str) -> Result<&mut Self> {
        if name.trim().is_empty() {
            return Err(ElastiqError::InvalidArgument(
                "index name must not be blank".to_string(),
            ));
        }
        self.index = Some(name.to_string());
        Ok(self)
    }

    /// Append a clause to the conjunctive (AND) group
    ///
    /// Order is preserved; no deduplication.
    pub fn must(&mut self, clause: Clause) -> &mut Self {
        self.must.push(clause);
        self
    }

    /// Append a clause to the negated (NOT) group
    pub fn must_not(&mut self, clause: Clause) -> &mut Self {
        self.must_not.push(clause);
        self
    }

    /// Number of leading hits to skip
    ///
    /// Rejects negative values; builder state is unchanged on error.
    pub fn skip(&mut self, skip: i64) -> Result<&mut Self> {
        if skip < 0 {
            return Err(ElastiqError::InvalidArgument(
                "skip must not be negative".to_string(),
            ));
        }
        self.skip = Some(skip as u64);
        Ok(self)
    }

    /// Maximum number of hits to return
    ///
    /// Rejects negative values. Zero means unset: only strictly positive
    /// values constrain result size, otherwise the engine's default page size
    /// applies.
    pub fn take(&mut self, take: i64) -> Result<&mut Self> {
        if take < 0 {
            return Err(ElastiqError::InvalidArgument(
                "take must not be negative".to_string(),
            ));
        }
        self.take = Some(take as u64);
        Ok(self)
    }

    /// Sort ascending on a field, replacing any previous sort directive
    pub fn sort_ascending(&mut self, field: FieldPath) -> &mut Self {
        self.sort = Some(SortSpec {
            field,
            order: SortOrder::Asc,
        });
        self
    }

    /// Sort descending on a field, replacing any previous sort directive
    pub fn sort_descending(&mut self, field: FieldPath) -> &mut Self {
        self.sort = Some(SortSpec {
            field,
            order: SortOrder::Desc,
        });
        self
    }

    /// Abandon the round trip if the engine has not answered within `limit`
    ///
    /// An elapsed deadline yields a failed outcome whose diagnostics carry
    /// the timed-out marker, distinguishable from other transport failures.
    pub fn timeout(&mut self, limit: Duration) -> &mut Self {
        self.timeout = Some(limit);
        self
    }

    /// Compile the accumulated state into the engine's JSON query body
    ///
    /// Pure function of the builder state. Each bool group is emitted iff its
    /// own clause list is non-empty; `from` is always emitted (default 0);
    /// `size` only when take is strictly positive; the sort array only when a
    /// directive is present.
    pub fn compile(&self) -> Value {
        let mut bool_body = Map::new();
        if !self.must.is_empty() {
            let clauses: Vec<Value> = self.must.iter().map(Clause::to_json).collect();
            bool_body.insert("must".to_string(), Value::Array(clauses));
        }
        if !self.must_not.is_empty() {
            let clauses: Vec<Value> = self.must_not.iter().map(Clause::to_json).collect();
            bool_body.insert("must_not".to_string(), Value::Array(clauses));
        }

        let mut body = json!({
            "query": { "bool": Value::Object(bool_body) },
            "from": self.skip.unwrap_or(0),
        });
        if let Some(take) = self.take {
            if take > 0 {
                body["size"] = json!(take);
            }
        }
        if let Some(sort) = &self.sort {
            body["sort"] = sort.to_json();
        }
        body
    }

    /// The index this request targets, if any
    fn target_index(&self) -> Option<&str> {
        self.index.as_deref().or(self.default_index.as_deref())
    }
}

impl<T: DeserializeOwned> SearchQuery<T> {
    /// Compile, send, and normalize one search round trip
    ///
    /// Engine and transport failures are folded into the returned outcome's
    /// flags and diagnostics; this never returns an error for them.
    pub async fn execute(self) -> SearchOutcome<T> {
        let body = self.compile();
        let index = self.target_index();
        let raw = match self.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.transport.search(index, &body)).await {
                    Ok(raw) => raw,
                    Err(_) => RawResponse::timeout(search_uri(index)),
                }
            }
            None => self.transport.search(index, &body).await,
        };
        normalize(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SearchContext;
    use crate::query::types::CompareOp;
    use crate::testing::CannedTransport;

    #[derive(Debug, serde::Deserialize)]
    struct Person {
        #[allow(dead_code)]
        name: String,
    }

    fn query() -> SearchQuery<Person> {
        SearchContext::new(Arc::new(CannedTransport::with_hits(vec![]))).query::<Person>()
    }

    fn field(descriptor: &str) -> FieldPath {
        FieldPath::resolve(descriptor).unwrap()
    }

    #[test]
    fn test_empty_query_compiles_to_bare_bool() {
        let q = query();
        assert_eq!(q.compile(), json!({ "query": { "bool": {} }, "from": 0 }));
    }

    #[test]
    fn test_must_emitted_independently_of_must_not() {
        let mut q = query();
        q.must(Clause::term(field("Age"), 20));
        let body = q.compile();
        assert!(body["query"]["bool"]["must"].is_array());
        assert!(body["query"]["bool"].get("must_not").is_none());

        let mut q = query();
        q.must_not(Clause::term(field("Age"), 20));
        let body = q.compile();
        assert!(body["query"]["bool"].get("must").is_none());
        assert!(body["query"]["bool"]["must_not"].is_array());
    }

    #[test]
    fn test_must_order_preserved() {
        let mut q = query();
        q.must(Clause::term(field("A"), 1))
            .must(Clause::long_range(field("B"), CompareOp::Gte, 2))
            .must(Clause::term(field("C"), 3));
        let body = q.compile();
        let must = body["query"]["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 3);
        assert!(must[0].get("term").is_some());
        assert!(must[1].get("range").is_some());
        assert_eq!(must[2], json!({ "term": { "c": { "value": 3 } } }));
    }

    #[test]
    fn test_pagination_emission() {
        let mut q = query();
        q.skip(5).unwrap().take(50).unwrap();
        let body = q.compile();
        assert_eq!(body["from"], json!(5));
        assert_eq!(body["size"], json!(50));
    }

    #[test]
    fn test_take_zero_means_engine_default() {
        let mut q = query();
        q.skip(0).unwrap().take(0).unwrap();
        let body = q.compile();
        assert_eq!(body["from"], json!(0));
        assert!(body.get("size").is_none());
    }

    #[test]
    fn test_negative_pagination_rejected_without_state_change() {
        let mut q = query();
        assert!(q.skip(-1).is_err());
        assert!(q.take(-1).is_err());
        let body = q.compile();
        assert_eq!(body["from"], json!(0));
        assert!(body.get("size").is_none());
    }

    #[test]
    fn test_blank_index_rejected() {
        let mut q = query();
        assert!(q.index("").is_err());
        assert!(q.index("   ").is_err());
        assert!(q.index("people").is_ok());
    }

    #[test]
    fn test_later_sort_replaces_earlier() {
        let mut q = query();
        q.sort_descending(field("Age"));
        q.sort_ascending(field("Name"));
        let body = q.compile();
        assert_eq!(body["sort"], json!([{ "name": { "order": "asc" } }]));
    }
}
