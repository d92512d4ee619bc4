//! Clause construction and compilation
//!
//! A [`Clause`] is one atomic condition contributed to the compiled boolean
//! query. Construction is collapsed into one tagged enum parameterized by
//! operator and value kind instead of one method per combination; negation is
//! expressed by which builder list the clause is appended to. The
//! [`Clause::nested`] wrapper scopes any inner clause to single elements of a
//! nested document array.
//!
//! Compiled wire shapes:
//!
//! ```json
//! { "term": { "age": { "value": 20 } } }
//! { "range": { "age": { "lt": 30.0 } } }
//! { "range": { "born": { "gte": "2024-05-01T10:30:00||/d", "time_zone": "+08:00" } } }
//! { "query_string": { "default_field": "name", "query": "姓名", "minimum_should_match": 1 } }
//! { "terms": { "items.kind": ["a", "b"] } }
//! { "nested": { "path": "items", "query": { "bool": { "must": [ ... ] } } } }
//! ```

use chrono::NaiveDateTime;
use serde_json::{json, Value};

use crate::field::FieldPath;
use crate::query::types::{CompareOp, DateRounding, TermValue};

/// One atomic condition of a boolean query
#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    /// Exact match on a scalar field
    Term { field: FieldPath, value: TermValue },
    /// Numeric range comparison
    Range {
        field: FieldPath,
        op: CompareOp,
        value: f64,
    },
    /// 64-bit integer range comparison
    LongRange {
        field: FieldPath,
        op: CompareOp,
        value: i64,
    },
    /// Date range comparison against an anchored, rounded instant
    ///
    /// The anchor is a local datetime interpreted in `time_zone` and snapped
    /// to the `rounding` boundary by the engine before comparison.
    DateRange {
        field: FieldPath,
        op: CompareOp,
        anchor: NaiveDateTime,
        time_zone: String,
        rounding: DateRounding,
    },
    /// Scored free-text match over one field
    QueryString {
        field: FieldPath,
        query: String,
        /// Root-level matches require at least one matching term; inside a
        /// nested scope the engine default applies and this is `None`
        minimum_should_match: Option<u32>,
    },
    /// Membership of the field value in a list
    Terms {
        field: FieldPath,
        values: Vec<TermValue>,
    },
    /// Scope restriction: evaluate `inner` against single elements of the
    /// array at `path`
    Nested {
        path: String,
        inner: Box<Clause>,
        /// Return and explain the matching inner element
        inner_hits: bool,
    },
}

impl Clause {
    /// Exact term match
    pub fn term(field: FieldPath, value: impl Into<TermValue>) -> Self {
        Clause::Term {
            field,
            value: value.into(),
        }
    }

    /// Numeric range comparison
    pub fn range(field: FieldPath, op: CompareOp, value: f64) -> Self {
        Clause::Range { field, op, value }
    }

    /// 64-bit integer range comparison
    pub fn long_range(field: FieldPath, op: CompareOp, value: i64) -> Self {
        Clause::LongRange { field, op, value }
    }

    /// Date range comparison
    ///
    /// `time_zone` is an offset string such as `"+08:00"`. The anchor is
    /// rounded to the `rounding` unit, which decides boundary inclusion:
    /// rounding to [`DateRounding::Day`] collapses a `Gte` on any instant to
    /// the start of that day in the given zone.
    pub fn date_range(
        field: FieldPath,
        op: CompareOp,
        anchor: NaiveDateTime,
        time_zone: impl Into<String>,
        rounding: DateRounding,
    ) -> Self {
        Clause::DateRange {
            field,
            op,
            anchor,
            time_zone: time_zone.into(),
            rounding,
        }
    }

    /// Root-level free-text match
    ///
    /// Carries `minimum_should_match = 1` so at least one term of the query
    /// text must match.
    pub fn query_string(field: FieldPath, query: impl Into<String>) -> Self {
        Clause::QueryString {
            field,
            query: query.into(),
            minimum_should_match: Some(1),
        }
    }

    /// Membership of the field value in a list of terms
    pub fn terms<V: Into<TermValue>>(field: FieldPath, values: impl IntoIterator<Item = V>) -> Self {
        Clause::Terms {
            field,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Wrap a clause in a nested scope bound to `path`
    ///
    /// The inner clause is evaluated against single elements of the array at
    /// `path` rather than the root document. A wrapped free-text match drops
    /// its minimum-should-match (the engine default applies inside the
    /// scope); a wrapped membership clause enables inner hits so the caller
    /// can recover which sub-document matched.
    pub fn nested(path: &FieldPath, inner: Clause) -> Self {
        let inner_hits = matches!(inner, Clause::Terms { .. });
        let inner = match inner {
            Clause::QueryString { field, query, .. } => Clause::QueryString {
                field,
                query,
                minimum_should_match: None,
            },
            other => other,
        };
        Clause::Nested {
            path: path.wire_name().to_string(),
            inner: Box::new(inner),
            inner_hits,
        }
    }

    /// Whether this clause is scope-wrapped
    pub fn is_nested(&self) -> bool {
        matches!(self, Clause::Nested { .. })
    }

    /// Compile to the engine's JSON query DSL
    pub fn to_json(&self) -> Value {
        match self {
            Clause::Term { field, value } => json!({
                "term": { field.wire_name(): { "value": value.to_json() } }
            }),
            Clause::Range { field, op, value } => json!({
                "range": { field.wire_name(): { op.wire_key(): value } }
            }),
            Clause::LongRange { field, op, value } => json!({
                "range": { field.wire_name(): { op.wire_key(): value } }
            }),
            Clause::DateRange {
                field,
                op,
                anchor,
                time_zone,
                rounding,
            } => {
                let anchored = format!(
                    "{}||/{}",
                    anchor.format("%Y-%m-%dT%H:%M:%S"),
                    rounding.wire_suffix()
                );
                json!({
                    "range": {
                        field.wire_name(): {
                            op.wire_key(): anchored,
                            "time_zone": time_zone,
                        }
                    }
                })
            }
            Clause::QueryString {
                field,
                query,
                minimum_should_match,
            } => {
                let mut body = json!({
                    "default_field": field.wire_name(),
                    "query": query,
                });
                if let Some(msm) = minimum_should_match {
                    body["minimum_should_match"] = json!(msm);
                }
                json!({ "query_string": body })
            }
            Clause::Terms { field, values } => {
                let values: Vec<Value> = values.iter().map(TermValue::to_json).collect();
                json!({ "terms": { field.wire_name(): values } })
            }
            Clause::Nested {
                path,
                inner,
                inner_hits,
            } => {
                // Membership clauses sit directly under the nested query;
                // everything else keeps the bool/must wrapper.
                let inner_body = if matches!(**inner, Clause::Terms { .. }) {
                    inner.to_json()
                } else {
                    json!({ "bool": { "must": [inner.to_json()] } })
                };
                let mut body = json!({ "path": path, "query": inner_body });
                if *inner_hits {
                    body["inner_hits"] = json!({ "explain": true });
                }
                json!({ "nested": body })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn field(descriptor: &str) -> FieldPath {
        FieldPath::resolve(descriptor).unwrap()
    }

    #[test]
    fn test_term_clause() {
        let clause = Clause::term(field("Age"), 20);
        assert_eq!(
            clause.to_json(),
            json!({ "term": { "age": { "value": 20 } } })
        );
    }

    #[test]
    fn test_term_clause_string_value() {
        let clause = Clause::term(field("Name"), "姓名");
        assert_eq!(
            clause.to_json(),
            json!({ "term": { "name": { "value": "姓名" } } })
        );
    }

    #[test]
    fn test_numeric_range_clause() {
        let clause = Clause::range(field("Score"), CompareOp::Gte, 59.5);
        assert_eq!(
            clause.to_json(),
            json!({ "range": { "score": { "gte": 59.5 } } })
        );
    }

    #[test]
    fn test_long_range_clause() {
        let clause = Clause::long_range(field("Age"), CompareOp::Lt, 30);
        assert_eq!(
            clause.to_json(),
            json!({ "range": { "age": { "lt": 30 } } })
        );
    }

    #[test]
    fn test_date_range_clause_rounds_and_zones() {
        let anchor = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let clause = Clause::date_range(
            field("Born"),
            CompareOp::Gte,
            anchor,
            "+08:00",
            DateRounding::Day,
        );
        assert_eq!(
            clause.to_json(),
            json!({
                "range": {
                    "born": {
                        "gte": "2024-05-01T10:30:00||/d",
                        "time_zone": "+08:00",
                    }
                }
            })
        );
    }

    #[test]
    fn test_query_string_clause_requires_one_match() {
        let clause = Clause::query_string(field("Name"), "类型");
        assert_eq!(
            clause.to_json(),
            json!({
                "query_string": {
                    "default_field": "name",
                    "query": "类型",
                    "minimum_should_match": 1,
                }
            })
        );
    }

    #[test]
    fn test_terms_clause() {
        let clause = Clause::terms(field("Tags"), ["a", "b"]);
        assert_eq!(
            clause.to_json(),
            json!({ "terms": { "tags": ["a", "b"] } })
        );
    }

    #[test]
    fn test_scope_wrapping_is_observable() {
        let leaf = FieldPath::resolve_nested("Items", "Name").unwrap();
        let path = field("Items");
        assert!(!Clause::term(field("Age"), 20).is_nested());
        assert!(Clause::nested(&path, Clause::term(leaf, "book")).is_nested());
    }

    #[test]
    fn test_nested_wrapper_scopes_inner_clause() {
        let leaf = FieldPath::resolve_nested("Items", "Name").unwrap();
        let path = field("Items");
        let clause = Clause::nested(&path, Clause::query_string(leaf, "类型"));
        assert!(clause.is_nested());
        assert_eq!(
            clause.to_json(),
            json!({
                "nested": {
                    "path": "items",
                    "query": {
                        "bool": {
                            "must": [{
                                "query_string": {
                                    "default_field": "items.name",
                                    "query": "类型",
                                }
                            }]
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_nested_membership_keeps_inner_hits() {
        let leaf = FieldPath::resolve_nested("Items", "Kind").unwrap();
        let path = field("Items");
        let clause = Clause::nested(&path, Clause::terms(leaf, [1i64, 2, 3]));
        assert_eq!(
            clause.to_json(),
            json!({
                "nested": {
                    "path": "items",
                    "inner_hits": { "explain": true },
                    "query": { "terms": { "items.kind": [1, 2, 3] } }
                }
            })
        );
    }

    #[test]
    fn test_nested_term_keeps_bool_wrapper() {
        let leaf = FieldPath::resolve_nested("Items", "Kind").unwrap();
        let path = field("Items");
        let clause = Clause::nested(&path, Clause::term(leaf, "book"));
        assert_eq!(
            clause.to_json(),
            json!({
                "nested": {
                    "path": "items",
                    "query": {
                        "bool": {
                            "must": [{ "term": { "items.kind": { "value": "book" } } }]
                        }
                    }
                }
            })
        );
    }
}
