//! Query construction and compilation
//!
//! Builds the engine's structured boolean query out of typed clauses:
//!
//! ```json
//! {
//!   "query": {
//!     "bool": {
//!       "must": [
//!         { "term": { "age": { "value": 20 } } },
//!         { "nested": { "path": "items", "query": { "bool": { "must": [
//!           { "query_string": { "default_field": "items.name", "query": "类型" } }
//!         ] } } } }
//!       ]
//!     }
//!   },
//!   "from": 0,
//!   "size": 50,
//!   "sort": [{ "age": { "order": "desc" } }]
//! }
//! ```

pub mod builder;
pub mod clause;
pub mod types;

pub use builder::SearchQuery;
pub use clause::Clause;
pub use types::{CompareOp, DateRounding, SortOrder, SortSpec, TermValue};
