//! elastiq — typed query construction for Elasticsearch-compatible engines
//!
//! Express filter predicates, pagination and sort order against a typed
//! document schema; the builder compiles them into the engine's boolean-query
//! JSON DSL and issues the request through a caller-supplied transport.
//!
//! ```no_run
//! use std::sync::Arc;
//! use elastiq::{Clause, CompareOp, FieldPath, SearchContext};
//!
//! # async fn example(transport: Arc<dyn elastiq::SearchTransport>) -> elastiq::Result<()> {
//! #[derive(serde::Deserialize)]
//! struct Person { name: String, age: i64 }
//!
//! let ctx = SearchContext::new(transport).with_default_index("people")?;
//! let mut query = ctx.query::<Person>();
//! query
//!     .must(Clause::term(FieldPath::resolve("Name")?, "姓名"))
//!     .must(Clause::long_range(FieldPath::resolve("Age")?, CompareOp::Gte, 20))
//!     .sort_descending(FieldPath::resolve("Age")?);
//! query.skip(0)?.take(50)?;
//! let outcome = query.execute().await;
//! assert!(outcome.is_ok());
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod field;
pub mod query;
pub mod response;
pub mod testing;
pub mod transport;

pub use context::SearchContext;
pub use error::{ElastiqError, Result};
pub use field::FieldPath;
pub use query::{Clause, CompareOp, DateRounding, SearchQuery, SortOrder, TermValue};
pub use response::{Diagnostics, SearchOutcome};
pub use transport::{RawResponse, SearchTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
