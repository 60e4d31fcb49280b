//! The data-fetch collaborator contract.
//!
//! Orrery widgets never talk to a network themselves. A host supplies a
//! [`RowSource`], an opaque async query function over tabular data; the
//! widgets only describe *which* columns they need via [`QueryOptions`]
//! and consume the [`QueryReply`] rows. Rows are JSON maps because the
//! backing dataset's column names are not known to this crate.
//!
//! # Example
//!
//! ```
//! use orrery::query::{QueryFuture, QueryOptions, QueryReply, Row, RowSource};
//!
//! /// A source backed by an in-memory table.
//! struct FixedSource {
//!     rows: Vec<Row>,
//! }
//!
//! impl RowSource for FixedSource {
//!     fn query(&self, options: QueryOptions) -> QueryFuture {
//!         let data = self
//!             .rows
//!             .iter()
//!             .map(|row| {
//!                 row.iter()
//!                     .filter(|(name, _)| options.selects(name))
//!                     .map(|(name, value)| (name.clone(), value.clone()))
//!                     .collect()
//!             })
//!             .collect();
//!         Box::pin(async move { Ok(QueryReply { data }) })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

/// A single result row: column name to value, with no fixed schema.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// The future type returned by [`RowSource::query`].
pub type QueryFuture = Pin<Box<dyn Future<Output = Result<QueryReply, QueryError>> + Send>>;

/// Selects which columns a query should retrieve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Column names to retrieve. Empty means every column.
    pub select: Vec<String>,
}

impl QueryOptions {
    /// Select every column.
    pub fn all() -> Self {
        Self::default()
    }

    /// Select a single column.
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            select: vec![name.into()],
        }
    }

    /// Add a column to the selection (builder pattern).
    pub fn with_column(mut self, name: impl Into<String>) -> Self {
        self.select.push(name.into());
        self
    }

    /// Check whether a column is part of the selection.
    pub fn selects(&self, name: &str) -> bool {
        self.select.is_empty() || self.select.iter().any(|s| s == name)
    }
}

/// The result of a query: zero or more rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryReply {
    /// The retrieved rows, in the source's order.
    pub data: Vec<Row>,
}

/// Errors surfaced by a [`RowSource`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    /// The source could not be reached.
    #[error("query transport failed: {0}")]
    Transport(String),
    /// The source rejected the request.
    #[error("query rejected: {0}")]
    Rejected(String),
    /// The reply could not be decoded into rows.
    #[error("malformed query reply: {0}")]
    Malformed(String),
}

/// An asynchronous source of tabular rows.
///
/// Implementations wrap whatever transport the host uses (HTTP, a local
/// database, a fixture table in tests). Errors surface through the
/// returned future; the widgets treat them as non-fatal.
pub trait RowSource: Send + Sync {
    /// Retrieve rows, restricted to the columns in `options`.
    fn query(&self, options: QueryOptions) -> QueryFuture;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_options_selection() {
        let options = QueryOptions::column("host_name").with_column("disc_year");
        assert!(options.selects("host_name"));
        assert!(options.selects("disc_year"));
        assert!(!options.selects("pl_name"));

        // An empty selection means "everything".
        assert!(QueryOptions::all().selects("anything"));
    }

    #[test]
    fn test_reply_round_trips_through_json() {
        let mut row = Row::new();
        row.insert("host_name".into(), json!("Kepler-22"));
        row.insert("disc_year".into(), json!(2011));
        let reply = QueryReply { data: vec![row] };

        let text = serde_json::to_string(&reply).unwrap();
        let back: QueryReply = serde_json::from_str(&text).unwrap();
        assert_eq!(back, reply);
    }
}
