//! Database layer for sqlgauge.
//!
//! Everything that touches the SQLite engine lives here: cell/row value
//! types, the query executor with timing and error capture, catalog
//! introspection queries, and the pure result-set comparator.

mod compare;
pub mod sqlite;
mod types;

pub use compare::rows_equivalent;
pub use sqlite::{QueryExecutor, SAMPLE_ROW_LIMIT};
pub use types::{ExecutionResult, Row, Value};
