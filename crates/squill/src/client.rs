//! Driver-facing traits.
//!
//! The compiler itself never talks to a database; it hands finished SQL and
//! bound values to whatever implements [`Connection`]. Statements built
//! from a [`Database`](crate::table::Database) or a connection-bound
//! [`Table`](crate::table::Table) can then execute themselves through this
//! seam.

use crate::context::Params;
use crate::error::Result;
use crate::value::Value;

/// One fetched row, positionally matching the statement's output columns.
pub type Row = Vec<Value>;

/// A database session able to hand out cursors.
pub trait Connection: Send + Sync {
    fn cursor(&self) -> Result<Box<dyn Cursor + '_>>;
}

/// An open statement handle.
///
/// `execute` receives the compiled SQL with `:name` placeholders and the
/// parameter map to bind; how placeholders are translated to the driver's
/// native binding style is the implementation's concern.
pub trait Cursor {
    fn execute(&mut self, sql: &str, params: &Params) -> Result<()>;

    /// Fetch up to `size` rows from the active result set.
    fn fetch_many(&mut self, size: usize) -> Result<Vec<Row>>;

    /// Drain the active result set.
    fn fetch_all(&mut self) -> Result<Vec<Row>>;
}
