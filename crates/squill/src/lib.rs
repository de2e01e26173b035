//! # squill
//!
//! A fluent, dialect-aware SQL expression-tree compiler.
//!
//! Statements are built as trees of terms and compiled to parameterized
//! SQL text plus a map of bound values, with placeholders numbered in the
//! order they render. Execution is optional: a statement built from a
//! [`Database`] or a connection-bound [`Table`] can run itself through the
//! [`Connection`] trait, while anything else just compiles.
//!
//! ## Features
//!
//! - **Expression trees**: operators build terms, terms compose into
//!   statements; nothing renders until you compile
//! - **Parameterized by default**: scalar operands become `:N` placeholders
//!   with their values collected in a [`Params`] map
//! - **Dialect hook**: operator respelling and string delimiters per
//!   dialect, e.g. `<>` vs `!=`
//! - **Driver-agnostic**: implement [`Connection`] and [`Cursor`] for any
//!   database client to make statements executable
//!
//! ## Building statements
//!
//! ```ignore
//! use squill::{Database, Statement, TermOps};
//!
//! let db = Database::new(conn);
//! let users = db.table("users");
//!
//! // SELECT
//! let rows = users
//!     .select()
//!     .filter(users.col("age").ge(18))
//!     .order_by([users.col("name").asc()])
//!     .limit(10)
//!     .fetch_all()?;
//!
//! // INSERT
//! users
//!     .insert()
//!     .set("username", "alice")
//!     .set("email", "alice@example.com")
//!     .execute()?;
//!
//! // UPDATE
//! users
//!     .update()
//!     .set("status", "inactive")
//!     .filter_values([("id", user_id)])
//!     .execute()?;
//!
//! // DELETE
//! users.delete().filter_values([("id", user_id)]).execute()?;
//! ```
//!
//! ## Compiling without a connection
//!
//! ```
//! use squill::{Statement, Table, TermOps};
//!
//! let t = Table::new("mytable");
//! let (sql, params) = t.select().filter(t.col("id").eq(42)).compile();
//! assert_eq!(sql, "SELECT * FROM mytable WHERE mytable.id = :1");
//! assert_eq!(params.get("1"), Some(&squill::Value::Int(42)));
//! ```

pub mod client;
pub mod condition;
pub mod context;
pub mod dialect;
pub mod error;
pub mod ops;
pub mod query;
pub mod table;
pub mod term;
pub mod value;

pub use client::{Connection, Cursor, Row};
pub use condition::{Condition, IntoCondition};
pub use context::{Context, Params, RenderMode};
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use ops::{IntoOperand, IntoQueryArg, IntoTerm, ScalarOps, TermOps};
pub use query::{DeleteQuery, InsertQuery, JoinKind, SelectQuery, Statement, UpdateQuery};
pub use table::{Column, Database, Table, TableRef};
pub use term::Term;
pub use value::Value;

/// The traits and types most call sites need.
pub mod prelude {
    pub use crate::client::{Connection, Cursor, Row};
    pub use crate::condition::{Condition, IntoCondition};
    pub use crate::context::{Context, Params};
    pub use crate::dialect::Dialect;
    pub use crate::error::{Error, Result};
    pub use crate::ops::{IntoOperand, IntoQueryArg, IntoTerm, ScalarOps, TermOps};
    pub use crate::query::{DeleteQuery, InsertQuery, SelectQuery, Statement, UpdateQuery};
    pub use crate::table::{Column, Database, Table};
    pub use crate::term::Term;
    pub use crate::value::Value;
}
