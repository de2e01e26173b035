//! Table and database factories.
//!
//! A [`Table`] hands out cached [`Column`] references and query builders
//! pre-bound to itself. A [`Database`] hands out cached `Table`s, wiring its
//! connection handle and dialect into every one, so queries built from those
//! tables are execution-ready. Caches are create-once, read-many; entries
//! are never evicted or mutated after creation. Neither cache is designed
//! for concurrent writers; share across threads behind external
//! synchronization or use per-worker instances.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::client::Connection;
use crate::context::{Context, RenderMode};
use crate::dialect::Dialect;
use crate::ops::IntoOperand;
use crate::query::{DeleteQuery, InsertQuery, SelectQuery, UpdateQuery};
use crate::term::Term;

/// Immutable render info for a table: name plus optional alias. Shared by a
/// [`Table`], its columns and the queries built from it.
#[derive(Clone, Debug)]
pub struct TableRef {
    name: Arc<str>,
    alias: Option<Arc<str>>,
}

impl TableRef {
    fn new(name: &str, alias: Option<&str>) -> Self {
        Self {
            name: name.into(),
            alias: alias.map(Into::into),
        }
    }

    /// The table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The alias, if one was set.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The qualifier columns render with: the alias when set, else the name.
    pub(crate) fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Render as a source clause: `name` or `name AS alias`.
    pub(crate) fn render(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {}", self.name, alias),
            None => self.name.to_string(),
        }
    }
}

#[derive(Debug)]
struct ColumnInner {
    name: String,
    table: Option<TableRef>,
}

/// A column reference: `(table-or-none, column-name)`.
///
/// Clones share one allocation, so repeated lookups of a name on one table
/// hand out the same cached instance. Equality and hashing go by the
/// `(table name, column name)` pair, which is what update/insert value maps
/// key on.
#[derive(Clone, Debug)]
pub struct Column {
    inner: Arc<ColumnInner>,
}

impl Column {
    /// Create an unbound column (renders bare, never qualified).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ColumnInner {
                name: name.into(),
                table: None,
            }),
        }
    }

    pub(crate) fn bound(name: impl Into<String>, table: TableRef) -> Self {
        Self {
            inner: Arc::new(ColumnInner {
                name: name.into(),
                table: Some(table),
            }),
        }
    }

    /// The column name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The table this column is bound to, if any.
    pub fn table(&self) -> Option<&TableRef> {
        self.inner.table.as_ref()
    }

    /// Pair this column with a value for update/insert value maps. The value
    /// goes through the standard operand wrapping (raw scalars become
    /// parameters).
    pub fn set(&self, value: impl IntoOperand) -> (Column, Term) {
        (self.clone(), value.into_operand())
    }

    /// Whether two handles are the same cached instance (not just equal).
    pub fn same_instance(&self, other: &Column) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn render(&self, ctx: &Context) -> String {
        match (&self.inner.table, ctx.mode()) {
            (Some(table), RenderMode::Standard) => {
                format!("{}.{}", table.qualifier(), self.inner.name)
            }
            _ => self.inner.name.clone(),
        }
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        let table_name = |c: &Column| c.inner.table.as_ref().map(|t| t.name().to_string());
        self.inner.name == other.inner.name && table_name(self) == table_name(other)
    }
}

impl Eq for Column {}

impl std::hash::Hash for Column {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if let Some(table) = &self.inner.table {
            table.name().hash(state);
        }
        self.inner.name.hash(state);
    }
}

struct TableInner {
    meta: TableRef,
    conn: Option<Arc<dyn Connection>>,
    dialect: Dialect,
    columns: Mutex<HashMap<String, Column>>,
}

/// A SQL table: a factory for cached [`Column`]s and for query builders
/// pre-bound to itself.
#[derive(Clone)]
pub struct Table {
    inner: Arc<TableInner>,
}

impl Table {
    /// Create a table with no alias, connection or dialect overrides.
    pub fn new(name: &str) -> Self {
        Self::build(name, None, None, Dialect::default())
    }

    /// Create a table with an alias. The alias is used both when the table
    /// renders as a source (`name AS alias`) and as the qualifier on its
    /// columns.
    pub fn with_alias(name: &str, alias: &str) -> Self {
        Self::build(name, Some(alias), None, Dialect::default())
    }

    pub(crate) fn build(
        name: &str,
        alias: Option<&str>,
        conn: Option<Arc<dyn Connection>>,
        dialect: Dialect,
    ) -> Self {
        Self {
            inner: Arc::new(TableInner {
                meta: TableRef::new(name, alias),
                conn,
                dialect,
                columns: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Bind a connection handle, making queries built from this table
    /// execution-ready. Returns a fresh table (the column cache starts
    /// empty).
    pub fn with_connection(&self, conn: Arc<dyn Connection>) -> Self {
        Self::build(
            self.inner.meta.name(),
            self.inner.meta.alias(),
            Some(conn),
            self.inner.dialect.clone(),
        )
    }

    /// Use `dialect` for queries built from this table. Returns a fresh
    /// table.
    pub fn with_dialect(&self, dialect: Dialect) -> Self {
        Self::build(
            self.inner.meta.name(),
            self.inner.meta.alias(),
            self.inner.conn.clone(),
            dialect,
        )
    }

    /// The table name.
    pub fn name(&self) -> &str {
        self.inner.meta.name()
    }

    /// Get-or-create the column named `name`. Repeated calls for one name
    /// return the same cached instance.
    pub fn col(&self, name: &str) -> Column {
        let mut columns = self.inner.columns.lock().expect("column cache poisoned");
        columns
            .entry(name.to_string())
            .or_insert_with(|| Column::bound(name, self.inner.meta.clone()))
            .clone()
    }

    /// A `SELECT` query over this table (all columns unless narrowed).
    pub fn select(&self) -> SelectQuery {
        SelectQuery::from_table(self)
    }

    /// An `INSERT` query into this table.
    pub fn insert(&self) -> InsertQuery {
        InsertQuery::from_table(self)
    }

    /// An `UPDATE` query against this table.
    pub fn update(&self) -> UpdateQuery {
        UpdateQuery::from_table(self)
    }

    /// A `DELETE` query against this table.
    pub fn delete(&self) -> DeleteQuery {
        DeleteQuery::from_table(self)
    }

    pub(crate) fn meta(&self) -> TableRef {
        self.inner.meta.clone()
    }

    pub(crate) fn connection(&self) -> Option<Arc<dyn Connection>> {
        self.inner.conn.clone()
    }

    pub(crate) fn dialect(&self) -> &Dialect {
        &self.inner.dialect
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.inner.meta.name())
            .field("alias", &self.inner.meta.alias())
            .finish_non_exhaustive()
    }
}

/// A SQL database: a factory for cached [`Table`]s, propagating its
/// connection handle and dialect to every table it creates.
#[derive(Clone)]
pub struct Database {
    conn: Arc<dyn Connection>,
    dialect: Dialect,
    tables: Arc<Mutex<HashMap<String, Table>>>,
}

impl Database {
    /// Create a database over `conn` with the default dialect.
    pub fn new(conn: Arc<dyn Connection>) -> Self {
        Self {
            conn,
            dialect: Dialect::default(),
            tables: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Use `dialect` for every table and query created from this database.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Get-or-create the table named `name`, bound to this database's
    /// connection and dialect. Repeated calls return the same cached table.
    pub fn table(&self, name: &str) -> Table {
        let mut tables = self.tables.lock().expect("table cache poisoned");
        tables
            .entry(name.to_string())
            .or_insert_with(|| {
                Table::build(name, None, Some(self.conn.clone()), self.dialect.clone())
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_cache_identity() {
        let table = Table::new("mytable");
        let a = table.col("foo");
        let b = table.col("foo");
        assert!(a.same_instance(&b));
        assert_eq!(a, b);
        assert!(!a.same_instance(&table.col("bar")));
    }

    #[test]
    fn test_columns_from_distinct_tables_differ() {
        let t1 = Table::new("one");
        let t2 = Table::new("two");
        assert_ne!(t1.col("foo"), t2.col("foo"));
        assert!(!t1.col("foo").same_instance(&t2.col("foo")));
    }

    #[test]
    fn test_column_hash_by_pair() {
        use std::collections::HashSet;
        let table = Table::new("mytable");
        let mut set = HashSet::new();
        set.insert(table.col("foo"));
        assert!(set.contains(&table.col("foo")));
        assert!(!set.contains(&table.col("bar")));
    }

    #[test]
    fn test_column_render_qualified() {
        let ctx = Context::new();
        let table = Table::new("mytable");
        assert_eq!(table.col("foo").render(&ctx), "mytable.foo");
        assert_eq!(Column::new("foo").render(&ctx), "foo");
    }

    #[test]
    fn test_column_render_with_alias_qualifier() {
        let ctx = Context::new();
        let table = Table::with_alias("mytable", "t");
        assert_eq!(table.col("foo").render(&ctx), "t.foo");
    }

    #[test]
    fn test_column_render_insert_mode_unqualified() {
        let mut ctx = Context::new();
        ctx.set_mode(RenderMode::Insert);
        let table = Table::new("mytable");
        assert_eq!(table.col("foo").render(&ctx), "foo");
    }

    #[test]
    fn test_table_render() {
        assert_eq!(Table::new("t").meta().render(), "t");
        assert_eq!(Table::with_alias("t", "x").meta().render(), "t AS x");
    }

    #[test]
    fn test_database_table_cache() {
        struct NullConnection;
        impl Connection for NullConnection {
            fn cursor(&self) -> crate::error::Result<Box<dyn crate::client::Cursor + '_>> {
                Err(crate::error::Error::connection("no backend"))
            }
        }

        let db = Database::new(Arc::new(NullConnection));
        let a = db.table("users");
        let b = db.table("users");
        // Same cached table, so the column cache is shared too.
        assert!(a.col("id").same_instance(&b.col("id")));
        assert!(a.connection().is_some());
    }
}
