//! Statement builders.
//!
//! Each builder owns a [`QueryCore`] with the state every statement shares:
//! the source, the bound table for resolving bare column names, the
//! connection and dialect inherited from the table or database that created
//! it, the WHERE tree and the join list. The [`Statement`] trait is the
//! common compile/execute surface.

use std::fmt;
use std::sync::Arc;

use crate::client::{Connection, Cursor, Row};
use crate::condition::Condition;
use crate::context::{Context, Params};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::ops::TermOps;
use crate::table::{Column, Table, TableRef};
use crate::term::{Conditional, Term};

mod delete;
mod insert;
mod select;
mod update;

#[cfg(test)]
mod tests;

pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use select::SelectQuery;
pub use update::UpdateQuery;

// ==================== Statement ====================

/// The common surface of a built statement: compile to SQL plus bound
/// values, or execute against the inherited connection.
pub trait Statement {
    /// Render into an existing compilation context. Placeholder numbering
    /// continues from whatever the context already holds.
    fn render_sql(&self, ctx: &mut Context) -> String;

    /// The connection inherited at build time, if any.
    fn connection(&self) -> Option<&Arc<dyn Connection>>;

    /// The dialect this statement compiles under.
    fn dialect(&self) -> &Dialect;

    /// Compile to SQL text and the parameter map, in a fresh context.
    fn compile(&self) -> (String, Params) {
        let mut ctx = Context::with_dialect(self.dialect().clone());
        let sql = self.render_sql(&mut ctx);
        (sql, ctx.into_params())
    }

    /// Compile and discard the parameter map.
    fn compile_sql(&self) -> String {
        self.compile().0
    }

    /// Compile and execute, returning the open cursor.
    fn execute(&self) -> Result<Box<dyn Cursor + '_>> {
        let conn = self.connection().ok_or(Error::MissingConnection)?;
        let (sql, params) = self.compile();
        tracing::debug!(sql = %sql, params = params.len(), "executing statement");
        let mut cursor = conn.cursor()?;
        cursor.execute(&sql, &params)?;
        Ok(cursor)
    }

    /// Execute and fetch up to `size` rows.
    fn fetch_many(&self, size: usize) -> Result<Vec<Row>> {
        self.execute()?.fetch_many(size)
    }

    /// Execute and drain the result set.
    fn fetch_all(&self) -> Result<Vec<Row>> {
        self.execute()?.fetch_all()
    }
}

// ==================== QueryCore ====================

/// State shared by all four builders.
#[derive(Clone)]
pub(crate) struct QueryCore {
    pub(crate) source: Option<Term>,
    pub(crate) table: Option<TableRef>,
    pub(crate) conn: Option<Arc<dyn Connection>>,
    pub(crate) dialect: Dialect,
    pub(crate) where_clause: Option<Conditional>,
    pub(crate) joins: Vec<Join>,
}

impl QueryCore {
    /// A builder with no source; one must be supplied before compiling.
    pub(crate) fn detached() -> Self {
        Self {
            source: None,
            table: None,
            conn: None,
            dialect: Dialect::default(),
            where_clause: None,
            joins: Vec::new(),
        }
    }

    /// A builder sourced on a table, inheriting its connection and dialect.
    pub(crate) fn from_table(table: &Table) -> Self {
        Self {
            source: Some(Term::Table(table.meta())),
            table: Some(table.meta()),
            conn: table.connection(),
            dialect: table.dialect().clone(),
            where_clause: None,
            joins: Vec::new(),
        }
    }

    /// A builder sourced on a parenthesized sub-query. The inner query's
    /// dialect carries over; its connection and table binding do not, so
    /// bare column names now refer to the sub-query's outputs.
    pub(crate) fn from_query(query: SelectQuery) -> Self {
        let dialect = query.dialect().clone();
        Self {
            source: Some(Term::Subquery(Box::new(query)).group()),
            table: None,
            conn: None,
            dialect,
            where_clause: None,
            joins: Vec::new(),
        }
    }

    /// Fold one filter call into the WHERE tree.
    ///
    /// Named values without terms become per-column equality tests against
    /// the bound table, joined by AND. Terms are joined by the call's
    /// operator, with named values seeding the parameter map for raw SQL
    /// that references them. A prior WHERE tree is combined with the new
    /// one by the call's operator.
    pub(crate) fn add_where(&mut self, cond: Condition, any: bool) {
        if cond.is_empty() {
            return;
        }
        let clause = if cond.terms.is_empty() {
            let terms = cond
                .named
                .into_iter()
                .map(|(name, value)| match &self.table {
                    Some(meta) => Column::bound(name, meta.clone()).eq(value),
                    None => Column::new(name).eq(value),
                })
                .collect();
            Conditional::new(terms, false, Vec::new())
        } else {
            Conditional::new(cond.terms, any, cond.named)
        };
        self.where_clause = Some(match self.where_clause.take() {
            Some(prev) => Conditional::new(
                vec![Term::Conditional(prev), Term::Conditional(clause)],
                any,
                Vec::new(),
            ),
            None => clause,
        });
    }

    /// Append a join. A condition with terms becomes the ON tree (named
    /// values seed it); a condition with named values only, or none at all,
    /// yields a bare join.
    pub(crate) fn add_join(&mut self, kind: JoinKind, source: Term, on: Option<Condition>) {
        let on = on.and_then(|cond| {
            if cond.terms.is_empty() {
                None
            } else {
                Some(Conditional::new(cond.terms, false, cond.named))
            }
        });
        self.joins.push(Join { kind, source, on });
    }

    pub(crate) fn render_source(&self, ctx: &mut Context) -> Option<String> {
        self.source.as_ref().map(|s| s.render(ctx))
    }

    pub(crate) fn render_joins(&self, ctx: &mut Context) -> Vec<String> {
        self.joins.iter().map(|j| j.render(ctx)).collect()
    }

    pub(crate) fn render_where(&self, ctx: &mut Context) -> Option<String> {
        self.where_clause
            .as_ref()
            .map(|w| format!("WHERE {}", w.render(ctx)))
    }

    /// Resolve a bare column name against the bound table, if any.
    pub(crate) fn column(&self, name: &str) -> Column {
        match &self.table {
            Some(meta) => Column::bound(name, meta.clone()),
            None => Column::new(name),
        }
    }
}

impl fmt::Debug for QueryCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCore")
            .field("source", &self.source)
            .field("table", &self.table)
            .field("connected", &self.conn.is_some())
            .field("where_clause", &self.where_clause)
            .field("joins", &self.joins)
            .finish()
    }
}

// ==================== Joins ====================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Join,
    Inner,
    Outer,
    Left,
    Right,
}

impl JoinKind {
    fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Join => "JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Outer => "OUTER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Join {
    kind: JoinKind,
    source: Term,
    on: Option<Conditional>,
}

impl Join {
    fn render(&self, ctx: &mut Context) -> String {
        let mut sql = format!("{} {}", self.kind.as_sql(), self.source.render(ctx));
        if let Some(on) = &self.on {
            sql.push_str(" ON ");
            sql.push_str(&on.render(ctx));
        }
        sql
    }
}

// ==================== SetMap ====================

/// Column assignments for UPDATE and INSERT, in insertion order. Assigning
/// a column already present replaces its value in place.
#[derive(Clone, Debug, Default)]
pub(crate) struct SetMap {
    entries: Vec<(Column, Term)>,
}

impl SetMap {
    pub(crate) fn set(&mut self, column: Column, value: Term) {
        if let Some(entry) = self.entries.iter_mut().find(|(c, _)| *c == column) {
            entry.1 = value;
        } else {
            self.entries.push((column, value));
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &(Column, Term)> {
        self.entries.iter()
    }
}
