//! SELECT builder.

use std::sync::Arc;

use crate::client::Connection;
use crate::condition::{Condition, IntoCondition};
use crate::context::Context;
use crate::dialect::Dialect;
use crate::ops::IntoQueryArg;
use crate::query::{JoinKind, QueryCore, Statement};
use crate::table::Table;
use crate::term::Term;
use crate::value::Value;

/// A fluent SELECT. Obtained from [`Table::select`] or built standalone
/// with [`SelectQuery::new`] plus [`source`](SelectQuery::source).
///
/// Every method consumes and returns the builder; compile or execute it
/// through the [`Statement`] trait.
#[derive(Clone, Debug)]
pub struct SelectQuery {
    core: QueryCore,
    outputs: Vec<Term>,
    distinct: bool,
    group_by: Vec<Term>,
    order_by: Vec<Term>,
    limit: Option<Term>,
    offset: Option<Term>,
}

impl SelectQuery {
    /// A builder with no source, connection or dialect binding.
    pub fn new() -> Self {
        Self::with_core(QueryCore::detached())
    }

    pub(crate) fn from_table(table: &Table) -> Self {
        Self::with_core(QueryCore::from_table(table))
    }

    fn with_core(core: QueryCore) -> Self {
        Self {
            core,
            outputs: Vec::new(),
            distinct: false,
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Set the FROM source: a table, a raw SQL string, or another query
    /// (which is parenthesized).
    pub fn source(mut self, source: impl IntoQueryArg) -> Self {
        self.core.source = Some(source.into_query_arg());
        self
    }

    /// Add one output term. With no outputs the query selects `*`.
    pub fn column(mut self, output: impl IntoQueryArg) -> Self {
        self.outputs.push(output.into_query_arg());
        self
    }

    /// Add several output terms.
    pub fn columns<I>(mut self, outputs: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoQueryArg,
    {
        self.outputs
            .extend(outputs.into_iter().map(IntoQueryArg::into_query_arg));
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn group_by<I>(mut self, terms: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoQueryArg,
    {
        self.group_by
            .extend(terms.into_iter().map(IntoQueryArg::into_query_arg));
        self
    }

    /// Add ordering terms; mark direction with
    /// [`asc`](crate::ops::TermOps::asc) / [`desc`](crate::ops::TermOps::desc).
    pub fn order_by<I>(mut self, terms: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoQueryArg,
    {
        self.order_by
            .extend(terms.into_iter().map(IntoQueryArg::into_query_arg));
        self
    }

    pub fn limit(mut self, limit: impl IntoQueryArg) -> Self {
        self.limit = Some(limit.into_query_arg());
        self
    }

    pub fn offset(mut self, offset: impl IntoQueryArg) -> Self {
        self.offset = Some(offset.into_query_arg());
        self
    }

    /// AND a condition into the WHERE clause.
    pub fn filter(mut self, cond: impl IntoCondition) -> Self {
        self.core.add_where(cond.into_condition(), false);
        self
    }

    /// OR a condition into the WHERE clause.
    pub fn or_filter(mut self, cond: impl IntoCondition) -> Self {
        self.core.add_where(cond.into_condition(), true);
        self
    }

    /// AND per-column equality tests for each `(name, value)` pair.
    pub fn filter_values<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.core.add_where(Condition::values(pairs), false);
        self
    }

    /// OR per-column equality tests for each `(name, value)` pair.
    pub fn or_filter_values<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.core.add_where(Condition::values(pairs), true);
        self
    }

    /// Append a join of the given kind. An empty condition yields a bare
    /// join with no ON clause.
    pub fn join_as(
        mut self,
        kind: JoinKind,
        source: impl IntoQueryArg,
        on: impl IntoCondition,
    ) -> Self {
        self.core
            .add_join(kind, source.into_query_arg(), Some(on.into_condition()));
        self
    }

    pub fn join(self, source: impl IntoQueryArg) -> Self {
        self.join_as(JoinKind::Join, source, Condition::new())
    }

    pub fn join_on(self, source: impl IntoQueryArg, on: impl IntoCondition) -> Self {
        self.join_as(JoinKind::Join, source, on)
    }

    pub fn inner_join(self, source: impl IntoQueryArg, on: impl IntoCondition) -> Self {
        self.join_as(JoinKind::Inner, source, on)
    }

    pub fn outer_join(self, source: impl IntoQueryArg, on: impl IntoCondition) -> Self {
        self.join_as(JoinKind::Outer, source, on)
    }

    pub fn left_join(self, source: impl IntoQueryArg, on: impl IntoCondition) -> Self {
        self.join_as(JoinKind::Left, source, on)
    }

    pub fn right_join(self, source: impl IntoQueryArg, on: impl IntoCondition) -> Self {
        self.join_as(JoinKind::Right, source, on)
    }

    /// Wrap this query as the parenthesized FROM source of a fresh SELECT.
    /// The new query keeps the dialect but drops the connection and the
    /// table binding, so filters on it use bare column names referring to
    /// the inner query's outputs.
    pub fn subselect(self) -> SelectQuery {
        Self::with_core(QueryCore::from_query(self))
    }

    pub(crate) fn render_sql(&self, ctx: &mut Context) -> String {
        let mut parts = vec![if self.distinct {
            "SELECT DISTINCT".to_string()
        } else {
            "SELECT".to_string()
        }];
        if self.outputs.is_empty() {
            parts.push("*".to_string());
        } else {
            let outputs: Vec<String> = self.outputs.iter().map(|t| t.render(ctx)).collect();
            parts.push(outputs.join(", "));
        }
        if let Some(source) = self.core.render_source(ctx) {
            parts.push(format!("FROM {source}"));
        }
        parts.extend(self.core.render_joins(ctx));
        if let Some(where_sql) = self.core.render_where(ctx) {
            parts.push(where_sql);
        }
        if !self.group_by.is_empty() {
            let terms: Vec<String> = self.group_by.iter().map(|t| t.render(ctx)).collect();
            parts.push(format!("GROUP BY {}", terms.join(", ")));
        }
        if !self.order_by.is_empty() {
            let terms: Vec<String> = self.order_by.iter().map(|t| t.render(ctx)).collect();
            parts.push(format!("ORDER BY {}", terms.join(", ")));
        }
        if let Some(limit) = &self.limit {
            parts.push(format!("LIMIT {}", limit.render(ctx)));
        }
        if let Some(offset) = &self.offset {
            parts.push(format!("OFFSET {}", offset.render(ctx)));
        }
        parts.join(" ")
    }
}

impl Default for SelectQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl Statement for SelectQuery {
    fn render_sql(&self, ctx: &mut Context) -> String {
        SelectQuery::render_sql(self, ctx)
    }

    fn connection(&self) -> Option<&Arc<dyn Connection>> {
        self.core.conn.as_ref()
    }

    fn dialect(&self) -> &Dialect {
        &self.core.dialect
    }
}
