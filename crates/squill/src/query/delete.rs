//! DELETE builder.

use std::sync::Arc;

use crate::client::Connection;
use crate::condition::{Condition, IntoCondition};
use crate::context::Context;
use crate::dialect::Dialect;
use crate::query::{QueryCore, Statement};
use crate::table::Table;
use crate::value::Value;

/// A fluent DELETE. Obtained from [`Table::delete`]. With no filter it
/// compiles to an unconditional delete of the whole table.
#[derive(Clone, Debug)]
pub struct DeleteQuery {
    core: QueryCore,
}

impl DeleteQuery {
    pub(crate) fn from_table(table: &Table) -> Self {
        Self {
            core: QueryCore::from_table(table),
        }
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

    pub(crate) fn render_sql(&self, ctx: &mut Context) -> String {
        let mut parts = Vec::new();
        if let Some(source) = self.core.render_source(ctx) {
            parts.push(format!("DELETE FROM {source}"));
        }
        if let Some(where_sql) = self.core.render_where(ctx) {
            parts.push(where_sql);
        }
        parts.join(" ")
    }
}

impl Statement for DeleteQuery {
    fn render_sql(&self, ctx: &mut Context) -> String {
        DeleteQuery::render_sql(self, ctx)
    }

    fn connection(&self) -> Option<&Arc<dyn Connection>> {
        self.core.conn.as_ref()
    }

    fn dialect(&self) -> &Dialect {
        &self.core.dialect
    }
}
