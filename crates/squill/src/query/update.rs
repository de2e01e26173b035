//! UPDATE builder.

use std::sync::Arc;

use crate::client::Connection;
use crate::condition::{Condition, IntoCondition};
use crate::context::Context;
use crate::dialect::Dialect;
use crate::ops::IntoOperand;
use crate::query::{QueryCore, SetMap, Statement};
use crate::table::{Column, Table};
use crate::term::Term;
use crate::value::Value;

/// A fluent UPDATE. Obtained from [`Table::update`].
#[derive(Clone, Debug)]
pub struct UpdateQuery {
    core: QueryCore,
    values: SetMap,
}

impl UpdateQuery {
    pub(crate) fn from_table(table: &Table) -> Self {
        Self {
            core: QueryCore::from_table(table),
            values: SetMap::default(),
        }
    }

    /// Assign a value to a column named against the bound table. Assigning
    /// the same column again replaces the earlier value.
    pub fn set(mut self, name: &str, value: impl IntoOperand) -> Self {
        let column = self.core.column(name);
        self.values.set(column, value.into_operand());
        self
    }

    /// Assign a value to a column object, e.g. one from another table.
    pub fn set_col(mut self, column: &Column, value: impl IntoOperand) -> Self {
        self.values.set(column.clone(), value.into_operand());
        self
    }

    /// Consume an assignment pair from [`Column::set`].
    pub fn assign(mut self, pair: (Column, Term)) -> Self {
        self.values.set(pair.0, pair.1);
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

    pub(crate) fn render_sql(&self, ctx: &mut Context) -> String {
        let mut parts = Vec::new();
        if let Some(source) = self.core.render_source(ctx) {
            parts.push(format!("UPDATE {source}"));
        }
        let assignments: Vec<String> = self
            .values
            .iter()
            .map(|(column, value)| format!("{} = {}", column.render(ctx), value.render(ctx)))
            .collect();
        parts.push(format!("SET {}", assignments.join(", ")));
        if let Some(where_sql) = self.core.render_where(ctx) {
            parts.push(where_sql);
        }
        parts.join(" ")
    }
}

impl Statement for UpdateQuery {
    fn render_sql(&self, ctx: &mut Context) -> String {
        UpdateQuery::render_sql(self, ctx)
    }

    fn connection(&self) -> Option<&Arc<dyn Connection>> {
        self.core.conn.as_ref()
    }

    fn dialect(&self) -> &Dialect {
        &self.core.dialect
    }
}
