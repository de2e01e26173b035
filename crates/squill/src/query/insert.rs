//! INSERT builder.

use std::sync::Arc;

use crate::client::Connection;
use crate::context::{Context, RenderMode};
use crate::dialect::Dialect;
use crate::ops::IntoOperand;
use crate::query::{QueryCore, SetMap, Statement};
use crate::table::{Column, Table};
use crate::term::Term;

/// A fluent INSERT. Obtained from [`Table::insert`].
///
/// Renders in insert mode, so column names appear unqualified in the
/// column list regardless of their table binding.
#[derive(Clone, Debug)]
pub struct InsertQuery {
    core: QueryCore,
    values: SetMap,
}

impl InsertQuery {
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

    /// Assign a value to a column object.
    pub fn set_col(mut self, column: &Column, value: impl IntoOperand) -> Self {
        self.values.set(column.clone(), value.into_operand());
        self
    }

    /// Consume an assignment pair from [`Column::set`].
    pub fn assign(mut self, pair: (Column, Term)) -> Self {
        self.values.set(pair.0, pair.1);
        self
    }

    pub(crate) fn render_sql(&self, ctx: &mut Context) -> String {
        let prev = ctx.mode();
        ctx.set_mode(RenderMode::Insert);
        let source = self.core.render_source(ctx).unwrap_or_default();
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for (column, value) in self.values.iter() {
            columns.push(column.render(ctx));
            values.push(value.render(ctx));
        }
        let sql = format!(
            "INSERT INTO {source} ({}) VALUES ({})",
            columns.join(", "),
            values.join(", ")
        );
        ctx.set_mode(prev);
        sql
    }
}

impl Statement for InsertQuery {
    fn render_sql(&self, ctx: &mut Context) -> String {
        InsertQuery::render_sql(self, ctx)
    }

    fn connection(&self) -> Option<&Arc<dyn Connection>> {
        self.core.conn.as_ref()
    }

    fn dialect(&self) -> &Dialect {
        &self.core.dialect
    }
}
