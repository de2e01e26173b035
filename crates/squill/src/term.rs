//! Expression-tree nodes.
//!
//! [`Term`] is the closed set of renderable nodes a query tree is built
//! from. Rendering is a single depth-first pass over the tree that produces
//! SQL text and, as a side effect, allocates placeholders in the
//! [`Context`](crate::Context). Trees themselves are built by pure chaining
//! and never render until `compile()`.

use crate::context::Context;
use crate::query::SelectQuery;
use crate::table::{Column, TableRef};
use crate::value::Value;

/// Canonical composite templates. Dialects override these by exact match.
pub(crate) mod template {
    pub const GROUP: &str = "({})";
    pub const ALIAS: &str = "{} AS {}";
    pub const ASC: &str = "{} ASC";
    pub const DESC: &str = "{} DESC";
    pub const MAX: &str = "MAX({})";
    pub const MIN: &str = "MIN({})";
    pub const COUNT: &str = "COUNT({})";
    pub const SUM: &str = "SUM({})";
    pub const IS_NULL: &str = "{} IS NULL";
    pub const IS_NOT_NULL: &str = "{} IS NOT NULL";
    pub const IN: &str = "{} IN {}";
    pub const NOT_IN: &str = "{} NOT IN {}";
    pub const LIKE: &str = "{} LIKE {}";
    pub const AND: &str = "{} AND {}";
    pub const OR: &str = "{} OR {}";
    pub const LT: &str = "{} < {}";
    pub const LE: &str = "{} <= {}";
    pub const EQ: &str = "{} = {}";
    pub const NE: &str = "{} <> {}";
    pub const GT: &str = "{} > {}";
    pub const GE: &str = "{} >= {}";
    pub const ADD: &str = "{} + {}";
    pub const SUB: &str = "{} - {}";
    pub const MUL: &str = "{} * {}";
    pub const DIV: &str = "{} / {}";
    pub const MOD: &str = "{} % {}";
}

/// A renderable expression-tree node.
#[derive(Clone, Debug)]
pub enum Term {
    /// A column reference, qualified by its table unless rendering an
    /// INSERT column list.
    Column(Column),
    /// A scalar rendered inline, never parameterized.
    Literal(Value),
    /// A scalar bound through a fresh sequential placeholder at render time.
    Param(Value),
    /// Arbitrary text rendered verbatim. The explicit escape hatch.
    Raw(String),
    /// A format template over an ordered list of children.
    Composite(Composite),
    /// Children joined by a fixed separator.
    Joined(Joined),
    /// AND/OR-joined children with precedence-preserving parenthesization.
    Conditional(Conditional),
    /// A nested SELECT used as an operand or source.
    Subquery(Box<SelectQuery>),
    /// A table source, rendered `name` or `name AS alias`.
    Table(TableRef),
}

impl Term {
    /// Literal node constructor.
    pub fn literal(value: impl Into<Value>) -> Term {
        Term::Literal(value.into())
    }

    /// Parameter node constructor.
    pub fn param(value: impl Into<Value>) -> Term {
        Term::Param(value.into())
    }

    /// Raw SQL node constructor.
    pub fn raw(sql: impl Into<String>) -> Term {
        Term::Raw(sql.into())
    }

    /// Join `terms` with the default `", "` separator.
    pub fn joined(terms: Vec<Term>) -> Term {
        Term::Joined(Joined::new(terms, ", "))
    }

    /// AND-join `terms` into a conditional.
    pub fn all(terms: Vec<Term>) -> Term {
        Term::Conditional(Conditional::new(terms, false, Vec::new()))
    }

    /// OR-join `terms` into a conditional.
    pub fn any(terms: Vec<Term>) -> Term {
        Term::Conditional(Conditional::new(terms, true, Vec::new()))
    }

    /// Parenthesize this term. Idempotent: grouping an already-grouped
    /// composite returns it unchanged.
    pub fn group(self) -> Term {
        match self {
            Term::Composite(c) if c.template == template::GROUP => Term::Composite(c),
            other => Term::Composite(Composite::new(template::GROUP, vec![other])),
        }
    }

    /// Render this term to SQL, allocating placeholders in `ctx` as
    /// parameter nodes are reached (depth-first, left to right).
    pub fn render(&self, ctx: &mut Context) -> String {
        match self {
            Term::Column(col) => col.render(ctx),
            Term::Literal(value) => ctx.resolve_literal(value),
            Term::Param(value) => ctx.resolve_param(value.clone()),
            Term::Raw(sql) => sql.clone(),
            Term::Composite(c) => c.render(ctx),
            Term::Joined(j) => j.render(ctx),
            Term::Conditional(c) => c.render(ctx),
            Term::Subquery(q) => q.render_sql(ctx),
            Term::Table(t) => t.render(),
        }
    }
}

/// A format template with a fixed ordered list of children. The template is
/// looked up in the dialect override table before substitution, so a dialect
/// can respell an entire operator.
#[derive(Clone, Debug)]
pub struct Composite {
    pub(crate) template: String,
    pub(crate) terms: Vec<Term>,
}

impl Composite {
    pub(crate) fn new(tpl: impl Into<String>, terms: Vec<Term>) -> Self {
        Self {
            template: tpl.into(),
            terms,
        }
    }

    fn render(&self, ctx: &mut Context) -> String {
        let tpl = ctx.dialect().operator_template(&self.template).to_string();
        let args: Vec<String> = self.terms.iter().map(|t| t.render(ctx)).collect();
        apply_template(&tpl, &args)
    }
}

/// Children rendered in order and joined by a fixed separator.
#[derive(Clone, Debug)]
pub struct Joined {
    pub(crate) terms: Vec<Term>,
    separator: String,
}

impl Joined {
    pub(crate) fn new(terms: Vec<Term>, separator: impl Into<String>) -> Self {
        Self {
            terms,
            separator: separator.into(),
        }
    }

    fn render(&self, ctx: &mut Context) -> String {
        let parts: Vec<String> = self.terms.iter().map(|t| t.render(ctx)).collect();
        parts.join(&self.separator)
    }
}

/// AND/OR-joined children.
///
/// On construction, a child that is itself a multi-term conditional joined
/// by the *other* operator is parenthesized, making precedence explicit in
/// the output instead of relying on SQL operator precedence. A conditional
/// may also carry named seed values merged into the context before its
/// children render, pre-binding placeholders referenced by raw SQL.
#[derive(Clone, Debug)]
pub struct Conditional {
    pub(crate) terms: Vec<Term>,
    pub(crate) any: bool,
    seed: Vec<(String, Value)>,
}

impl Conditional {
    pub(crate) fn new(terms: Vec<Term>, any: bool, seed: Vec<(String, Value)>) -> Self {
        let terms = if terms.len() > 1 {
            terms
                .into_iter()
                .map(|term| match term {
                    Term::Conditional(c) if c.terms.len() > 1 && c.any != any => {
                        Term::Conditional(c).group()
                    }
                    other => other,
                })
                .collect()
        } else {
            terms
        };
        Self { terms, any, seed }
    }

    pub(crate) fn render(&self, ctx: &mut Context) -> String {
        for (name, value) in &self.seed {
            ctx.seed(name.clone(), value.clone());
        }
        let sep = if self.any { " OR " } else { " AND " };
        let parts: Vec<String> = self.terms.iter().map(|t| t.render(ctx)).collect();
        parts.join(sep)
    }
}

/// Substitute `args` into the `{}` slots of `tpl`, in order.
fn apply_template(tpl: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(tpl.len());
    let mut slots = tpl.split("{}");
    if let Some(first) = slots.next() {
        out.push_str(first);
    }
    for (i, rest) in slots.enumerate() {
        if let Some(arg) = args.get(i) {
            out.push_str(arg);
        }
        out.push_str(rest);
    }
    out
}
