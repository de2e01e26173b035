//! Filter and join-condition arguments.
//!
//! A [`Condition`] carries the two shapes a filter call accepts: tree terms
//! (or raw SQL fragments, which become [`Term::Raw`]) and named values. How
//! the two combine is decided by the query builder: named values alone
//! become per-column equality tests, terms are joined by the call's
//! operator, and named values alongside terms seed the parameter map for
//! raw fragments that reference them by name.

use crate::ops::IntoQueryArg;
use crate::query::SelectQuery;
use crate::table::Column;
use crate::term::Term;
use crate::value::Value;

/// Argument bundle for `filter`-family and `join_on` calls.
#[derive(Debug, Default)]
pub struct Condition {
    pub(crate) terms: Vec<Term>,
    pub(crate) named: Vec<(String, Value)>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition term. Strings become raw SQL fragments.
    pub fn term(mut self, term: impl IntoQueryArg) -> Self {
        self.terms.push(term.into_query_arg());
        self
    }

    /// Add a named value.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    /// A condition made of named values only.
    pub fn values<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            terms: Vec::new(),
            named: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.named.is_empty()
    }
}

/// Conversion into a [`Condition`], so filter calls accept nodes, raw SQL
/// strings and prebuilt bundles alike.
pub trait IntoCondition {
    fn into_condition(self) -> Condition;
}

impl IntoCondition for Condition {
    fn into_condition(self) -> Condition {
        self
    }
}

impl IntoCondition for Term {
    fn into_condition(self) -> Condition {
        Condition::new().term(self)
    }
}

impl IntoCondition for Column {
    fn into_condition(self) -> Condition {
        Condition::new().term(self)
    }
}

impl IntoCondition for &Column {
    fn into_condition(self) -> Condition {
        Condition::new().term(self.clone())
    }
}

impl IntoCondition for SelectQuery {
    fn into_condition(self) -> Condition {
        Condition::new().term(self)
    }
}

impl IntoCondition for &str {
    fn into_condition(self) -> Condition {
        Condition::new().term(self)
    }
}

impl IntoCondition for String {
    fn into_condition(self) -> Condition {
        Condition::new().term(self)
    }
}

impl<T: IntoQueryArg> IntoCondition for Vec<T> {
    fn into_condition(self) -> Condition {
        Condition {
            terms: self.into_iter().map(IntoQueryArg::into_query_arg).collect(),
            named: Vec::new(),
        }
    }
}

impl<T: IntoQueryArg, const N: usize> IntoCondition for [T; N] {
    fn into_condition(self) -> Condition {
        Condition {
            terms: self.into_iter().map(IntoQueryArg::into_query_arg).collect(),
            named: Vec::new(),
        }
    }
}
