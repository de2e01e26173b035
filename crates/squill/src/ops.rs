//! Operand wrapping and the operator algebra.
//!
//! Three conversions cover every place a tree accepts an argument:
//!
//! - [`IntoTerm`]: plain node conversion, no wrapping. Implemented by node
//!   types only.
//! - [`IntoOperand`]: the operator-operand rule, applied independently to
//!   each side of a binary operator. A query or composite term is
//!   parenthesized; any other node passes through; a raw scalar becomes a
//!   parameter. Operator methods never special-case scalar vs. tree inputs.
//! - [`IntoQueryArg`]: clause-argument normalization for select lists,
//!   ordering, sources and conditions. Strings become raw SQL, scalars
//!   become literals, queries are parenthesized.
//!
//! [`TermOps`] is the named operator surface on nodes; [`ScalarOps`] is its
//! mirror for raw scalar left-hand sides. Rust operator overloads (`+ - * /
//! % & |`) are layered on top for the operators Rust can express.

use crate::query::SelectQuery;
use crate::table::{Column, Table};
use crate::term::{template, Composite, Term};
use crate::value::Value;

/// Plain conversion into a tree node.
pub trait IntoTerm {
    fn into_term(self) -> Term;
}

impl IntoTerm for Term {
    fn into_term(self) -> Term {
        self
    }
}

impl IntoTerm for Column {
    fn into_term(self) -> Term {
        Term::Column(self)
    }
}

impl IntoTerm for &Column {
    fn into_term(self) -> Term {
        Term::Column(self.clone())
    }
}

impl IntoTerm for SelectQuery {
    fn into_term(self) -> Term {
        Term::Subquery(Box::new(self))
    }
}

impl IntoTerm for &Table {
    fn into_term(self) -> Term {
        Term::Table(self.meta())
    }
}

/// Conversion into an operator operand.
pub trait IntoOperand {
    fn into_operand(self) -> Term;
}

impl IntoOperand for Term {
    fn into_operand(self) -> Term {
        match self {
            t @ (Term::Composite(_) | Term::Subquery(_)) => t.group(),
            t => t,
        }
    }
}

impl IntoOperand for Column {
    fn into_operand(self) -> Term {
        Term::Column(self)
    }
}

impl IntoOperand for &Column {
    fn into_operand(self) -> Term {
        Term::Column(self.clone())
    }
}

impl IntoOperand for SelectQuery {
    fn into_operand(self) -> Term {
        self.into_term().group()
    }
}

macro_rules! impl_operand_scalar {
    ($($t:ty),*) => {
        $(impl IntoOperand for $t {
            fn into_operand(self) -> Term {
                Term::Param(self.into())
            }
        })*
    };
}

impl_operand_scalar!(
    Value, bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, &str, String
);

/// Normalization for clause arguments (select lists, ordering, sources,
/// condition terms).
pub trait IntoQueryArg {
    fn into_query_arg(self) -> Term;
}

impl IntoQueryArg for Term {
    fn into_query_arg(self) -> Term {
        self
    }
}

impl IntoQueryArg for Column {
    fn into_query_arg(self) -> Term {
        Term::Column(self)
    }
}

impl IntoQueryArg for &Column {
    fn into_query_arg(self) -> Term {
        Term::Column(self.clone())
    }
}

impl IntoQueryArg for &Table {
    fn into_query_arg(self) -> Term {
        Term::Table(self.meta())
    }
}

impl IntoQueryArg for SelectQuery {
    fn into_query_arg(self) -> Term {
        self.into_term().group()
    }
}

impl IntoQueryArg for &str {
    fn into_query_arg(self) -> Term {
        Term::Raw(self.to_string())
    }
}

impl IntoQueryArg for String {
    fn into_query_arg(self) -> Term {
        Term::Raw(self)
    }
}

macro_rules! impl_query_arg_scalar {
    ($($t:ty),*) => {
        $(impl IntoQueryArg for $t {
            fn into_query_arg(self) -> Term {
                Term::Literal(self.into())
            }
        })*
    };
}

impl_query_arg_scalar!(Value, bool, i8, i16, i32, i64, u8, u16, u32, f32, f64);

fn binary(tpl: &'static str, lhs: Term, rhs: Term) -> Term {
    Term::Composite(Composite::new(tpl, vec![lhs, rhs]))
}

fn unary(tpl: &'static str, term: Term) -> Term {
    Term::Composite(Composite::new(tpl, vec![term]))
}

/// The operator algebra on tree nodes.
///
/// Binary methods normalize both operands through [`IntoOperand`] and
/// produce a composite term with a canonical template, which dialects may
/// respell at render time.
pub trait TermOps: IntoTerm + Sized {
    /// This node as an operator operand (queries and composites grouped).
    fn operand(self) -> Term {
        self.into_term().into_operand()
    }

    /// Parenthesize. Idempotent on already-grouped terms.
    fn group(self) -> Term {
        self.into_term().group()
    }

    /// Name this term as an output: `term AS name`.
    fn alias(self, name: &str) -> Term {
        binary(template::ALIAS, self.into_term(), Term::Raw(name.to_string()))
    }

    /// Ascending order marker.
    fn asc(self) -> Term {
        unary(template::ASC, self.into_term())
    }

    /// Descending order marker.
    fn desc(self) -> Term {
        unary(template::DESC, self.into_term())
    }

    /// `MAX(term)`.
    fn max(self) -> Term {
        unary(template::MAX, self.into_term())
    }

    /// `MIN(term)`.
    fn min(self) -> Term {
        unary(template::MIN, self.into_term())
    }

    /// `COUNT(term)`.
    fn count(self) -> Term {
        unary(template::COUNT, self.into_term())
    }

    /// `SUM(term)`.
    fn sum(self) -> Term {
        unary(template::SUM, self.into_term())
    }

    /// `term IS NULL`.
    fn is_null(self) -> Term {
        unary(template::IS_NULL, self.into_term())
    }

    /// `term IS NOT NULL`.
    fn is_not_null(self) -> Term {
        unary(template::IS_NOT_NULL, self.into_term())
    }

    /// `term IN (values...)`.
    fn in_list<I>(self, values: I) -> Term
    where
        I: IntoIterator,
        I::Item: IntoOperand,
    {
        let list = Term::joined(values.into_iter().map(IntoOperand::into_operand).collect());
        binary(template::IN, self.into_term(), list.group())
    }

    /// `term NOT IN (values...)`.
    fn not_in<I>(self, values: I) -> Term
    where
        I: IntoIterator,
        I::Item: IntoOperand,
    {
        let list = Term::joined(values.into_iter().map(IntoOperand::into_operand).collect());
        binary(template::NOT_IN, self.into_term(), list.group())
    }

    /// `term IN other`, for node operands such as subqueries.
    fn in_term(self, other: impl IntoOperand) -> Term {
        binary(template::IN, self.into_term(), other.into_operand())
    }

    /// `term NOT IN other`.
    fn not_in_term(self, other: impl IntoOperand) -> Term {
        binary(template::NOT_IN, self.into_term(), other.into_operand())
    }

    /// `term LIKE pattern`. Wildcard characters in the pattern are not
    /// escaped.
    fn like(self, pattern: impl IntoOperand) -> Term {
        binary(template::LIKE, self.into_term(), pattern.into_operand())
    }

    /// LIKE test for `substr` anywhere in the value.
    fn contains(self, substr: &str) -> Term {
        self.like(format!("%{substr}%"))
    }

    /// LIKE test for a prefix.
    fn starts_with(self, prefix: &str) -> Term {
        self.like(format!("{prefix}%"))
    }

    /// LIKE test for a suffix.
    fn ends_with(self, suffix: &str) -> Term {
        self.like(format!("%{suffix}"))
    }

    /// Logical AND.
    fn and(self, other: impl IntoOperand) -> Term {
        binary(template::AND, self.operand(), other.into_operand())
    }

    /// Logical OR.
    fn or(self, other: impl IntoOperand) -> Term {
        binary(template::OR, self.operand(), other.into_operand())
    }

    /// `term < other`.
    fn lt(self, other: impl IntoOperand) -> Term {
        binary(template::LT, self.operand(), other.into_operand())
    }

    /// `term <= other`.
    fn le(self, other: impl IntoOperand) -> Term {
        binary(template::LE, self.operand(), other.into_operand())
    }

    /// `term = other`.
    fn eq(self, other: impl IntoOperand) -> Term {
        binary(template::EQ, self.operand(), other.into_operand())
    }

    /// `term <> other` (respelled per dialect, e.g. `!=` under SQLite).
    fn ne(self, other: impl IntoOperand) -> Term {
        binary(template::NE, self.operand(), other.into_operand())
    }

    /// `term > other`.
    fn gt(self, other: impl IntoOperand) -> Term {
        binary(template::GT, self.operand(), other.into_operand())
    }

    /// `term >= other`.
    fn ge(self, other: impl IntoOperand) -> Term {
        binary(template::GE, self.operand(), other.into_operand())
    }

    /// `term + other`.
    fn add(self, other: impl IntoOperand) -> Term {
        binary(template::ADD, self.operand(), other.into_operand())
    }

    /// `term - other`.
    fn sub(self, other: impl IntoOperand) -> Term {
        binary(template::SUB, self.operand(), other.into_operand())
    }

    /// `term * other`.
    fn mul(self, other: impl IntoOperand) -> Term {
        binary(template::MUL, self.operand(), other.into_operand())
    }

    /// `term / other`.
    fn div(self, other: impl IntoOperand) -> Term {
        binary(template::DIV, self.operand(), other.into_operand())
    }

    /// `term % other`.
    fn rem(self, other: impl IntoOperand) -> Term {
        binary(template::MOD, self.operand(), other.into_operand())
    }
}

impl TermOps for Term {}
impl TermOps for Column {}

impl TermOps for SelectQuery {
    /// A named sub-query output: `(SELECT ...) AS name`.
    fn alias(self, name: &str) -> Term {
        Term::Composite(Composite::new(
            format!("({{}}) AS {name}"),
            vec![self.into_term()],
        ))
    }
}

/// The operator algebra called from a raw scalar's side.
///
/// Comparisons are applied with the operands swapped and the comparator
/// mirrored so the written meaning is preserved: `5.lt(col)` renders as
/// `col > :1`. Equality and inequality swap operands without changing the
/// comparator. Arithmetic and boolean operators keep the written order, so
/// `5.sub(col)` renders as `:1 - col` (a syntactic position swap only, with
/// no algebraic inversion).
pub trait ScalarOps: Into<Value> + Sized {
    fn scalar_operand(self) -> Term {
        Term::Param(self.into())
    }

    fn lt(self, other: impl IntoOperand) -> Term {
        binary(template::GT, other.into_operand(), self.scalar_operand())
    }

    fn le(self, other: impl IntoOperand) -> Term {
        binary(template::GE, other.into_operand(), self.scalar_operand())
    }

    fn eq(self, other: impl IntoOperand) -> Term {
        binary(template::EQ, other.into_operand(), self.scalar_operand())
    }

    fn ne(self, other: impl IntoOperand) -> Term {
        binary(template::NE, other.into_operand(), self.scalar_operand())
    }

    fn gt(self, other: impl IntoOperand) -> Term {
        binary(template::LT, other.into_operand(), self.scalar_operand())
    }

    fn ge(self, other: impl IntoOperand) -> Term {
        binary(template::LE, other.into_operand(), self.scalar_operand())
    }

    fn and(self, other: impl IntoOperand) -> Term {
        binary(template::AND, self.scalar_operand(), other.into_operand())
    }

    fn or(self, other: impl IntoOperand) -> Term {
        binary(template::OR, self.scalar_operand(), other.into_operand())
    }

    fn add(self, other: impl IntoOperand) -> Term {
        binary(template::ADD, self.scalar_operand(), other.into_operand())
    }

    fn sub(self, other: impl IntoOperand) -> Term {
        binary(template::SUB, self.scalar_operand(), other.into_operand())
    }

    fn mul(self, other: impl IntoOperand) -> Term {
        binary(template::MUL, self.scalar_operand(), other.into_operand())
    }

    fn div(self, other: impl IntoOperand) -> Term {
        binary(template::DIV, self.scalar_operand(), other.into_operand())
    }

    fn rem(self, other: impl IntoOperand) -> Term {
        binary(template::MOD, self.scalar_operand(), other.into_operand())
    }
}

impl<T: Into<Value>> ScalarOps for T {}

// Operator overloads for the subset Rust can express natively.

macro_rules! impl_node_math {
    ($type:ty) => {
        impl<R: IntoOperand> std::ops::Add<R> for $type {
            type Output = Term;
            fn add(self, rhs: R) -> Term {
                TermOps::add(self, rhs)
            }
        }
        impl<R: IntoOperand> std::ops::Sub<R> for $type {
            type Output = Term;
            fn sub(self, rhs: R) -> Term {
                TermOps::sub(self, rhs)
            }
        }
        impl<R: IntoOperand> std::ops::Mul<R> for $type {
            type Output = Term;
            fn mul(self, rhs: R) -> Term {
                TermOps::mul(self, rhs)
            }
        }
        impl<R: IntoOperand> std::ops::Div<R> for $type {
            type Output = Term;
            fn div(self, rhs: R) -> Term {
                TermOps::div(self, rhs)
            }
        }
        impl<R: IntoOperand> std::ops::Rem<R> for $type {
            type Output = Term;
            fn rem(self, rhs: R) -> Term {
                TermOps::rem(self, rhs)
            }
        }
        impl<R: IntoOperand> std::ops::BitAnd<R> for $type {
            type Output = Term;
            fn bitand(self, rhs: R) -> Term {
                TermOps::and(self, rhs)
            }
        }
        impl<R: IntoOperand> std::ops::BitOr<R> for $type {
            type Output = Term;
            fn bitor(self, rhs: R) -> Term {
                TermOps::or(self, rhs)
            }
        }
    };
}

impl_node_math!(Term);
impl_node_math!(Column);

macro_rules! impl_scalar_math {
    ($($t:ty),*) => {$(
        impl std::ops::Add<Term> for $t {
            type Output = Term;
            fn add(self, rhs: Term) -> Term {
                ScalarOps::add(self, rhs)
            }
        }
        impl std::ops::Add<Column> for $t {
            type Output = Term;
            fn add(self, rhs: Column) -> Term {
                ScalarOps::add(self, rhs)
            }
        }
        impl std::ops::Sub<Term> for $t {
            type Output = Term;
            fn sub(self, rhs: Term) -> Term {
                ScalarOps::sub(self, rhs)
            }
        }
        impl std::ops::Sub<Column> for $t {
            type Output = Term;
            fn sub(self, rhs: Column) -> Term {
                ScalarOps::sub(self, rhs)
            }
        }
        impl std::ops::Mul<Term> for $t {
            type Output = Term;
            fn mul(self, rhs: Term) -> Term {
                ScalarOps::mul(self, rhs)
            }
        }
        impl std::ops::Mul<Column> for $t {
            type Output = Term;
            fn mul(self, rhs: Column) -> Term {
                ScalarOps::mul(self, rhs)
            }
        }
        impl std::ops::Div<Term> for $t {
            type Output = Term;
            fn div(self, rhs: Term) -> Term {
                ScalarOps::div(self, rhs)
            }
        }
        impl std::ops::Div<Column> for $t {
            type Output = Term;
            fn div(self, rhs: Column) -> Term {
                ScalarOps::div(self, rhs)
            }
        }
        impl std::ops::Rem<Term> for $t {
            type Output = Term;
            fn rem(self, rhs: Term) -> Term {
                ScalarOps::rem(self, rhs)
            }
        }
        impl std::ops::Rem<Column> for $t {
            type Output = Term;
            fn rem(self, rhs: Column) -> Term {
                ScalarOps::rem(self, rhs)
            }
        }
    )*};
}

impl_scalar_math!(i32, i64, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::table::Table;

    fn render(term: Term) -> (String, crate::context::Params) {
        let mut ctx = Context::new();
        let sql = term.render(&mut ctx);
        (sql, ctx.into_params())
    }

    #[test]
    fn test_comparison_operators() {
        let (sql, params) = render(Term::literal(42).lt(Term::literal(43)));
        assert_eq!(sql, "42 < 43");
        assert!(params.is_empty());

        let (sql, params) = render(Term::literal(42).lt(43));
        assert_eq!(sql, "42 < :1");
        assert_eq!(params.get("1"), Some(&Value::Int(43)));

        let (sql, _) = render(Term::literal(42).ne(43));
        assert_eq!(sql, "42 <> :1");
        let (sql, _) = render(Term::literal(42).ge(43));
        assert_eq!(sql, "42 >= :1");
    }

    #[test]
    fn test_scalar_lhs_comparisons_are_mirrored() {
        let col = Table::new("t").col("foo");

        let (sql, params) = render(5i64.lt(col.clone()));
        assert_eq!(sql, "t.foo > :1");
        assert_eq!(params.get("1"), Some(&Value::Int(5)));

        let (sql, _) = render(5i64.le(col.clone()));
        assert_eq!(sql, "t.foo >= :1");
        let (sql, _) = render(5i64.gt(col.clone()));
        assert_eq!(sql, "t.foo < :1");
        let (sql, _) = render(ScalarOps::eq(5i64, col.clone()));
        assert_eq!(sql, "t.foo = :1");
        let (sql, _) = render(ScalarOps::ne(5i64, col));
        assert_eq!(sql, "t.foo <> :1");
    }

    #[test]
    fn test_scalar_lhs_arithmetic_keeps_written_order() {
        // The position swap is syntactic only; the operator is not inverted.
        let col = Table::new("t").col("foo");
        let (sql, params) = render(42i64 - Term::Column(col.clone()));
        assert_eq!(sql, ":1 - t.foo");
        assert_eq!(params.get("1"), Some(&Value::Int(42)));

        let (sql, _) = render(42i64 / col.clone());
        assert_eq!(sql, ":1 / t.foo");
        let (sql, _) = render(42i64 % col);
        assert_eq!(sql, ":1 % t.foo");
    }

    #[test]
    fn test_arithmetic_sugar() {
        let t = Table::new("t");
        let (sql, _) = render(t.col("a") + t.col("b"));
        assert_eq!(sql, "t.a + t.b");
        let (sql, params) = render(t.col("a") * 2);
        assert_eq!(sql, "t.a * :1");
        assert_eq!(params.get("1"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_boolean_sugar() {
        let t = Table::new("t");
        let (sql, _) = render(t.col("a").eq(1) & t.col("b").eq(2));
        assert_eq!(sql, "(t.a = :1) AND (t.b = :2)");
        let (sql, _) = render(Term::Column(t.col("a")) | t.col("b"));
        assert_eq!(sql, "t.a OR t.b");
    }

    #[test]
    fn test_composite_operands_are_grouped() {
        let t = Table::new("t");
        let sum = t.col("a") + t.col("b");
        let (sql, _) = render(sum.lt(10));
        assert_eq!(sql, "(t.a + t.b) < :1");
    }

    #[test]
    fn test_group_through_operand_is_single_layer() {
        let grouped = Term::literal(42).group();
        let (sql, _) = render(grouped.operand());
        assert_eq!(sql, "(42)");
    }

    #[test]
    fn test_unary_helpers() {
        let col = Table::new("t").col("foo");
        let (sql, _) = render(col.clone().asc());
        assert_eq!(sql, "t.foo ASC");
        let (sql, _) = render(col.clone().desc());
        assert_eq!(sql, "t.foo DESC");
        let (sql, _) = render(col.clone().max());
        assert_eq!(sql, "MAX(t.foo)");
        let (sql, _) = render(col.clone().count());
        assert_eq!(sql, "COUNT(t.foo)");
        let (sql, _) = render(col.clone().is_null());
        assert_eq!(sql, "t.foo IS NULL");
        let (sql, _) = render(col.clone().is_not_null());
        assert_eq!(sql, "t.foo IS NOT NULL");
        let (sql, _) = render(col.alias("bar"));
        assert_eq!(sql, "t.foo AS bar");
    }

    #[test]
    fn test_in_list() {
        let col = Table::new("t").col("id");
        let (sql, params) = render(col.clone().in_list(vec![1, 2, 3]));
        assert_eq!(sql, "t.id IN (:1, :2, :3)");
        assert_eq!(params.len(), 3);
        let (sql, _) = render(col.not_in(vec![1, 2]));
        assert_eq!(sql, "t.id NOT IN (:1, :2)");
    }

    #[test]
    fn test_like_family() {
        let col = Table::new("t").col("name");
        let (sql, params) = render(col.clone().like("b_r"));
        assert_eq!(sql, "t.name LIKE :1");
        assert_eq!(params.get("1"), Some(&Value::Text("b_r".to_string())));

        let (sql, params) = render(col.clone().contains("oba"));
        assert_eq!(sql, "t.name LIKE :1");
        assert_eq!(params.get("1"), Some(&Value::Text("%oba%".to_string())));

        let (_, params) = render(col.clone().starts_with("bar"));
        assert_eq!(params.get("1"), Some(&Value::Text("bar%".to_string())));
        let (_, params) = render(col.ends_with("bar"));
        assert_eq!(params.get("1"), Some(&Value::Text("%bar".to_string())));
    }

    #[test]
    fn test_placeholder_order_is_render_order() {
        let t = Table::new("t");
        let tree = t.col("a").eq(1).and(t.col("b").eq(2)).and(t.col("c").eq(3));
        let (sql, params) = render(tree);
        assert_eq!(sql, "((t.a = :1) AND (t.b = :2)) AND (t.c = :3)");
        assert_eq!(params.get("1"), Some(&Value::Int(1)));
        assert_eq!(params.get("2"), Some(&Value::Int(2)));
        assert_eq!(params.get("3"), Some(&Value::Int(3)));
    }
}
