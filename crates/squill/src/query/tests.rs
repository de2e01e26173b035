//! Integration tests for the statement builders.

use std::sync::{Arc, Mutex};

use crate::client::{Connection, Cursor, Row};
use crate::condition::Condition;
use crate::context::Params;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::ops::TermOps;
use crate::query::Statement;
use crate::table::{Database, Table};
use crate::value::Value;

// ==================== fakes ====================

#[derive(Default)]
struct FakeConnection {
    executed: Mutex<Vec<(String, Vec<(String, Value)>)>>,
    rows: Vec<Row>,
}

impl FakeConnection {
    fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
            rows,
        }
    }

    fn executed(&self) -> Vec<(String, Vec<(String, Value)>)> {
        self.executed.lock().unwrap().clone()
    }
}

impl Connection for FakeConnection {
    fn cursor(&self) -> Result<Box<dyn Cursor + '_>> {
        Ok(Box::new(FakeCursor {
            conn: self,
            rows: self.rows.clone(),
        }))
    }
}

struct FakeCursor<'a> {
    conn: &'a FakeConnection,
    rows: Vec<Row>,
}

impl Cursor for FakeCursor<'_> {
    fn execute(&mut self, sql: &str, params: &Params) -> Result<()> {
        let bound = params
            .iter()
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect();
        self.conn
            .executed
            .lock()
            .unwrap()
            .push((sql.to_string(), bound));
        Ok(())
    }

    fn fetch_many(&mut self, size: usize) -> Result<Vec<Row>> {
        let n = size.min(self.rows.len());
        Ok(self.rows.drain(..n).collect())
    }

    fn fetch_all(&mut self) -> Result<Vec<Row>> {
        Ok(std::mem::take(&mut self.rows))
    }
}

// ==================== select ====================

#[test]
fn test_select_star() {
    let t = Table::new("mytable");
    assert_eq!(t.select().compile_sql(), "SELECT * FROM mytable");
}

#[test]
fn test_select_with_filter() {
    let t = Table::new("mytable");
    let (sql, params) = t.select().filter(t.col("id").eq(42)).compile();
    assert_eq!(sql, "SELECT * FROM mytable WHERE mytable.id = :1");
    assert_eq!(params.get("1"), Some(&Value::Int(42)));
    assert_eq!(params.len(), 1);
}

#[test]
fn test_select_outputs_and_clauses() {
    let t = Table::new("mytable");
    let sql = t
        .select()
        .column(t.col("foo"))
        .column(t.col("bar").count().alias("n"))
        .group_by([t.col("foo")])
        .order_by([t.col("foo").desc()])
        .limit(10)
        .offset(5)
        .compile_sql();
    assert_eq!(
        sql,
        "SELECT mytable.foo, COUNT(mytable.bar) AS n FROM mytable \
         GROUP BY mytable.foo ORDER BY mytable.foo DESC LIMIT 10 OFFSET 5"
    );
}

#[test]
fn test_select_distinct() {
    let t = Table::new("mytable");
    let sql = t.select().distinct().column(t.col("foo")).compile_sql();
    assert_eq!(sql, "SELECT DISTINCT mytable.foo FROM mytable");
}

#[test]
fn test_filter_values_then_or_filter_values() {
    let t = Table::new("mytable");
    let (sql, params) = t
        .select()
        .filter_values([("foo", 42), ("bar", -1)])
        .or_filter_values([("fizz", 84), ("fuzz", 84)])
        .compile();
    assert_eq!(
        sql,
        "SELECT * FROM mytable WHERE (mytable.foo = :1 AND mytable.bar = :2) \
         OR (mytable.fizz = :3 AND mytable.fuzz = :4)"
    );
    assert_eq!(params.get("1"), Some(&Value::Int(42)));
    assert_eq!(params.get("2"), Some(&Value::Int(-1)));
    assert_eq!(params.get("3"), Some(&Value::Int(84)));
    assert_eq!(params.get("4"), Some(&Value::Int(84)));
}

#[test]
fn test_or_filter_chain_parenthesization() {
    let t = Table::new("mytable");
    let q = t
        .select()
        .filter(t.col("foo").eq(1))
        .or_filter_values([("fizz", 2), ("fuzz", 3)]);
    assert_eq!(
        q.clone().compile_sql(),
        "SELECT * FROM mytable WHERE mytable.foo = :1 \
         OR (mytable.fizz = :2 AND mytable.fuzz = :3)"
    );

    // A later AND groups the whole OR tree, but not the new single term.
    let sql = q.filter(t.col("bar").eq(4)).compile_sql();
    assert_eq!(
        sql,
        "SELECT * FROM mytable WHERE (mytable.foo = :1 \
         OR (mytable.fizz = :2 AND mytable.fuzz = :3)) AND mytable.bar = :4"
    );
}

#[test]
fn test_same_operator_filters_do_not_nest_parens() {
    let t = Table::new("mytable");
    let sql = t
        .select()
        .filter(t.col("a").eq(1))
        .filter(t.col("b").eq(2))
        .compile_sql();
    assert_eq!(
        sql,
        "SELECT * FROM mytable WHERE mytable.a = :1 AND mytable.b = :2"
    );
}

#[test]
fn test_raw_filter_with_named_values() {
    let t = Table::new("mytable");
    let (sql, params) = t
        .select()
        .filter(
            Condition::new()
                .term("mytable.foo > :low")
                .term(t.col("bar").eq(1))
                .bind("low", 10),
        )
        .compile();
    assert_eq!(
        sql,
        "SELECT * FROM mytable WHERE mytable.foo > :low AND mytable.bar = :2"
    );
    assert_eq!(params.get("low"), Some(&Value::Int(10)));
    assert_eq!(params.get("2"), Some(&Value::Int(1)));
}

#[test]
fn test_filter_values_string_becomes_bound_text() {
    let t = Table::new("mytable");
    let (sql, params) = t.select().filter_values([("name", "bob")]).compile();
    assert_eq!(sql, "SELECT * FROM mytable WHERE mytable.name = :1");
    assert_eq!(params.get("1"), Some(&Value::Text("bob".to_string())));
}

#[test]
fn test_filter_subquery_membership() {
    let t = Table::new("mytable");
    let other = Table::new("other");
    let sql = t
        .select()
        .filter(t.col("id").in_term(other.select().column(other.col("mid"))))
        .compile_sql();
    assert_eq!(
        sql,
        "SELECT * FROM mytable WHERE mytable.id IN (SELECT other.mid FROM other)"
    );
}

// ==================== joins ====================

#[test]
fn test_bare_join() {
    let t = Table::new("mytable");
    let other = Table::new("other");
    let sql = t.select().join(&other).compile_sql();
    assert_eq!(sql, "SELECT * FROM mytable JOIN other");
}

#[test]
fn test_join_with_on() {
    let t = Table::new("mytable");
    let other = Table::new("other");
    let sql = t
        .select()
        .join_on(&other, t.col("id").eq(other.col("mid")))
        .compile_sql();
    assert_eq!(
        sql,
        "SELECT * FROM mytable JOIN other ON mytable.id = other.mid"
    );
}

#[test]
fn test_left_join_aliased_table() {
    let t = Table::new("mytable");
    let other = Table::with_alias("other", "o");
    let sql = t
        .select()
        .left_join(&other, t.col("id").eq(other.col("mid")))
        .compile_sql();
    assert_eq!(
        sql,
        "SELECT * FROM mytable LEFT JOIN other AS o ON mytable.id = o.mid"
    );
}

#[test]
fn test_join_subquery_shares_placeholder_numbering() {
    let t = Table::new("mytable");
    let other = Table::new("other");
    let sub = other.select().filter(other.col("x").eq(1));
    let (sql, params) = t
        .select()
        .join_on(sub.alias("sub"), "mytable.id = sub.id")
        .filter(t.col("foo").eq(2))
        .compile();
    assert_eq!(
        sql,
        "SELECT * FROM mytable JOIN (SELECT * FROM other WHERE other.x = :1) AS sub \
         ON mytable.id = sub.id WHERE mytable.foo = :2"
    );
    assert_eq!(params.get("1"), Some(&Value::Int(1)));
    assert_eq!(params.get("2"), Some(&Value::Int(2)));
}

#[test]
fn test_join_with_named_values_only_has_no_on_clause() {
    let t = Table::new("mytable");
    let other = Table::new("other");
    let sql = t
        .select()
        .join_on(&other, Condition::values([("mid", 1)]))
        .compile_sql();
    assert_eq!(sql, "SELECT * FROM mytable JOIN other");
}

// ==================== subselect ====================

#[test]
fn test_subselect_unbinds_columns() {
    let t = Table::new("mytable");
    let sql = t
        .select()
        .filter_values([("foo", 1)])
        .subselect()
        .filter_values([("bar", 2)])
        .compile_sql();
    assert_eq!(
        sql,
        "SELECT * FROM (SELECT * FROM mytable WHERE mytable.foo = :1) WHERE bar = :2"
    );
}

#[test]
fn test_subselect_drops_connection() {
    let conn = Arc::new(FakeConnection::default());
    let db = Database::new(conn);
    let q = db.table("mytable").select().subselect();
    assert!(matches!(q.execute(), Err(Error::MissingConnection)));
}

// ==================== update / insert / delete ====================

#[test]
fn test_update_basic() {
    let t = Table::new("mytable");
    let (sql, params) = t
        .update()
        .set("foo", 1)
        .filter(t.col("bar").eq(2))
        .compile();
    assert_eq!(
        sql,
        "UPDATE mytable SET mytable.foo = :1 WHERE mytable.bar = :2"
    );
    assert_eq!(params.get("1"), Some(&Value::Int(1)));
    assert_eq!(params.get("2"), Some(&Value::Int(2)));
}

#[test]
fn test_update_reassignment_replaces_in_place() {
    let t = Table::new("mytable");
    let (sql, params) = t
        .update()
        .set("foo", 1)
        .set("bar", 2)
        .set("foo", 3)
        .compile();
    assert_eq!(sql, "UPDATE mytable SET mytable.foo = :1, mytable.bar = :2");
    assert_eq!(params.get("1"), Some(&Value::Int(3)));
    assert_eq!(params.get("2"), Some(&Value::Int(2)));
}

#[test]
fn test_update_set_from_expression() {
    let t = Table::new("mytable");
    let sql = t.update().set("foo", t.col("foo") + 1).compile_sql();
    assert_eq!(sql, "UPDATE mytable SET mytable.foo = (mytable.foo + :1)");
}

#[test]
fn test_insert_basic() {
    let t = Table::new("mytable");
    let (sql, params) = t.insert().set("foo", 42).compile();
    assert_eq!(sql, "INSERT INTO mytable (foo) VALUES (:1)");
    assert_eq!(params.get("1"), Some(&Value::Int(42)));
}

#[test]
fn test_insert_columns_are_unqualified() {
    let t = Table::new("mytable");
    let sql = t.insert().set("foo", 1).set("bar", "x").compile_sql();
    assert_eq!(sql, "INSERT INTO mytable (foo, bar) VALUES (:1, :2)");
}

#[test]
fn test_delete_basic() {
    let t = Table::new("mytable");
    let (sql, params) = t.delete().filter(t.col("foo").eq(42)).compile();
    assert_eq!(sql, "DELETE FROM mytable WHERE mytable.foo = :1");
    assert_eq!(params.get("1"), Some(&Value::Int(42)));
}

#[test]
fn test_delete_without_filter_is_unconditional() {
    let t = Table::new("mytable");
    assert_eq!(t.delete().compile_sql(), "DELETE FROM mytable");
}

// ==================== dialect ====================

#[test]
fn test_sqlite_dialect_respells_not_equal() {
    let t = Table::new("mytable").with_dialect(Dialect::sqlite());
    let sql = t.select().filter(t.col("foo").ne(1)).compile_sql();
    assert_eq!(sql, "SELECT * FROM mytable WHERE mytable.foo != :1");
}

#[test]
fn test_dialect_string_delimiter_applies_to_literals() {
    let t = Table::new("mytable").with_dialect(Dialect::ansi().with_string_delimiter('"'));
    let sql = t
        .select()
        .filter(t.col("name").eq(crate::term::Term::literal("o'brien")))
        .compile_sql();
    assert_eq!(
        sql,
        "SELECT * FROM mytable WHERE mytable.name = \"o'brien\""
    );
}

// ==================== execution ====================

#[test]
fn test_execute_without_connection() {
    let t = Table::new("mytable");
    assert!(matches!(
        t.select().execute(),
        Err(Error::MissingConnection)
    ));
}

#[test]
fn test_execute_records_sql_and_params() {
    let conn = Arc::new(FakeConnection::default());
    let db = Database::new(conn.clone());
    let t = db.table("users");
    t.select().filter_values([("id", 7)]).fetch_all().unwrap();

    let executed = conn.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].0, "SELECT * FROM users WHERE users.id = :1");
    assert_eq!(executed[0].1, vec![("1".to_string(), Value::Int(7))]);
}

#[test]
fn test_fetch_all_returns_rows() {
    let rows = vec![
        vec![Value::Int(1), Value::Text("alice".to_string())],
        vec![Value::Int(2), Value::Text("bob".to_string())],
    ];
    let conn = Arc::new(FakeConnection::with_rows(rows.clone()));
    let db = Database::new(conn);
    let fetched = db.table("users").select().fetch_all().unwrap();
    assert_eq!(fetched, rows);
}

#[test]
fn test_fetch_many_limits_rows() {
    let rows = vec![vec![Value::Int(1)], vec![Value::Int(2)], vec![Value::Int(3)]];
    let conn = Arc::new(FakeConnection::with_rows(rows));
    let db = Database::new(conn);
    let fetched = db.table("users").select().fetch_many(2).unwrap();
    assert_eq!(fetched, vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
}
