//! Raw write layer: rows → multi-row INSERT, SET pairs → UPDATE, predicates → DELETE.
//!
//! The `build_*` functions are pure and return a [`Statement`]; the async
//! functions build and then run it through an [`Executor`]. A build error
//! means nothing was sent to the database.
//!
//! ```ignore
//! use myorm::{Predicate, raw, row};
//!
//! let rows = vec![
//!     row! { "name" => "alice", "age" => 30 },
//!     row! { "name" => "bob", "age" => 25 },
//! ];
//! let inserted = raw::bulk_insert(&pool, "users", &rows).await?;
//!
//! let updated = raw::update(
//!     &pool,
//!     "users",
//!     [("age", 31)],
//!     &[Predicate::eq("name", "alice")],
//! )
//! .await?;
//! ```

use crate::assemble::assemble;
use crate::client::Executor;
use crate::entity::{Entity, classify};
use crate::error::{OrmError, OrmResult};
use crate::ident::quote;
use crate::predicate::Predicate;
use crate::statement::{Statement, build_delete};
use crate::value::{Row, Value};

/// Build `INSERT [IGNORE] INTO table (cols) VALUES (?,..),(?,..)`.
///
/// The column set comes from the first row. Later rows are read through that
/// column set: a missing column binds `NULL` and an extra column is dropped.
/// Arguments are row-major.
pub fn build_bulk_insert(ignore: bool, table: &str, rows: &[Row]) -> OrmResult<Statement> {
    let Some(first) = rows.first() else {
        return Err(OrmError::EmptyInput(format!(
            "no rows to insert into {table}"
        )));
    };
    if first.is_empty() {
        return Err(OrmError::NoColumns(table.to_string()));
    }

    let columns: Vec<&str> = first.keys().map(String::as_str).collect();
    let quoted: Vec<String> = columns.iter().map(|c| quote(c)).collect();
    let tuple = format!("({})", vec!["?"; columns.len()].join(","));

    let mut args = Vec::with_capacity(columns.len() * rows.len());
    for row in rows {
        for column in &columns {
            args.push(row.get(*column).cloned().unwrap_or(Value::Null));
        }
    }

    let verb = if ignore { "INSERT IGNORE INTO" } else { "INSERT INTO" };
    let sql = format!(
        "{verb} {} ({}) VALUES {}",
        quote(table),
        quoted.join(","),
        vec![tuple.as_str(); rows.len()].join(",")
    );

    Ok(Statement::new(sql, args))
}

/// Build `UPDATE table SET table.col = ?, ... {clause}`.
///
/// SET text and SET arguments are produced from the same ordered pairs, so
/// the first `?` always receives the first pair's value. Clause arguments
/// follow the SET arguments.
pub fn build_update<C, V>(
    table: &str,
    sets: impl IntoIterator<Item = (C, V)>,
    predicates: &[Predicate],
) -> OrmResult<Statement>
where
    C: AsRef<str>,
    V: Into<Value>,
{
    let mut assignments = Vec::new();
    let mut args = Vec::new();
    for (column, value) in sets {
        assignments.push(format!("{} = ?", quote(&format!("{table}.{}", column.as_ref()))));
        args.push(value.into());
    }
    if assignments.is_empty() {
        return Err(OrmError::NoColumnsForUpdate(table.to_string()));
    }

    let (clause, clause_args) = assemble(predicates)?.into_parts();
    args.extend(clause_args);

    let sql = format!(
        "UPDATE {} SET {}{}",
        quote(table),
        assignments.join(", "),
        clause
    );
    Ok(Statement::new(sql, args))
}

async fn run(conn: &impl Executor, tag: String, stmt: Statement) -> OrmResult<u64> {
    conn.execute_tagged(&tag, stmt.sql(), stmt.args()).await
}

async fn insert_rows(
    conn: &impl Executor,
    ignore: bool,
    table: &str,
    rows: &[Row],
) -> OrmResult<u64> {
    let stmt = build_bulk_insert(ignore, table, rows)?;
    let op = if ignore { "bulk_insert_ignore" } else { "bulk_insert" };
    run(conn, format!("{op}({table})"), stmt).await
}

/// Insert every row in one statement and return rows affected.
pub async fn bulk_insert(conn: &impl Executor, table: &str, rows: &[Row]) -> OrmResult<u64> {
    insert_rows(conn, false, table, rows).await
}

/// Like [`bulk_insert`] but duplicate-key rows are skipped by the server.
pub async fn bulk_insert_ignore(conn: &impl Executor, table: &str, rows: &[Row]) -> OrmResult<u64> {
    insert_rows(conn, true, table, rows).await
}

/// Update rows matching `predicates`.
pub async fn update<C, V>(
    conn: &impl Executor,
    table: &str,
    sets: impl IntoIterator<Item = (C, V)>,
    predicates: &[Predicate],
) -> OrmResult<u64>
where
    C: AsRef<str>,
    V: Into<Value>,
{
    let stmt = build_update(table, sets, predicates)?;
    run(conn, format!("update({table})"), stmt).await
}

/// Delete rows matching `predicates`.
///
/// An empty predicate list deletes every row of the table.
pub async fn delete(conn: &impl Executor, table: &str, predicates: &[Predicate]) -> OrmResult<u64> {
    let stmt = build_delete(table, predicates)?;
    run(conn, format!("delete({table})"), stmt).await
}

/// Outcome of [`bulk_insert_entities`].
#[derive(Debug, Default)]
pub struct BulkInsertReport {
    /// Rows affected summed over the tables that succeeded.
    pub rows_affected: u64,
    /// One entry per table whose insert failed.
    pub failures: Vec<(String, OrmError)>,
}

impl BulkInsertReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Group `entities` by table and insert each group with its own statement.
///
/// Tables are independent: a failing table is recorded in the report and the
/// remaining tables are still attempted. Wrap `conn` in a [`Tx`](crate::Tx)
/// for all-or-nothing behavior.
pub async fn bulk_insert_entities<E: Entity>(
    conn: &impl Executor,
    ignore: bool,
    entities: impl IntoIterator<Item = E>,
) -> OrmResult<BulkInsertReport> {
    let grouped = classify(entities);
    if grouped.is_empty() {
        return Err(OrmError::EmptyInput("no entities to insert".into()));
    }

    let mut report = BulkInsertReport::default();
    for (table, rows) in &grouped {
        match insert_rows(conn, ignore, table, rows).await {
            Ok(n) => report.rows_affected += n,
            Err(e) => {
                tracing::warn!(table = %table, error = %e, "bulk insert failed");
                report.failures.push((table.clone(), e));
            }
        }
    }
    Ok(report)
}
