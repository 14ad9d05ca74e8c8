//! SELECT / DELETE statement builder.

use crate::assemble::assemble;
use crate::error::{OrmError, OrmResult};
use crate::ident::quote;
use crate::predicate::Predicate;
use crate::value::Value;
use std::fmt;

/// Statement action keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Select,
    Insert,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Select => "SELECT",
            Action::Insert => "INSERT",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finished statement: SQL text plus arguments in placeholder order.
///
/// Built once per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    args: Vec<Value>,
}

impl Statement {
    pub(crate) fn new(sql: String, args: Vec<Value>) -> Self {
        Self { sql, args }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Build an argument-less-prefix statement (`SELECT` or `DELETE`).
///
/// `columns` is only used for `SELECT`; each entry is quoted and an empty
/// projection selects `*`. Any other action fails with
/// [`OrmError::UnsupportedAction`].
pub fn build<S: AsRef<str>>(
    action: Action,
    table: &str,
    columns: &[S],
    predicates: &[Predicate],
) -> OrmResult<Statement> {
    if !matches!(action, Action::Select | Action::Delete) {
        return Err(OrmError::UnsupportedAction(format!(
            "this builder doesn't support: {action}"
        )));
    }

    let mut sql = String::from(action.as_str());
    if action == Action::Select {
        sql.push(' ');
        if columns.is_empty() {
            sql.push('*');
        } else {
            let projected: Vec<String> = columns.iter().map(|c| quote(c.as_ref())).collect();
            sql.push_str(&projected.join(","));
        }
        sql.push(' ');
    }
    sql.push_str(" FROM ");
    sql.push_str(&quote(table));

    let (clause, args) = assemble(predicates)?.into_parts();
    sql.push_str(&clause);
    Ok(Statement::new(sql, args))
}

/// `SELECT columns FROM table ...`
pub fn build_select<S: AsRef<str>>(
    table: &str,
    columns: &[S],
    predicates: &[Predicate],
) -> OrmResult<Statement> {
    build(Action::Select, table, columns, predicates)
}

/// `DELETE FROM table ...`
pub fn build_delete(table: &str, predicates: &[Predicate]) -> OrmResult<Statement> {
    build::<&str>(Action::Delete, table, &[], predicates)
}
