//! Predicate algebra: composable clause fragments with bound arguments.
//!
//! A [`Predicate`] is one unit of a query's tail: a WHERE condition, a JOIN,
//! GROUP BY, HAVING, ORDER BY, LIMIT or OFFSET. Each predicate knows its
//! [`Category`], renders its own SQL fragment and exposes its arguments in
//! placeholder order. The [`assemble`](crate::assemble) function linearizes a
//! predicate list into the final clause text.
//!
//! # Example
//! ```ignore
//! use myorm::{args, Predicate};
//!
//! let preds = vec![
//!     Predicate::filter("age > ?", args![18]),
//!     Predicate::where_in("status", args!["active", "pending"]),
//!     Predicate::order_by("created_at DESC"),
//!     Predicate::limit(20),
//! ];
//! ```

use crate::ident::quote;
use crate::value::Value;
use std::fmt;

/// Category tag of a predicate, used by the assembler to order clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Where,
    Or,
    WhereIn,
    WhereNotIn,
    Join,
    Group,
    Having,
    Order,
    Limit,
    Offset,
}

impl Category {
    /// Whether predicates of this category contribute to the WHERE clause.
    pub fn is_condition(self) -> bool {
        matches!(
            self,
            Category::Where | Category::Or | Category::WhereIn | Category::WhereNotIn
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Where => "where",
            Category::Or => "or",
            Category::WhereIn => "where in",
            Category::WhereNotIn => "where not in",
            Category::Join => "join",
            Category::Group => "group",
            Category::Having => "having",
            Category::Order => "order",
            Category::Limit => "limit",
            Category::Offset => "offset",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JOIN flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Outer,
    Natural,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Outer => "OUTER",
            JoinKind::Natural => "NATURAL",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
        }
    }
}

/// Literal rendered by an IN / NOT IN list without values.
///
/// An empty list is a pass-through filter: it neither excludes nor matches
/// rows on its own.
pub const EMPTY_LIST_LITERAL: &str = "1";

/// One clause fragment and its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Raw condition with `?` placeholders, e.g. `age > ?`.
    Where { sql: String, args: Vec<Value> },
    /// Disjunction of conditions. Children outside the where/or/in/not-in
    /// set are ignored when rendering.
    Or(Vec<Predicate>),
    /// `column IN (?, ...)`
    WhereIn { column: String, values: Vec<Value> },
    /// `column NOT IN (?, ...)`
    WhereNotIn { column: String, values: Vec<Value> },
    Join {
        kind: JoinKind,
        table: String,
        on: Option<String>,
        args: Vec<Value>,
    },
    /// GROUP BY expression; quoted when it is a bare identifier.
    GroupBy { sql: String, args: Vec<Value> },
    Having { sql: String, args: Vec<Value> },
    OrderBy { sql: String, args: Vec<Value> },
    Limit(u64),
    Offset(u64),
}

fn collect_args<V: Into<Value>>(args: impl IntoIterator<Item = V>) -> Vec<Value> {
    args.into_iter().map(Into::into).collect()
}

fn join_on(on: impl Into<String>) -> Option<String> {
    let on = on.into();
    if on.is_empty() { None } else { Some(on) }
}

fn in_list(column: &str, keyword: &str, len: usize) -> String {
    if len == 0 {
        return EMPTY_LIST_LITERAL.to_string();
    }
    let mut out = String::with_capacity(column.len() + keyword.len() + 2 * len + 6);
    out.push_str(&quote(column));
    out.push(' ');
    out.push_str(keyword);
    out.push_str(" (");
    for i in 0..len {
        if i > 0 {
            out.push(',');
        }
        out.push('?');
    }
    out.push(')');
    out
}

impl Predicate {
    // ==================== Constructors ====================

    /// Raw WHERE condition. The fragment is used verbatim.
    pub fn filter<V: Into<Value>>(
        sql: impl Into<String>,
        args: impl IntoIterator<Item = V>,
    ) -> Self {
        Predicate::Where {
            sql: sql.into(),
            args: collect_args(args),
        }
    }

    /// OR over several conditions.
    ///
    /// Only where/or/in/not-in predicates are kept; anything else is dropped.
    pub fn or(conditions: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Or(
            conditions
                .into_iter()
                .filter(|p| p.category().is_condition())
                .collect(),
        )
    }

    /// OR group holding a single raw fragment.
    pub fn or_where<V: Into<Value>>(
        sql: impl Into<String>,
        args: impl IntoIterator<Item = V>,
    ) -> Self {
        Predicate::Or(vec![Predicate::filter(sql, args)])
    }

    /// `column IN (?, ...)` sized to the number of values.
    pub fn where_in<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Predicate::WhereIn {
            column: column.into(),
            values: collect_args(values),
        }
    }

    /// `column NOT IN (?, ...)` sized to the number of values.
    pub fn where_not_in<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Predicate::WhereNotIn {
            column: column.into(),
            values: collect_args(values),
        }
    }

    /// JOIN of the given kind. An empty `on` omits the ON clause.
    pub fn join<V: Into<Value>>(
        kind: JoinKind,
        table: impl Into<String>,
        on: impl Into<String>,
        args: impl IntoIterator<Item = V>,
    ) -> Self {
        Predicate::Join {
            kind,
            table: table.into(),
            on: join_on(on),
            args: collect_args(args),
        }
    }

    pub fn inner_join<V: Into<Value>>(
        table: impl Into<String>,
        on: impl Into<String>,
        args: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::join(JoinKind::Inner, table, on, args)
    }

    pub fn outer_join<V: Into<Value>>(
        table: impl Into<String>,
        on: impl Into<String>,
        args: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::join(JoinKind::Outer, table, on, args)
    }

    pub fn natural_join<V: Into<Value>>(
        table: impl Into<String>,
        on: impl Into<String>,
        args: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::join(JoinKind::Natural, table, on, args)
    }

    pub fn left_join<V: Into<Value>>(
        table: impl Into<String>,
        on: impl Into<String>,
        args: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::join(JoinKind::Left, table, on, args)
    }

    pub fn right_join<V: Into<Value>>(
        table: impl Into<String>,
        on: impl Into<String>,
        args: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::join(JoinKind::Right, table, on, args)
    }

    /// GROUP BY expression without arguments. Use [`Predicate::with_args`] to bind.
    pub fn group_by(sql: impl Into<String>) -> Self {
        Predicate::GroupBy {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    pub fn having<V: Into<Value>>(
        sql: impl Into<String>,
        args: impl IntoIterator<Item = V>,
    ) -> Self {
        Predicate::Having {
            sql: sql.into(),
            args: collect_args(args),
        }
    }

    /// ORDER BY expression without arguments. Use [`Predicate::with_args`] to bind.
    pub fn order_by(sql: impl Into<String>) -> Self {
        Predicate::OrderBy {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    pub fn limit(limit: u64) -> Self {
        Predicate::Limit(limit)
    }

    pub fn offset(offset: u64) -> Self {
        Predicate::Offset(offset)
    }

    /// Append arguments to a fragment-carrying predicate.
    ///
    /// IN / NOT IN lists grow by the given values. `Or`, `Limit` and `Offset`
    /// are returned unchanged.
    pub fn with_args<V: Into<Value>>(mut self, extra: impl IntoIterator<Item = V>) -> Self {
        match &mut self {
            Predicate::Where { args, .. }
            | Predicate::Join { args, .. }
            | Predicate::GroupBy { args, .. }
            | Predicate::Having { args, .. }
            | Predicate::OrderBy { args, .. } => args.extend(extra.into_iter().map(Into::into)),
            Predicate::WhereIn { values, .. } | Predicate::WhereNotIn { values, .. } => {
                values.extend(extra.into_iter().map(Into::into));
            }
            Predicate::Or(_) | Predicate::Limit(_) | Predicate::Offset(_) => {}
        }
        self
    }

    // ==================== Column helpers ====================

    /// `column LIKE '%phrase%'`
    pub fn contains(column: &str, phrase: &str) -> Self {
        Self::like(column, format!("%{phrase}%"))
    }

    /// `column LIKE ?` with the pattern passed through unchanged.
    pub fn find(column: &str, pattern: impl Into<String>) -> Self {
        Self::like(column, pattern.into())
    }

    /// `column LIKE 'phrase%'`
    pub fn starts_with(column: &str, phrase: &str) -> Self {
        Self::like(column, format!("{phrase}%"))
    }

    /// `column LIKE '%phrase'`
    pub fn ends_with(column: &str, phrase: &str) -> Self {
        Self::like(column, format!("%{phrase}"))
    }

    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self::compare(column, "=", value)
    }

    pub fn not_eq(column: &str, value: impl Into<Value>) -> Self {
        Self::compare(column, "!=", value)
    }

    pub fn gt(column: &str, value: impl Into<Value>) -> Self {
        Self::compare(column, ">", value)
    }

    pub fn gte(column: &str, value: impl Into<Value>) -> Self {
        Self::compare(column, ">=", value)
    }

    pub fn lt(column: &str, value: impl Into<Value>) -> Self {
        Self::compare(column, "<", value)
    }

    pub fn lte(column: &str, value: impl Into<Value>) -> Self {
        Self::compare(column, "<=", value)
    }

    /// `FIND_IN_SET(?, column) > 0`
    pub fn find_in_set(column: &str, value: impl Into<Value>) -> Self {
        Predicate::Where {
            sql: format!("FIND_IN_SET(?, {}) > 0", quote(column)),
            args: vec![value.into()],
        }
    }

    fn like(column: &str, pattern: String) -> Self {
        Self::compare(column, "LIKE", pattern)
    }

    fn compare(column: &str, op: &str, value: impl Into<Value>) -> Self {
        Predicate::Where {
            sql: format!("{} {op} ?", quote(column)),
            args: vec![value.into()],
        }
    }

    // ==================== Rendering ====================

    pub fn category(&self) -> Category {
        match self {
            Predicate::Where { .. } => Category::Where,
            Predicate::Or(_) => Category::Or,
            Predicate::WhereIn { .. } => Category::WhereIn,
            Predicate::WhereNotIn { .. } => Category::WhereNotIn,
            Predicate::Join { .. } => Category::Join,
            Predicate::GroupBy { .. } => Category::Group,
            Predicate::Having { .. } => Category::Having,
            Predicate::OrderBy { .. } => Category::Order,
            Predicate::Limit(_) => Category::Limit,
            Predicate::Offset(_) => Category::Offset,
        }
    }

    /// Render the SQL fragment. Pure: the same predicate always renders the same text.
    pub fn render(&self) -> String {
        match self {
            Predicate::Where { sql, .. }
            | Predicate::GroupBy { sql, .. }
            | Predicate::Having { sql, .. }
            | Predicate::OrderBy { sql, .. } => sql.clone(),
            Predicate::Or(conditions) => {
                let rendered: Vec<String> = or_children(conditions)
                    .map(|c| format!("({})", c.render()))
                    .collect();
                if rendered.is_empty() {
                    return EMPTY_LIST_LITERAL.to_string();
                }
                rendered.join(" OR ")
            }
            Predicate::WhereIn { column, values } => in_list(column, "IN", values.len()),
            Predicate::WhereNotIn { column, values } => in_list(column, "NOT IN", values.len()),
            Predicate::Join {
                kind, table, on, ..
            } => match on {
                Some(on) => format!(" {} JOIN {table} ON {on} ", kind.as_str()),
                None => format!(" {} JOIN {table} ", kind.as_str()),
            },
            Predicate::Limit(_) => "LIMIT ?".to_string(),
            Predicate::Offset(_) => "OFFSET ?".to_string(),
        }
    }

    /// Arguments in placeholder order.
    pub fn args(&self) -> Vec<Value> {
        let mut out = Vec::new();
        self.extend_args(&mut out);
        out
    }

    pub(crate) fn extend_args(&self, out: &mut Vec<Value>) {
        match self {
            Predicate::Where { args, .. }
            | Predicate::Join { args, .. }
            | Predicate::GroupBy { args, .. }
            | Predicate::Having { args, .. }
            | Predicate::OrderBy { args, .. } => out.extend(args.iter().cloned()),
            Predicate::WhereIn { values, .. } | Predicate::WhereNotIn { values, .. } => {
                out.extend(values.iter().cloned());
            }
            Predicate::Or(conditions) => {
                for c in or_children(conditions) {
                    c.extend_args(out);
                }
            }
            Predicate::Limit(n) | Predicate::Offset(n) => out.push(Value::UInt(*n)),
        }
    }

    /// Number of bound arguments, without cloning them.
    pub fn arg_count(&self) -> usize {
        match self {
            Predicate::Where { args, .. }
            | Predicate::Join { args, .. }
            | Predicate::GroupBy { args, .. }
            | Predicate::Having { args, .. }
            | Predicate::OrderBy { args, .. } => args.len(),
            Predicate::WhereIn { values, .. } | Predicate::WhereNotIn { values, .. } => {
                values.len()
            }
            Predicate::Or(conditions) => or_children(conditions).map(Predicate::arg_count).sum(),
            Predicate::Limit(_) | Predicate::Offset(_) => 1,
        }
    }

    /// Number of `?` placeholders in the rendered fragment.
    ///
    /// Every `?` counts, including ones inside string literals.
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.render())
    }
}

fn or_children(conditions: &[Predicate]) -> impl Iterator<Item = &Predicate> {
    conditions.iter().filter(|c| c.category().is_condition())
}

pub(crate) fn count_placeholders(sql: &str) -> usize {
    sql.bytes().filter(|&b| b == b'?').count()
}
