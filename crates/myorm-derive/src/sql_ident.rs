use std::collections::HashSet;

use proc_macro2::Span;
use syn::{Error, LitStr, Result};

pub(crate) fn is_valid_sql_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A column name: one identifier, or `None` for an empty tag.
pub(crate) fn parse_column(lit: &LitStr) -> Result<Option<String>> {
    let raw = lit.value();
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_sql_ident_with_span(&raw, lit.span(), "column").map(Some)
}

/// A table name: an identifier, optionally schema-qualified (`shop.users`).
pub(crate) fn parse_table(lit: &LitStr) -> Result<String> {
    let raw = lit.value();
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::new(lit.span(), "table must not be empty"));
    }
    for part in raw.split('.') {
        parse_sql_ident_with_span(part, lit.span(), "table")?;
    }
    Ok(raw.to_string())
}

pub(crate) fn parse_sql_ident_with_span(s: &str, span: Span, what: &str) -> Result<String> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::new(span, format!("{what} must not be empty")));
    }
    if !is_valid_sql_ident(s) {
        return Err(Error::new(
            span,
            format!("{what} must be a valid SQL identifier (expected [A-Za-z_][A-Za-z0-9_]*)"),
        ));
    }
    Ok(s.to_string())
}

/// Reject two fields mapping to the same column.
pub(crate) fn check_unique_columns(columns: &[(String, Span)]) -> Result<()> {
    let mut seen = HashSet::<&str>::new();
    for (col, span) in columns {
        if !seen.insert(col.as_str()) {
            return Err(Error::new(*span, format!("duplicate column '{col}'")));
        }
    }
    Ok(())
}
