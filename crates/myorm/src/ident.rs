//! SQL identifier quoting.
//!
//! [`quote`] wraps bare identifiers in backticks and leaves anything that
//! already looks like a SQL expression untouched, so callers can pass
//! `COUNT(*)` or `a.b AS c` where a column name is expected.
//!
//! Delimiter characters inside names are **not** escaped. Identifiers must
//! come from trusted code, never from end-user input.
//!
//! # Example
//! ```ignore
//! use myorm::quote;
//!
//! assert_eq!(quote("users"), "`users`");
//! assert_eq!(quote("u.id"), "`u`.`id`");
//! assert_eq!(quote("COUNT(*)"), "COUNT(*)");
//! ```

/// Identifier delimiter for the supported dialect.
pub const DELIMITER: char = '`';

/// Characters that mark an input as a raw SQL fragment.
const RAW_MARKERS: [char; 13] = [
    '`', ' ', '(', ':', '+', '-', '^', '=', '\'', '"', '*', '/', '%',
];

/// Quote an identifier, splitting dotted references into quoted segments.
pub fn quote(identifier: &str) -> String {
    if is_raw_fragment(identifier) {
        return identifier.to_string();
    }

    if identifier.contains('.') {
        return identifier
            .split('.')
            .map(quote)
            .collect::<Vec<_>>()
            .join(".");
    }

    let mut out = String::with_capacity(identifier.len() + 2);
    out.push(DELIMITER);
    out.push_str(identifier);
    out.push(DELIMITER);
    out
}

/// Quote every identifier in a list.
pub fn quote_all<S: AsRef<str>>(identifiers: &[S]) -> Vec<String> {
    identifiers.iter().map(|s| quote(s.as_ref())).collect()
}

fn is_raw_fragment(input: &str) -> bool {
    input.contains(RAW_MARKERS)
}
