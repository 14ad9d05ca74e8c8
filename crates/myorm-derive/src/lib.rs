//! Derive macros for myorm
//!
//! Provides `#[derive(Entity)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod entity;
mod sql_ident;

/// Derive `Entity` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use myorm::Entity;
///
/// #[derive(Entity)]
/// #[orm(table = "users")]
/// struct NewUser {
///     #[orm(column = "username")]
///     username: String,
///     // not persisted: no column tag
///     remember_me: bool,
///     #[orm(column = "email_address")]
///     email: Option<String>,
///     #[orm(skip)]
///     password_confirmation: String,
/// }
/// ```
///
/// # Generated
///
/// - `impl myorm::Entity` (`table_name`, `to_row`)
/// - `TABLE: &'static str` - Table name
/// - `COLUMNS: &'static [&'static str]` - Persisted columns in declaration order
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Specify table name (required)
/// - `#[orm(column = "name")]` - Persist the field under this column
/// - `#[orm(skip)]` - Do not persist the field
///
/// Only fields tagged with a non-empty `column` are persisted; untagged fields
/// and `column = ""` are left out just like `skip`.
///
/// Persisted field types must implement `Clone` and `Into<myorm::Value>`.
#[proc_macro_derive(Entity, attributes(orm))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
