//! Entity classification: tagged records → rows grouped by table.
//!
//! Records describe their own destination table and column/value pairs
//! through the [`Entity`] trait, usually via `#[derive(Entity)]`:
//!
//! ```ignore
//! use myorm::Entity;
//!
//! #[derive(Entity)]
//! #[orm(table = "users")]
//! struct NewUser {
//!     #[orm(column = "username")]
//!     username: String,
//!     #[orm(column = "email_address")]
//!     email: Option<String>,
//!     #[orm(skip)]
//!     password_confirmation: String,
//! }
//! ```

use crate::value::Row;
use indexmap::IndexMap;

/// A record that can be persisted as one table row.
///
/// The trait is object safe so heterogeneous batches can be passed as
/// `&[&dyn Entity]`.
pub trait Entity {
    /// Destination table.
    fn table_name(&self) -> &str;

    /// Persistable column/value pairs in declaration order.
    ///
    /// Excluded fields must not appear here.
    fn to_row(&self) -> Row;
}

impl<T: Entity + ?Sized> Entity for &T {
    fn table_name(&self) -> &str {
        (**self).table_name()
    }

    fn to_row(&self) -> Row {
        (**self).to_row()
    }
}

impl<T: Entity + ?Sized> Entity for Box<T> {
    fn table_name(&self) -> &str {
        (**self).table_name()
    }

    fn to_row(&self) -> Row {
        (**self).to_row()
    }
}

/// Group records by destination table.
///
/// Records without any persistable column are skipped. Rows keep their
/// encounter order within a table; tables appear in first-encounter order.
pub fn classify<E: Entity>(entities: impl IntoIterator<Item = E>) -> IndexMap<String, Vec<Row>> {
    let mut grouped: IndexMap<String, Vec<Row>> = IndexMap::new();

    for entity in entities {
        let row = entity.to_row();
        if row.is_empty() {
            continue;
        }
        grouped
            .entry(entity.table_name().to_string())
            .or_default()
            .push(row);
    }

    grouped
}
