//! # myorm
//!
//! A lightweight MySQL data-access helper for Rust.
//!
//! ## Features
//!
//! - **Predicate algebra**: compose `WHERE`/`OR`/`IN`/`JOIN`/`GROUP BY`/`HAVING`/`ORDER BY`/`LIMIT`/`OFFSET`
//!   fragments as plain values; clause order is fixed by the assembler, not by the caller
//! - **Placeholder safety**: every fragment's `?` count is checked against its arguments before any SQL is sent
//! - **Raw writes**: multi-row `INSERT [IGNORE]`, ordered `UPDATE ... SET`, `DELETE`
//! - **Entities**: `#[derive(Entity)]` maps a struct to its table and columns at compile time
//! - **Transaction-friendly**: pass a [`Tx`] anywhere an [`Executor`] is expected
//! - **Query monitoring**: timeouts, slow-query logging and statistics via [`monitor`]
//!
//! ## Building statements
//!
//! ```ignore
//! use myorm::{Predicate, args, build_select};
//!
//! let stmt = build_select(
//!     "users",
//!     &["id", "name"],
//!     &[
//!         Predicate::filter("age > ?", args![18]),
//!         Predicate::order_by("name ASC"),
//!         Predicate::limit(10),
//!     ],
//! )?;
//! assert_eq!(
//!     stmt.sql(),
//!     "SELECT `id`,`name`  FROM `users`  WHERE (age > ?) ORDER BY name ASC LIMIT ?"
//! );
//! ```
//!
//! ## Writing rows
//!
//! ```ignore
//! use myorm::{Entity, raw};
//!
//! #[derive(Entity)]
//! #[orm(table = "users")]
//! struct NewUser {
//!     #[orm(column = "name")]
//!     name: String,
//!     #[orm(column = "email_address")]
//!     email: Option<String>,
//! }
//!
//! let pool = myorm::create_pool(&myorm::DbConfig::load("myorm.toml")?).await?;
//! let tx = myorm::Tx::begin(&pool).await?;
//! let report = raw::bulk_insert_entities(&tx, false, &users).await?;
//! tx.commit().await?;
//! ```

pub mod assemble;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod ident;
pub mod monitor;
pub mod pool;
pub mod predicate;
pub mod raw;
pub mod statement;
pub mod value;

pub use assemble::{Clause, assemble};
pub use client::{Executor, Tx};
pub use config::DbConfig;
pub use entity::{Entity, classify};
pub use error::{OrmError, OrmResult};
pub use ident::quote;
pub use monitor::{
    CompositeMonitor, InstrumentedExecutor, MonitorConfig, NoopMonitor, QueryContext, QueryMonitor,
    QueryResult, QueryStats, QueryType, StatsMonitor, TracingMonitor,
};
pub use pool::{create_pool, create_pool_lazy};
pub use predicate::{Category, JoinKind, Predicate};
pub use raw::BulkInsertReport;
pub use statement::{Action, Statement, build, build_delete, build_select};
pub use value::{Row, Value};

#[cfg(feature = "derive")]
pub use myorm_derive::Entity;
