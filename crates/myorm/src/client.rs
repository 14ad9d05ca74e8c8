//! Execution handle: the one capability the raw layer needs from a database.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use sqlx::mysql::{MySql, MySqlArguments, MySqlPool};
use sqlx::query::Query;
use tokio::sync::Mutex;

/// A trait that unifies pools and open transactions.
///
/// This lets raw operations accept either a pooled connection or a
/// transaction, so callers decide whether several writes commit together.
/// A handle must not be driven from two tasks at once; implementations that
/// wrap a single connection serialize access internally.
pub trait Executor: Send + Sync {
    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    /// Execute a statement, associating a tag (operation and table) for monitoring.
    ///
    /// The default implementation ignores `tag` and calls [`Executor::execute`].
    fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        let _ = tag;
        self.execute(sql, args)
    }
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        (**self).execute(sql, args)
    }

    fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        (**self).execute_tagged(tag, sql, args)
    }
}

/// Bind every value onto a sqlx query in order.
pub(crate) fn bind_all<'q>(
    sql: &'q str,
    args: &[Value],
) -> Query<'q, MySql, MySqlArguments> {
    let mut query = sqlx::query(sql);
    for value in args {
        query = match value.clone() {
            Value::Null => query.bind(None::<String>),
            Value::Bool(v) => query.bind(v),
            Value::Int(v) => query.bind(v),
            Value::UInt(v) => query.bind(v),
            Value::Float(v) => query.bind(v),
            Value::Text(v) => query.bind(v),
            Value::Bytes(v) => query.bind(v),
            Value::Date(v) => query.bind(v),
            Value::DateTime(v) => query.bind(v),
            Value::Json(v) => query.bind(sqlx::types::Json(v)),
        };
    }
    query
}

impl Executor for MySqlPool {
    async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<u64> {
        let result = bind_all(sql, args).execute(self).await?;
        Ok(result.rows_affected())
    }
}

/// An open transaction usable as an [`Executor`].
///
/// The transaction's single connection is guarded by an async mutex, so
/// statements issued through a shared `&Tx` run one at a time.
///
/// # Example
/// ```ignore
/// let tx = myorm::Tx::begin(&pool).await?;
/// myorm::raw::bulk_insert(&tx, "orders", rows).await?;
/// myorm::raw::update(&tx, "stock", sets, &preds).await?;
/// tx.commit().await?;
/// ```
pub struct Tx {
    inner: Mutex<sqlx::Transaction<'static, MySql>>,
}

impl Tx {
    /// Begin a transaction on a connection checked out from `pool`.
    pub async fn begin(pool: &MySqlPool) -> OrmResult<Self> {
        let tx = pool.begin().await?;
        Ok(Self {
            inner: Mutex::new(tx),
        })
    }

    /// Commit the transaction.
    pub async fn commit(self) -> OrmResult<()> {
        self.inner.into_inner().commit().await.map_err(OrmError::from)
    }

    /// Roll the transaction back.
    pub async fn rollback(self) -> OrmResult<()> {
        self.inner
            .into_inner()
            .rollback()
            .await
            .map_err(OrmError::from)
    }
}

impl Executor for Tx {
    async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<u64> {
        let mut guard = self.inner.lock().await;
        let result = bind_all(sql, args).execute(&mut **guard).await?;
        Ok(result.rows_affected())
    }
}
