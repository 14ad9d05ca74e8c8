//! Connection pool utilities

use crate::config::DbConfig;
use crate::error::{OrmError, OrmResult};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

/// Pool size used when `max_open_conns` is zero.
pub const DEFAULT_MAX_OPEN_CONNS: u32 = 10;

/// Create a connection pool and open its first connection.
///
/// Fails with [`OrmError::UnknownDriver`] before touching the network when
/// `config.driver` is not `mysql`.
///
/// # Example
///
/// ```ignore
/// let config = myorm::DbConfig::load("myorm.toml")?;
/// let pool = myorm::create_pool(&config).await?;
/// ```
pub async fn create_pool(config: &DbConfig) -> OrmResult<MySqlPool> {
    let options = pool_options(config)?;
    let url = config.to_url()?;
    let pool = options
        .connect(&url)
        .await
        .map_err(|e| OrmError::Connection(e.to_string()))?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        schema = %config.schema,
        "mysql pool ready"
    );
    Ok(pool)
}

/// Create a connection pool without connecting; connections open on first use.
///
/// Must be called from within a Tokio runtime.
pub fn create_pool_lazy(config: &DbConfig) -> OrmResult<MySqlPool> {
    let options = pool_options(config)?;
    let url = config.to_url()?;
    options
        .connect_lazy(&url)
        .map_err(|e| OrmError::Connection(e.to_string()))
}

/// Translate pool tuning from `config` into sqlx pool options.
///
/// sqlx has no cap on idle connections, so `max_idle_conns` is not applied;
/// idle connections are reaped by `max_idle_time_secs` instead.
pub fn pool_options(config: &DbConfig) -> OrmResult<MySqlPoolOptions> {
    if config.driver != "mysql" {
        return Err(OrmError::UnknownDriver(config.driver.clone()));
    }

    let max = if config.max_open_conns == 0 {
        DEFAULT_MAX_OPEN_CONNS
    } else {
        config.max_open_conns
    };

    Ok(MySqlPoolOptions::new()
        .max_connections(max)
        .idle_timeout(config.max_idle_time())
        .max_lifetime(config.conn_max_lifetime()))
}
