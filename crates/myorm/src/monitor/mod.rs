//! Query monitoring, slow-query logging and timeouts.
//!
//! Monitoring is purely observational: it never changes what is executed.
//!
//! # Example
//!
//! ```rust,ignore
//! use myorm::monitor::{InstrumentedExecutor, MonitorConfig, TracingMonitor};
//! use std::time::Duration;
//!
//! let config = MonitorConfig::new()
//!     .with_query_timeout(Duration::from_secs(30))
//!     .with_slow_query_threshold(Duration::from_millis(500))
//!     .enable_monitoring();
//!
//! let handle = InstrumentedExecutor::new(pool)
//!     .with_config(config)
//!     .with_monitor(TracingMonitor::new());
//!
//! myorm::raw::delete(&handle, "sessions", &preds).await?;
//! ```

mod config;
mod instrumented;
mod monitors;
mod types;

#[cfg(test)]
mod tests;

pub use config::MonitorConfig;
pub use instrumented::InstrumentedExecutor;
pub use monitors::{CompositeMonitor, NoopMonitor, QueryStats, StatsMonitor, TracingMonitor};
pub use types::{QueryContext, QueryMonitor, QueryResult, QueryType};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
