use super::config::MonitorConfig;
use super::monitors::NoopMonitor;
use super::types::{QueryContext, QueryMonitor, QueryResult};
use crate::client::Executor;
use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// An instrumented execution handle that wraps an [`Executor`] with monitoring.
///
/// Monitoring must be explicitly enabled via `MonitorConfig::enable_monitoring()`.
/// The query timeout applies whether or not monitoring is enabled.
pub struct InstrumentedExecutor<E> {
    inner: E,
    monitor: Arc<dyn QueryMonitor>,
    config: MonitorConfig,
}

impl<E: Executor> InstrumentedExecutor<E> {
    /// Wrap `inner` with no monitoring.
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            monitor: Arc::new(NoopMonitor),
            config: MonitorConfig::default(),
        }
    }

    /// Set the monitor configuration.
    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the query monitor.
    pub fn with_monitor<M: QueryMonitor + 'static>(mut self, monitor: M) -> Self {
        self.monitor = Arc::new(monitor);
        self
    }

    /// Set the query monitor from an Arc.
    pub fn with_monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Set the query timeout.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.config.query_timeout = Some(timeout);
        self
    }

    pub fn enable_monitoring(mut self) -> Self {
        self.config.monitoring_enabled = true;
        self
    }

    pub fn disable_monitoring(mut self) -> Self {
        self.config.monitoring_enabled = false;
        self
    }

    pub fn is_monitoring_enabled(&self) -> bool {
        self.config.monitoring_enabled
    }

    /// Get the current configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Get a reference to the wrapped executor.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Get the wrapped executor, consuming this wrapper.
    pub fn into_inner(self) -> E {
        self.inner
    }

    fn report_result(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        if !self.config.monitoring_enabled {
            return;
        }

        self.monitor.on_query_complete(ctx, duration, result);

        if let Some(threshold) = self.config.slow_query_threshold {
            if duration > threshold {
                self.monitor.on_slow_query(ctx, duration);
            }
        }
    }

    async fn with_timeout<F>(&self, future: F) -> OrmResult<u64>
    where
        F: std::future::Future<Output = OrmResult<u64>> + Send,
    {
        match self.config.query_timeout {
            // Dropping the pending future abandons the statement.
            Some(timeout) => tokio::time::timeout(timeout, future)
                .await
                .unwrap_or(Err(OrmError::Timeout(timeout))),
            None => future.await,
        }
    }

    async fn execute_inner(&self, sql: &str, args: &[Value], tag: Option<&str>) -> OrmResult<u64> {
        let mut ctx = QueryContext::new(sql, args.len());
        if let Some(tag) = tag {
            ctx.tag = Some(tag.to_string());
        }

        if self.config.monitoring_enabled {
            self.monitor.on_query_start(&ctx);
        }

        let start = Instant::now();
        let result = match tag {
            Some(tag) => {
                self.with_timeout(self.inner.execute_tagged(tag, sql, args))
                    .await
            }
            None => self.with_timeout(self.inner.execute(sql, args)).await,
        };
        let duration = start.elapsed();

        let query_result = match &result {
            Ok(n) => QueryResult::Affected(*n),
            Err(OrmError::Timeout(d)) => QueryResult::Error(format!("timeout after {d:?}")),
            Err(e) => QueryResult::error(e.to_string()),
        };

        self.report_result(&ctx, duration, &query_result);
        result
    }
}

impl<E: Executor> Executor for InstrumentedExecutor<E> {
    async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<u64> {
        self.execute_inner(sql, args, None).await
    }

    async fn execute_tagged(&self, tag: &str, sql: &str, args: &[Value]) -> OrmResult<u64> {
        self.execute_inner(sql, args, Some(tag)).await
    }
}
