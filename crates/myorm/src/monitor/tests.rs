use super::*;
use crate::client::Executor;
use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use std::sync::Arc;
use std::time::Duration;

struct DummyExecutor;
impl Executor for DummyExecutor {
    async fn execute(&self, _: &str, _: &[Value]) -> OrmResult<u64> {
        Ok(3)
    }
}

struct FailingExecutor;
impl Executor for FailingExecutor {
    async fn execute(&self, _: &str, _: &[Value]) -> OrmResult<u64> {
        Err(OrmError::Other("Duplicate entry '1' for key 'PRIMARY'".into()))
    }
}

struct SlowExecutor(Duration);
impl Executor for SlowExecutor {
    async fn execute(&self, _: &str, _: &[Value]) -> OrmResult<u64> {
        tokio::time::sleep(self.0).await;
        Ok(1)
    }
}

#[test]
fn test_query_type_detection() {
    assert_eq!(QueryType::from_sql("SELECT * FROM users"), QueryType::Select);
    assert_eq!(QueryType::from_sql("  select id FROM users"), QueryType::Select);
    assert_eq!(
        QueryType::from_sql("INSERT IGNORE INTO `users` (`id`) VALUES (?)"),
        QueryType::Insert
    );
    assert_eq!(
        QueryType::from_sql("UPDATE `users` SET `users`.`name` = ?"),
        QueryType::Update
    );
    assert_eq!(QueryType::from_sql("DELETE FROM `users`"), QueryType::Delete);
    assert_eq!(QueryType::from_sql("CREATE TABLE t (id INT)"), QueryType::Other);
    assert_eq!(QueryType::from_sql(""), QueryType::Other);
}

#[test]
fn test_tracing_monitor_truncation() {
    let monitor = TracingMonitor::new().max_sql_length(10);
    assert_eq!(monitor.truncate_sql("SELECT * FROM users"), "SELECT * F...");
    assert_eq!(monitor.truncate_sql("SELECT 1"), "SELECT 1");
    assert_eq!(
        TracingMonitor::new().no_truncate().truncate_sql("SELECT * FROM users"),
        "SELECT * FROM users"
    );
}

#[test]
fn truncation_respects_char_boundaries() {
    assert_eq!(truncate_sql_bytes("héllo", 2), "h");
    assert_eq!(truncate_sql_bytes("abc", 10), "abc");
}

#[test]
fn error_results_are_truncated() {
    let long = "x".repeat(2000);
    match QueryResult::error(long) {
        QueryResult::Error(msg) => {
            assert_eq!(msg.len(), 512 + 3);
            assert!(msg.ends_with("..."));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(QueryResult::Affected(2).to_string(), "2 affected");
}

#[test]
fn test_stats_monitor() {
    let monitor = StatsMonitor::new();
    let ctx = QueryContext::new("DELETE FROM `sessions`", 0);

    monitor.on_query_complete(&ctx, Duration::from_millis(10), &QueryResult::Affected(5));
    monitor.on_query_complete(&ctx, Duration::from_millis(20), &QueryResult::Affected(3));

    let stats = monitor.stats();
    assert_eq!(stats.total_queries, 2);
    assert_eq!(stats.delete_count, 2);
    assert_eq!(stats.total_duration, Duration::from_millis(30));
    assert_eq!(stats.max_duration, Duration::from_millis(20));
    assert_eq!(stats.slowest_query.as_deref(), Some("DELETE FROM `sessions`"));
}

#[test]
fn stats_monitor_tracks_all_query_types() {
    let monitor = StatsMonitor::new();
    for sql in [
        "SELECT 1",
        "INSERT INTO t (x) VALUES (1)",
        "UPDATE t SET x = 2",
        "DELETE FROM t",
        "TRUNCATE t",
    ] {
        monitor.on_query_complete(
            &QueryContext::new(sql, 0),
            Duration::from_millis(1),
            &QueryResult::Affected(1),
        );
    }
    monitor.on_query_complete(
        &QueryContext::new("INSERT INTO t (x) VALUES (1)", 0),
        Duration::from_millis(1),
        &QueryResult::Error("boom".into()),
    );

    let stats = monitor.stats();
    assert_eq!(stats.total_queries, 6);
    assert_eq!(stats.select_count, 1);
    assert_eq!(stats.insert_count, 2);
    assert_eq!(stats.update_count, 1);
    assert_eq!(stats.delete_count, 1);
    assert_eq!(stats.failed_queries, 1);

    monitor.reset();
    let stats = monitor.stats();
    assert_eq!(stats.total_queries, 0);
    assert!(stats.slowest_query.is_none());
}

#[test]
fn composite_monitor_fans_out() {
    let a = Arc::new(StatsMonitor::new());
    let b = Arc::new(StatsMonitor::new());
    let composite = CompositeMonitor::new()
        .add(NoopMonitor)
        .add_arc(a.clone())
        .add_arc(b.clone());

    let ctx = QueryContext::new("SELECT 1", 0);
    composite.on_query_complete(&ctx, Duration::from_millis(1), &QueryResult::Affected(0));
    composite.on_slow_query(&ctx, Duration::from_millis(1));

    assert_eq!(a.stats().total_queries, 1);
    assert_eq!(b.stats().slow_count, 1);
}

#[tokio::test]
async fn disabled_monitoring_reports_nothing() {
    let stats = Arc::new(StatsMonitor::new());
    let handle = InstrumentedExecutor::new(DummyExecutor).with_monitor_arc(stats.clone());

    assert!(!handle.is_monitoring_enabled());
    assert_eq!(handle.execute("DELETE FROM t", &[]).await.unwrap(), 3);
    assert_eq!(stats.stats().total_queries, 0);
}

#[tokio::test]
async fn tagged_statements_propagate_to_monitor() {
    #[derive(Default)]
    struct TagCapture(std::sync::Mutex<Option<String>>);

    impl QueryMonitor for TagCapture {
        fn on_query_complete(&self, ctx: &QueryContext, _: Duration, _: &QueryResult) {
            *self.0.lock().unwrap() = ctx.tag.clone();
        }
    }

    let capture = Arc::new(TagCapture::default());
    let handle = InstrumentedExecutor::new(DummyExecutor)
        .with_config(MonitorConfig::new().enable_monitoring())
        .with_monitor_arc(capture.clone());

    handle
        .execute_tagged("bulk_insert(users)", "INSERT INTO `users` (`id`) VALUES (?)", &[
            Value::Int(1),
        ])
        .await
        .unwrap();

    assert_eq!(capture.0.lock().unwrap().as_deref(), Some("bulk_insert(users)"));
}

#[tokio::test]
async fn failures_are_counted_and_returned() {
    let stats = Arc::new(StatsMonitor::new());
    let handle = InstrumentedExecutor::new(FailingExecutor)
        .with_config(MonitorConfig::new().enable_monitoring())
        .with_monitor_arc(stats.clone());

    let err = handle.execute("INSERT INTO t (id) VALUES (1)", &[]).await.unwrap_err();
    assert!(matches!(err, OrmError::Other(_)));
    assert_eq!(stats.stats().failed_queries, 1);
    assert_eq!(stats.stats().insert_count, 1);
}

#[tokio::test]
async fn timeout_returns_error() {
    let stats = Arc::new(StatsMonitor::new());
    let handle = InstrumentedExecutor::new(SlowExecutor(Duration::from_secs(60)))
        .with_config(
            MonitorConfig::new()
                .with_query_timeout(Duration::from_millis(10))
                .enable_monitoring(),
        )
        .with_monitor_arc(stats.clone());

    let err = handle.execute("DELETE FROM t", &[]).await.unwrap_err();
    assert!(matches!(err, OrmError::Timeout(d) if d == Duration::from_millis(10)));
    assert!(err.is_timeout());
    assert_eq!(stats.stats().failed_queries, 1);
}

#[tokio::test]
async fn slow_query_threshold_fires() {
    #[derive(Default)]
    struct SlowCapture(std::sync::Mutex<bool>);

    impl QueryMonitor for SlowCapture {
        fn on_query_complete(&self, _: &QueryContext, _: Duration, _: &QueryResult) {}
        fn on_slow_query(&self, _: &QueryContext, _: Duration) {
            *self.0.lock().unwrap() = true;
        }
    }

    let capture = Arc::new(SlowCapture::default());
    let handle = InstrumentedExecutor::new(SlowExecutor(Duration::from_millis(50)))
        .with_config(
            MonitorConfig::new()
                .with_slow_query_threshold(Duration::from_millis(10))
                .enable_monitoring(),
        )
        .with_monitor_arc(capture.clone());

    handle.execute("UPDATE t SET x = ?", &[Value::Int(1)]).await.unwrap();
    assert!(*capture.0.lock().unwrap());
}

#[tokio::test]
async fn wrapper_exposes_inner_handle() {
    let handle = InstrumentedExecutor::new(DummyExecutor).with_query_timeout(Duration::from_secs(1));
    assert_eq!(handle.config().query_timeout, Some(Duration::from_secs(1)));
    assert_eq!(handle.inner().execute("SELECT 1", &[]).await.unwrap(), 3);
    let _inner: DummyExecutor = handle.into_inner();
}
