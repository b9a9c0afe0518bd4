//! Pool collectors
//!
//! Occupancy gauges describe the pool itself. Acquisition latency and
//! failures carry the caller's operation label so a slow probe can be told
//! apart from a slow request path.

use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};
use sqlx::{pool::PoolConnection, PgPool, Postgres};
use tracing::warn;

lazy_static::lazy_static! {
    static ref POOL_CONNECTIONS: IntGaugeVec = register_int_gauge_vec!(
        "db_pool_connections",
        "Pooled connections by state (idle/in_use/max)",
        &["service", "state"]
    ).expect("failed to register db_pool_connections");

    static ref POOL_ACQUIRE_SECONDS: HistogramVec = register_histogram_vec!(
        "db_pool_acquire_seconds",
        "Time spent waiting for a pooled connection",
        &["service", "operation"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    ).expect("failed to register db_pool_acquire_seconds");

    static ref POOL_ACQUIRE_FAILURES: IntCounterVec = register_int_counter_vec!(
        "db_pool_acquire_failures_total",
        "Connection acquisitions that failed, by reason",
        &["service", "operation", "reason"]
    ).expect("failed to register db_pool_acquire_failures_total");
}

/// Point-in-time occupancy of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
    pub max: u32,
}

impl PoolStats {
    pub fn of(pool: &PgPool) -> Self {
        Self {
            size: pool.size(),
            idle: pool.num_idle() as u32,
            max: pool.options().get_max_connections(),
        }
    }

    /// Connections currently checked out. The pool's counters are sampled
    /// separately, so idle can briefly exceed size.
    pub fn in_use(&self) -> u32 {
        self.size.saturating_sub(self.idle)
    }
}

/// Collectors for one service's pool
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    service: String,
}

impl PoolMetrics {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Sample `pool` and publish its occupancy gauges
    pub fn refresh(&self, pool: &PgPool) -> PoolStats {
        let stats = PoolStats::of(pool);
        for (state, value) in [
            ("idle", stats.idle),
            ("in_use", stats.in_use()),
            ("max", stats.max),
        ] {
            POOL_CONNECTIONS
                .with_label_values(&[&self.service, state])
                .set(value as i64);
        }
        stats
    }

    /// `pool.acquire()`, timed and counted under `operation`
    pub async fn acquire(
        &self,
        pool: &PgPool,
        operation: &str,
    ) -> Result<PoolConnection<Postgres>, sqlx::Error> {
        let timer = POOL_ACQUIRE_SECONDS
            .with_label_values(&[&self.service, operation])
            .start_timer();
        let result = pool.acquire().await;
        timer.observe_duration();

        if let Err(err) = &result {
            let reason = failure_reason(err);
            POOL_ACQUIRE_FAILURES
                .with_label_values(&[&self.service, operation, reason])
                .inc();
            warn!(service = %self.service, operation, reason, error = %err, "pool acquire failed");
        }

        result
    }

    #[cfg(test)]
    fn failures(&self, operation: &str, reason: &str) -> u64 {
        POOL_ACQUIRE_FAILURES
            .with_label_values(&[&self.service, operation, reason])
            .get()
    }
}

fn failure_reason(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::PoolTimedOut => "timeout",
        sqlx::Error::PoolClosed => "closed",
        sqlx::Error::Io(_) => "io",
        sqlx::Error::Tls(_) => "tls",
        sqlx::Error::Database(_) => "database",
        _ => "other",
    }
}
