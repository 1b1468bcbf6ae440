//! Database metrics.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Records the duration of one repository query.
pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!("db_query_duration_seconds", "query" => query_name).record(duration_secs);
}

/// Publishes connection pool gauges. Called when metrics are scraped.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("db_pool_connections", "state" => "active").set(size.saturating_sub(idle) as f64);
    gauge!("db_pool_connections", "state" => "idle").set(idle as f64);
}

/// Times a repository query.
///
/// ```ignore
/// let timer = QueryTimer::new("find_template_by_id");
/// let result = sqlx::query_as::<_, TemplateEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time under the query name.
    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}
