use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::{Arguments, PgPool};
use tracing::{debug, info, warn};

use super::{Query, Record, RecordStore, StoreError, Update};
use crate::config::DatabaseConfig;
use crate::filter::{Filter, SqlResult};

/// PostgreSQL-backed store. Every statement runs on its own pooled connection;
/// nothing spans more than one statement.
pub struct PgStore {
    pool: PgPool,
    log_queries: bool,
    slow_query_threshold: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            log_queries: false,
            slow_query_threshold: Duration::from_millis(500),
        }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;
        info!(max_connections = config.max_connections, "Created database pool");

        Ok(Self {
            pool,
            log_queries: config.enable_query_logging,
            slow_query_threshold: Duration::from_millis(config.slow_query_threshold_ms),
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    async fn fetch_records(&self, sql: SqlResult) -> Result<Vec<Record>, StoreError> {
        self.log(&sql);
        let started = Instant::now();
        let rows = sqlx::query_scalar_with::<_, Value, _>(&sql.query, bind_params(&sql.params))
            .fetch_all(&self.pool)
            .await?;
        self.warn_if_slow(&sql, started);

        rows.into_iter()
            .map(|row| match row {
                Value::Object(record) => Ok(record),
                other => Err(StoreError::RowShape(format!("expected JSON object, got {}", other))),
            })
            .collect()
    }

    fn log(&self, sql: &SqlResult) {
        if self.log_queries {
            debug!(query = %sql.query, params = sql.params.len(), "sql");
        }
    }

    fn warn_if_slow(&self, sql: &SqlResult, started: Instant) {
        let elapsed = started.elapsed();
        if elapsed > self.slow_query_threshold {
            warn!(query = %sql.query, elapsed_ms = elapsed.as_millis() as u64, "slow query");
        }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn select(&self, query: &Query) -> Result<Vec<Record>, StoreError> {
        let sql = Filter::from_query(query)?.to_sql()?;
        self.fetch_records(sql).await
    }

    async fn count(&self, query: &Query) -> Result<i64, StoreError> {
        let sql = Filter::from_query(query)?.to_count_sql()?;
        self.log(&sql);
        let count = sqlx::query_scalar_with::<_, i64, _>(&sql.query, bind_params(&sql.params))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update(&self, update: &Update) -> Result<Vec<Record>, StoreError> {
        let mut filter = Filter::new(&update.table)?;
        filter.where_clause(update.conditions.clone());
        let sql = filter.to_update_sql(&update.patch, &update.returning)?;
        self.fetch_records(sql).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "postgres"
    }
}

fn bind_params(params: &[Value]) -> PgArguments {
    let mut args = PgArguments::default();
    for p in params {
        bind_param(&mut args, p);
    }
    args
}

fn bind_param(args: &mut PgArguments, v: &Value) {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            args.add(none);
        }
        Value::Bool(b) => args.add(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                args.add(i);
            } else if let Some(f) = n.as_f64() {
                args.add(f);
            } else {
                args.add(n.to_string());
            }
        }
        Value::String(s) => args.add(s.clone()),
        // Patches travel as one JSONB document
        Value::Object(_) | Value::Array(_) => args.add(v.clone()),
    }
}
