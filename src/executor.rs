//! SQL execution against the backing store.
//!
//! The pipeline core never talks to the database directly; it hands a
//! finished statement to a `SqlExecutor` and gets rows back. Execution
//! failures are data, not panics: the outcome carries the database error
//! verbatim and the caller decides what to surface.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row};
use tracing::{debug, info, warn};

use crate::catalog::CatalogSource;
use crate::config::BALL_BY_BALL_TABLE;
use crate::error::{AnalyticsError, Result};

/// What came back from the store. `success == false` means the statement
/// was rejected or timed out; `error` then holds the reason verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub columns: Vec<String>,
    pub rows: Vec<HashMap<String, Value>>,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl ExecutionOutcome {
    fn failure(error: String, elapsed_ms: u64) -> Self {
        Self {
            success: false,
            columns: Vec::new(),
            rows: Vec::new(),
            error: Some(error),
            elapsed_ms,
        }
    }
}

#[async_trait]
pub trait SqlExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> ExecutionOutcome;
}

/// Reject anything that is not a single SELECT before it reaches the store.
/// The synthesizer only emits SELECTs, but the LLM path is not trusted.
pub fn ensure_read_only(sql: &str) -> Result<()> {
    let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map_err(|e| AnalyticsError::Execution(format!("SQL parse error: {}", e)))?;

    if statements.len() != 1 {
        return Err(AnalyticsError::Execution(format!(
            "expected exactly one statement, got {}",
            statements.len()
        )));
    }
    if !matches!(statements[0], sqlparser::ast::Statement::Query(_)) {
        return Err(AnalyticsError::Execution(
            "only SELECT statements are allowed".to_string(),
        ));
    }
    Ok(())
}

pub struct PostgresExecutor {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PostgresExecutor {
    pub async fn connect(database_url: &str, statement_timeout: Duration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .map_err(|e| AnalyticsError::Execution(format!("database connect failed: {}", e)))?;

        info!("connected to analytics database");
        Ok(Self {
            pool,
            statement_timeout,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_map(row: &PgRow) -> HashMap<String, Value> {
        let mut map = HashMap::new();
        for (idx, column) in row.columns().iter().enumerate() {
            map.insert(column.name().to_string(), Self::cell_to_json(row, idx));
        }
        map
    }

    /// Decode by probing types in descending likelihood for this schema:
    /// counts come back as bigints, ROUND() as numerics, names as text.
    fn cell_to_json(row: &PgRow, idx: usize) -> Value {
        if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
            return v.map(Value::from).unwrap_or(Value::Null);
        }
        if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
            return v.map(Value::from).unwrap_or(Value::Null);
        }
        if let Ok(v) = row.try_get::<Option<rust_decimal::Decimal>, _>(idx) {
            return v
                .and_then(|d| d.to_f64())
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null);
        }
        if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
            return v
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null);
        }
        if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
            return v.map(Value::from).unwrap_or(Value::Null);
        }
        if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
            return v.map(Value::from).unwrap_or(Value::Null);
        }
        Value::Null
    }
}

#[async_trait]
impl SqlExecutor for PostgresExecutor {
    async fn execute(&self, sql: &str) -> ExecutionOutcome {
        let started = Instant::now();

        if let Err(e) = ensure_read_only(sql) {
            warn!(error = %e, "rejected statement before execution");
            return ExecutionOutcome::failure(e.to_string(), 0);
        }

        debug!(sql, "executing statement");
        let fetched =
            tokio::time::timeout(self.statement_timeout, sqlx::query(sql).fetch_all(&self.pool))
                .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match fetched {
            Err(_) => ExecutionOutcome::failure(
                format!(
                    "execution timed out after {}s",
                    self.statement_timeout.as_secs()
                ),
                elapsed_ms,
            ),
            Ok(Err(e)) => ExecutionOutcome::failure(e.to_string(), elapsed_ms),
            Ok(Ok(rows)) => {
                let columns = rows
                    .first()
                    .map(|row| {
                        row.columns()
                            .iter()
                            .map(|c| c.name().to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                let rows = rows.iter().map(Self::row_to_map).collect::<Vec<_>>();
                info!(rows = rows.len(), elapsed_ms, "statement executed");
                ExecutionOutcome {
                    success: true,
                    columns,
                    rows,
                    error: None,
                    elapsed_ms,
                }
            }
        }
    }
}

/// Canonical names come straight from the ball-by-ball table: every batter
/// and bowler that ever appears, and every batting team.
pub struct PostgresCatalogSource {
    pool: PgPool,
}

impl PostgresCatalogSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogSource for PostgresCatalogSource {
    async fn all_player_names(&self) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT batter_full_name AS player_name FROM {table} WHERE batter_full_name IS NOT NULL\nUNION\nSELECT DISTINCT bowler_full_name FROM {table} WHERE bowler_full_name IS NOT NULL\nORDER BY 1",
            table = BALL_BY_BALL_TABLE
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AnalyticsError::Catalog(format!("player name load failed: {}", e)))?;
        Ok(rows
            .iter()
            .filter_map(|row| row.try_get::<String, _>(0).ok())
            .collect())
    }

    async fn all_team_names(&self) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT batting_team FROM {table} WHERE batting_team IS NOT NULL ORDER BY 1",
            table = BALL_BY_BALL_TABLE
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AnalyticsError::Catalog(format!("team name load failed: {}", e)))?;
        Ok(rows
            .iter()
            .filter_map(|row| row.try_get::<String, _>(0).ok())
            .collect())
    }
}
