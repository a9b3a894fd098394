use async_trait::async_trait;
use libsql::{Row, Value, params, params::Params};
use thiserror::Error;

use super::models::{
    HealthSummary, HealthUpdate, MonitoredTarget, NewTarget, TargetFilter, TargetId, TargetPatch,
    i64_to_timestamp, stored_now, timestamp_to_i64,
};
use crate::monitoring::types::HealthStatus;
use crate::pool::{LibsqlPool, PooledConnection};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an API named '{0}' already exists")]
    DuplicateName(String),
    #[error("database error: {0}")]
    Database(#[from] libsql::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool::managed::PoolError<libsql::Error>),
    #[error("corrupt row in api_targets: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for monitored targets and their last-known health
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Insert a new target; fails with `DuplicateName` if the name is taken
    async fn create(&self, target: NewTarget) -> StoreResult<MonitoredTarget>;

    /// All targets matching the filter, ordered by name
    async fn find_all(&self, filter: &TargetFilter) -> StoreResult<Vec<MonitoredTarget>>;

    async fn find_by_id(&self, id: TargetId) -> StoreResult<Option<MonitoredTarget>>;

    async fn find_by_url(&self, url: &str) -> StoreResult<Option<MonitoredTarget>>;

    /// Targets that should be scheduled at startup
    async fn list_active(&self) -> StoreResult<Vec<MonitoredTarget>> {
        self.find_all(&TargetFilter::active()).await
    }

    /// Apply a patch to the editable attributes. Returns `None` if the
    /// target does not exist.
    async fn update(
        &self,
        id: TargetId,
        patch: &TargetPatch,
    ) -> StoreResult<Option<MonitoredTarget>>;

    /// Write the health fields of one probe in a single statement.
    /// Returns `false` if the target no longer exists.
    async fn record_health(&self, id: TargetId, health: &HealthUpdate) -> StoreResult<bool>;

    /// Returns `false` if there was nothing to delete
    async fn destroy(&self, id: TargetId) -> StoreResult<bool>;

    async fn count(&self, filter: &TargetFilter) -> StoreResult<u64>;

    async fn health_summary(&self) -> StoreResult<HealthSummary>;
}

const TARGET_COLUMNS: &str = "id, name, url, description, category, is_active, \
                              check_interval, status, response_time_ms, last_error, \
                              last_check, created_at, updated_at";

/// LibSQL-backed target store
pub struct LibsqlTargetStore {
    pool: LibsqlPool,
}

impl LibsqlTargetStore {
    pub fn new(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    async fn get_conn(&self) -> StoreResult<PooledConnection> {
        Ok(self.pool.get().await?)
    }

    async fn query_targets(&self, sql: &str, params: Params) -> StoreResult<Vec<MonitoredTarget>> {
        let conn = self.get_conn().await?;
        let mut rows = conn.query(sql, params).await?;
        let mut targets = Vec::new();

        while let Some(row) = rows.next().await? {
            targets.push(row_to_target(&row)?);
        }

        Ok(targets)
    }

    async fn query_one(&self, sql: &str, params: Params) -> StoreResult<Option<MonitoredTarget>> {
        Ok(self.query_targets(sql, params).await?.into_iter().next())
    }

    async fn name_taken(&self, name: &str, except: Option<TargetId>) -> StoreResult<bool> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT id FROM api_targets WHERE name = ? AND id != ?",
                params![name, except.unwrap_or(-1)],
            )
            .await?;

        Ok(rows.next().await?.is_some())
    }
}

fn filter_clause(filter: &TargetFilter) -> (String, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut values = Vec::new();

    if let Some(category) = &filter.category {
        conditions.push("category = ?");
        values.push(Value::Text(category.clone()));
    }
    if let Some(active) = filter.active {
        conditions.push("is_active = ?");
        values.push(Value::Integer(active as i64));
    }

    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), values)
    }
}

fn row_to_target(row: &Row) -> StoreResult<MonitoredTarget> {
    let status: String = row.get(7)?;
    let last_check: Option<i64> = row.get(10)?;

    Ok(MonitoredTarget {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        is_active: row.get::<i64>(5)? != 0,
        check_interval: u32::try_from(row.get::<i64>(6)?)
            .map_err(|e| StoreError::Corrupt(format!("check_interval: {e}")))?,
        status: status.parse::<HealthStatus>().map_err(|e| StoreError::Corrupt(e.to_string()))?,
        response_time_ms: row.get::<Option<i64>>(8)?.map(|v| v as u64),
        last_error: row.get(9)?,
        last_check: last_check.map(i64_to_timestamp),
        created_at: i64_to_timestamp(row.get(11)?),
        updated_at: i64_to_timestamp(row.get(12)?),
    })
}

/// SQLite reports uniqueness violations only through the message text
fn is_unique_violation(error: &libsql::Error) -> bool {
    error.to_string().contains("UNIQUE constraint failed")
}

#[async_trait]
impl TargetStore for LibsqlTargetStore {
    async fn create(&self, target: NewTarget) -> StoreResult<MonitoredTarget> {
        if self.name_taken(&target.name, None).await? {
            return Err(StoreError::DuplicateName(target.name));
        }

        let now = stored_now();
        let record = target.into_target(0, now);
        let conn = self.get_conn().await?;

        conn.execute(
            "INSERT INTO api_targets (name, url, description, category, is_active,
                 check_interval, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.name.clone(),
                record.url.clone(),
                record.description.clone(),
                record.category.clone(),
                record.is_active as i64,
                record.check_interval as i64,
                record.status.as_str(),
                timestamp_to_i64(now),
                timestamp_to_i64(now)
            ],
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateName(record.name.clone())
            } else {
                e.into()
            }
        })?;

        Ok(MonitoredTarget { id: conn.last_insert_rowid(), ..record })
    }

    async fn find_all(&self, filter: &TargetFilter) -> StoreResult<Vec<MonitoredTarget>> {
        let (clause, values) = filter_clause(filter);
        let sql = format!("SELECT {TARGET_COLUMNS} FROM api_targets{clause} ORDER BY name ASC");
        self.query_targets(&sql, Params::Positional(values)).await
    }

    async fn find_by_id(&self, id: TargetId) -> StoreResult<Option<MonitoredTarget>> {
        let sql = format!("SELECT {TARGET_COLUMNS} FROM api_targets WHERE id = ?");
        self.query_one(&sql, Params::Positional(vec![Value::Integer(id)])).await
    }

    async fn find_by_url(&self, url: &str) -> StoreResult<Option<MonitoredTarget>> {
        let sql =
            format!("SELECT {TARGET_COLUMNS} FROM api_targets WHERE url = ? ORDER BY id LIMIT 1");
        self.query_one(&sql, Params::Positional(vec![Value::Text(url.to_string())])).await
    }

    async fn update(
        &self,
        id: TargetId,
        patch: &TargetPatch,
    ) -> StoreResult<Option<MonitoredTarget>> {
        let Some(mut target) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            if self.name_taken(name, Some(id)).await? {
                return Err(StoreError::DuplicateName(name.clone()));
            }
        }

        target.apply(patch);
        target.updated_at = stored_now();

        let conn = self.get_conn().await?;
        let changed = conn
            .execute(
                "UPDATE api_targets
                 SET name = ?, url = ?, description = ?, category = ?, is_active = ?,
                     check_interval = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    target.name.clone(),
                    target.url.clone(),
                    target.description.clone(),
                    target.category.clone(),
                    target.is_active as i64,
                    target.check_interval as i64,
                    timestamp_to_i64(target.updated_at),
                    id
                ],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateName(target.name.clone())
                } else {
                    e.into()
                }
            })?;

        // Deleted between the read and the write
        if changed == 0 {
            return Ok(None);
        }

        Ok(Some(target))
    }

    async fn record_health(&self, id: TargetId, health: &HealthUpdate) -> StoreResult<bool> {
        let conn = self.get_conn().await?;
        let changed = conn
            .execute(
                "UPDATE api_targets
                 SET status = ?, response_time_ms = ?, last_error = ?, last_check = ?,
                     updated_at = ?
                 WHERE id = ?",
                params![
                    health.status.as_str(),
                    health.response_time_ms.map(|v| v as i64),
                    health.last_error.clone(),
                    timestamp_to_i64(health.checked_at),
                    timestamp_to_i64(stored_now()),
                    id
                ],
            )
            .await?;

        Ok(changed > 0)
    }

    async fn destroy(&self, id: TargetId) -> StoreResult<bool> {
        let conn = self.get_conn().await?;
        let changed = conn.execute("DELETE FROM api_targets WHERE id = ?", params![id]).await?;
        Ok(changed > 0)
    }

    async fn count(&self, filter: &TargetFilter) -> StoreResult<u64> {
        let (clause, values) = filter_clause(filter);
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(&format!("SELECT COUNT(*) FROM api_targets{clause}"), Params::Positional(values))
            .await?;

        match rows.next().await? {
            Some(row) => Ok(row.get::<i64>(0)? as u64),
            None => Ok(0),
        }
    }

    async fn health_summary(&self) -> StoreResult<HealthSummary> {
        let conn = self.get_conn().await?;
        let mut rows =
            conn.query("SELECT status, COUNT(*) FROM api_targets GROUP BY status", ()).await?;
        let mut summary = HealthSummary::default();

        while let Some(row) = rows.next().await? {
            let status: String = row.get(0)?;
            let count = row.get::<i64>(1)? as u64;
            let status =
                status.parse::<HealthStatus>().map_err(|e| StoreError::Corrupt(e.to_string()))?;
            summary.add(status, count);
        }

        Ok(summary)
    }
}
