//! Uptime monitoring for the upstream APIs behind the Kokoromi platform.
//!
//! [`MonitorService`] is the entry point: it loads targets from a
//! [`TargetStore`], schedules a periodic probe for each active one and keeps
//! the schedules in step with administrative changes.

pub mod config;
pub mod database;
pub mod error;
pub mod monitoring;
pub mod pool;
pub mod seed;
pub mod validation;

#[cfg(test)]
mod testing;

pub use database::{LibsqlTargetStore, MemoryTargetStore, TargetStore};
pub use error::{MonitorError, MonitorResult};
pub use monitoring::{HealthStatus, HttpProber, MonitorService, ProbeOutcome, Prober};

use std::path::Path;
use std::sync::Arc;

/// Open the database at `path`, run migrations and return a store over it
pub async fn open_store(path: impl AsRef<Path>) -> anyhow::Result<Arc<LibsqlTargetStore>> {
    let pool = pool::open_pool(path).await?;
    let conn = pool.get().await?;
    database::initialize_database(&conn).await?;
    drop(conn);

    Ok(Arc::new(LibsqlTargetStore::new(pool)))
}
