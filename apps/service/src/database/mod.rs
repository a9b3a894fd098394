/// Persistence for monitored targets
///
/// `TargetStore` is the seam the monitor core talks to. `LibsqlTargetStore`
/// is the durable backend, `MemoryTargetStore` keeps everything in-process.
pub mod memory;
pub mod migrations;
pub mod models;
pub mod repository;

pub use memory::MemoryTargetStore;
pub use repository::{LibsqlTargetStore, StoreError, StoreResult, TargetStore};

use anyhow::Result;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}
