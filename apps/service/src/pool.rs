use std::path::Path;
use std::time::Duration;

use deadpool::managed::{Manager, Metrics, Object, Pool, PoolConfig, RecycleResult};
use libsql::{Connection, Database};

const MAX_CONNECTIONS: usize = 8;

/// Scheduled ticks write concurrently; wait on the SQLite lock instead of
/// failing with `SQLITE_BUSY`
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Hands out connections to one local libsql database
pub struct ConnectionManager {
    database: Database,
}

impl Manager for ConnectionManager {
    type Type = Connection;
    type Error = libsql::Error;

    async fn create(&self) -> Result<Connection, libsql::Error> {
        let conn = self.database.connect()?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    async fn recycle(&self, conn: &mut Connection, _: &Metrics) -> RecycleResult<libsql::Error> {
        let mut rows = conn.query("SELECT 1", ()).await?;
        rows.next().await?;
        Ok(())
    }
}

pub type LibsqlPool = Pool<ConnectionManager>;
pub type PooledConnection = Object<ConnectionManager>;

/// Open (creating if needed) a local database file and wrap it in a pool
pub async fn open_pool(path: impl AsRef<Path>) -> anyhow::Result<LibsqlPool> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let database = libsql::Builder::new_local(path).build().await?;
    let pool = Pool::builder(ConnectionManager { database })
        .config(PoolConfig::new(MAX_CONNECTIONS))
        .build()?;

    Ok(pool)
}
