use anyhow::{Context, Result};
use chrono::Utc;
use libsql::{Connection, params};
use tracing::{debug, info};

use super::models::timestamp_to_i64;

struct Migration {
    version: i32,
    description: &'static str,
    statements: &'static [&'static str],
}

/// Applied in order; a version is never edited once released
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Create api_targets",
        statements: &["CREATE TABLE IF NOT EXISTS api_targets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            url TEXT NOT NULL,
            description TEXT,
            category TEXT NOT NULL DEFAULT 'general',
            is_active INTEGER NOT NULL DEFAULT 1,
            check_interval INTEGER NOT NULL DEFAULT 300
                CHECK (check_interval BETWEEN 30 AND 3600),
            status TEXT NOT NULL DEFAULT 'unknown'
                CHECK (status IN ('up', 'down', 'warning', 'unknown')),
            response_time_ms INTEGER,
            last_error TEXT,
            last_check INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )"],
    },
    Migration {
        version: 2,
        description: "Index api_targets by url and activity",
        statements: &[
            "CREATE INDEX IF NOT EXISTS idx_api_targets_url ON api_targets(url)",
            "CREATE INDEX IF NOT EXISTS idx_api_targets_active ON api_targets(is_active)",
        ],
    },
];

fn latest_version() -> i32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Apply every migration newer than the recorded schema version
pub async fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL,
            description TEXT
        )",
        (),
    )
    .await?;

    let current = schema_version(conn).await?;
    let pending: Vec<_> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        debug!("Schema already at version {}", current);
        return Ok(());
    }

    for migration in pending {
        for statement in migration.statements {
            conn.execute(statement, ())
                .await
                .with_context(|| format!("migration v{} failed", migration.version))?;
        }

        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at, description) VALUES (?, ?, ?)",
            params![migration.version, timestamp_to_i64(Utc::now()), migration.description],
        )
        .await?;
        info!("Applied migration v{}: {}", migration.version, migration.description);
    }

    info!("Database schema now at version {}", latest_version());
    Ok(())
}

async fn schema_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn.query("SELECT MAX(version) FROM schema_migrations", ()).await?;
    let version = match rows.next().await? {
        Some(row) => row.get::<Option<i32>>(0)?,
        None => None,
    };

    Ok(version.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn local_connection() -> (Connection, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = libsql::Builder::new_local(dir.path().join("migrate.db")).build().await.unwrap();
        (db.connect().unwrap(), dir)
    }

    #[test]
    fn test_versions_strictly_increase() {
        assert!(MIGRATIONS.windows(2).all(|w| w[0].version < w[1].version));
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let (conn, _dir) = local_connection().await;

        run_migrations(&conn).await.unwrap();
        run_migrations(&conn).await.unwrap();

        assert_eq!(schema_version(&conn).await.unwrap(), latest_version());

        let mut rows = conn.query("SELECT COUNT(*) FROM schema_migrations", ()).await.unwrap();
        let applied: i64 = rows.next().await.unwrap().unwrap().get(0).unwrap();
        assert_eq!(applied, MIGRATIONS.len() as i64);
    }

    #[tokio::test]
    async fn test_interval_bounds_enforced_by_schema() {
        let (conn, _dir) = local_connection().await;
        run_migrations(&conn).await.unwrap();

        let result = conn
            .execute(
                "INSERT INTO api_targets (name, url, check_interval, created_at, updated_at)
                 VALUES ('x', 'https://x.test', 5, 0, 0)",
                (),
            )
            .await;

        assert!(result.is_err());
    }
}
