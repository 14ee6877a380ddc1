//! Versioned catalog schema.
//!
//! Applied versions are recorded in `_migrations`. Each pending version runs
//! in its own transaction together with its bookkeeping row, so a failed
//! migration leaves the schema at the previous version.

use crate::Error;
use tokio_rusqlite::{Connection, params};

/// (version, SQL) in ascending version order.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_catalog.sql")),
    (2, include_str!("../../migrations/002_spec_tables.sql")),
];

/// Bring the schema up to the latest version.
///
/// # Errors
///
/// `Error::MigrationFailed` naming the version whose SQL did not apply.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current: i64 = conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            tx.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            tracing::info!(version, "applied catalog schema migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specs::SpecKind;

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();
        run(&conn).await.unwrap();

        let has_items: bool = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='gear_catalog')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();

        assert!(has_items);
    }

    #[tokio::test]
    async fn test_every_spec_table_exists() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        for kind in SpecKind::ALL {
            let table = kind.table();
            let exists: bool = conn
                .call(move |conn| {
                    conn.query_row(
                        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                        params![table],
                        |row| row.get(0),
                    )
                })
                .await
                .unwrap();
            assert!(exists, "missing table {table}");
        }
    }

    #[tokio::test]
    async fn test_migrations_version_tracking() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        let count: i64 = conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM _migrations", [], |row| row.get(0)))
            .await
            .unwrap();

        assert_eq!(count, MIGRATIONS.len() as i64);
        assert_eq!(MIGRATIONS.last().map(|(v, _)| *v), Some(count));
    }
}
