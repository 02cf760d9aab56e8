//! Schema versioning for the libSQL store.
//!
//! `SCHEMA` lists every step ever shipped. The `schema_versions` table
//! remembers which ones a database file has seen; opening a store brings
//! it up to the last step.

use libsql::Connection;
use tracing::info;

use crate::error::DatabaseError;

struct SchemaStep {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Append only. Never edit a step that has shipped.
static SCHEMA: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "profiles",
        sql: r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL UNIQUE,
                business_name TEXT NOT NULL,
                owner_name TEXT NOT NULL,
                industry TEXT NOT NULL DEFAULT '',
                phone TEXT,
                address TEXT,
                business_goals TEXT NOT NULL DEFAULT '[]',
                target_radius INTEGER,
                target_age_min INTEGER,
                target_age_max INTEGER,
                target_audience TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        "#,
    },
    SchemaStep {
        version: 2,
        name: "campaigns_and_metrics",
        sql: r#"
            CREATE TABLE IF NOT EXISTS campaigns (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'draft',
                budget_amount TEXT,
                phone_number TEXT,
                website_url TEXT,
                start_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_campaigns_user ON campaigns(user_id);

            CREATE TABLE IF NOT EXISTS performance_metrics (
                id TEXT PRIMARY KEY,
                campaign_id TEXT NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                impressions INTEGER NOT NULL DEFAULT 0,
                clicks INTEGER NOT NULL DEFAULT 0,
                calls INTEGER NOT NULL DEFAULT 0,
                conversions INTEGER NOT NULL DEFAULT 0,
                cost TEXT NOT NULL DEFAULT '0',
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_metrics_campaign ON performance_metrics(campaign_id);
        "#,
    },
];

const VERSION_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_versions (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
)";

/// Bring the schema up to date.
pub async fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute(VERSION_TABLE, ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("schema_versions: {e}")))?;

    let applied = applied_version(conn).await?;
    let pending: Vec<&SchemaStep> = SCHEMA.iter().filter(|s| s.version > applied).collect();
    if pending.is_empty() {
        return Ok(());
    }

    for step in pending {
        info!(version = step.version, name = step.name, "Applying schema step");
        conn.execute_batch(step.sql).await.map_err(|e| {
            DatabaseError::Migration(format!("step {} ({}): {e}", step.version, step.name))
        })?;
        record_version(conn, step).await?;
    }

    let version = applied_version(conn).await?;
    info!(version, "Schema up to date");
    Ok(())
}

/// Highest recorded step, 0 for a fresh database.
async fn applied_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query("SELECT MAX(version) FROM schema_versions", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("applied_version: {e}")))?;

    let Some(row) = rows
        .next()
        .await
        .map_err(|e| DatabaseError::Migration(format!("applied_version: {e}")))?
    else {
        return Ok(0);
    };
    row.get::<Option<i64>>(0)
        .map(|v| v.unwrap_or(0))
        .map_err(|e| DatabaseError::Migration(format!("applied_version: {e}")))
}

async fn record_version(conn: &Connection, step: &SchemaStep) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_versions (version, name) VALUES (?1, ?2)",
        libsql::params![step.version, step.name],
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("record step {}: {e}", step.version)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_conn() -> Connection {
        libsql::Builder::new_local(":memory:")
            .build()
            .await
            .unwrap()
            .connect()
            .unwrap()
    }

    async fn tables(conn: &Connection) -> Vec<String> {
        let mut rows = conn
            .query(
                "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                (),
            )
            .await
            .unwrap();
        let mut names = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            names.push(row.get::<String>(0).unwrap());
        }
        names
    }

    #[tokio::test]
    async fn fresh_database_gets_every_table() {
        let conn = memory_conn().await;
        run_migrations(&conn).await.unwrap();

        let names = tables(&conn).await;
        for table in ["campaigns", "performance_metrics", "profiles", "schema_versions"] {
            assert!(names.iter().any(|n| n == table), "missing {table}: {names:?}");
        }
    }

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn migration_future_is_send() {
        let conn = memory_conn().await;
        let fut = run_migrations(&conn);
        assert_send(&fut);
        fut.await.unwrap();
    }

    #[tokio::test]
    async fn rerun_is_a_no_op() {
        let conn = memory_conn().await;
        run_migrations(&conn).await.unwrap();
        run_migrations(&conn).await.unwrap();

        assert_eq!(applied_version(&conn).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn database_at_step_one_catches_up() {
        let conn = memory_conn().await;
        conn.execute(VERSION_TABLE, ()).await.unwrap();
        conn.execute_batch(SCHEMA[0].sql).await.unwrap();
        record_version(&conn, &SCHEMA[0]).await.unwrap();
        assert!(!tables(&conn).await.iter().any(|n| n == "campaigns"));

        run_migrations(&conn).await.unwrap();
        assert!(tables(&conn).await.iter().any(|n| n == "campaigns"));
        assert_eq!(applied_version(&conn).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn steps_are_recorded_by_name() {
        let conn = memory_conn().await;
        run_migrations(&conn).await.unwrap();

        let mut rows = conn
            .query("SELECT name FROM schema_versions ORDER BY version", ())
            .await
            .unwrap();
        let mut names = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            names.push(row.get::<String>(0).unwrap());
        }
        assert_eq!(names, ["profiles", "campaigns_and_metrics"]);
    }
}
