//! SQLite-backed history store.

use async_trait::async_trait;
use concierge_core::{
    context::{History, Role, Turn},
    error::ConciergeError,
    traits::HistoryStore,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// History store backed by SQLite, one row per turn.
#[derive(Clone)]
pub struct SqliteStore {
    pub(super) pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and run migrations.
    pub async fn new(db_path: &str) -> Result<Self, ConciergeError> {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConciergeError::Memory(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| ConciergeError::Memory(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| ConciergeError::Memory(format!("failed to connect to sqlite: {e}")))?;

        let store = Self::from_pool(pool).await?;
        info!("History store initialized at {db_path}");
        Ok(store)
    }

    /// Wrap an existing pool, running migrations first.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, ConciergeError> {
        Self::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Number of senders with at least one stored turn.
    pub async fn sender_count(&self) -> Result<i64, ConciergeError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(DISTINCT sender_id) FROM history")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ConciergeError::Memory(format!("count failed: {e}")))?;
        Ok(count)
    }

    /// Run SQL migrations, tracking which have already been applied.
    pub(super) async fn run_migrations(pool: &SqlitePool) -> Result<(), ConciergeError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| {
            ConciergeError::Memory(format!("failed to create migrations table: {e}"))
        })?;

        let migrations: &[(&str, &str)] = &[(
            "001_history",
            include_str!("../../migrations/001_history.sql"),
        )];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        ConciergeError::Memory(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map_err(|e| ConciergeError::Memory(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await
                .map_err(|e| {
                    ConciergeError::Memory(format!("failed to record migration {name}: {e}"))
                })?;
        }
        Ok(())
    }
}

fn parse_role(role: &str) -> Result<Role, ConciergeError> {
    match role {
        "user" => Ok(Role::User),
        "assistant" => Ok(Role::Assistant),
        other => Err(ConciergeError::Memory(format!("unknown role in history: {other}"))),
    }
}

#[async_trait]
impl HistoryStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, sender_id: &str) -> Result<History, ConciergeError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT role, content FROM history WHERE sender_id = ? ORDER BY seq")
                .bind(sender_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| ConciergeError::Memory(format!("history query failed: {e}")))?;

        rows.into_iter()
            .map(|(role, content)| {
                Ok(Turn {
                    role: parse_role(&role)?,
                    content,
                })
            })
            .collect()
    }

    async fn put(&self, sender_id: &str, history: &History) -> Result<(), ConciergeError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ConciergeError::Memory(format!("begin failed: {e}")))?;

        sqlx::query("DELETE FROM history WHERE sender_id = ?")
            .bind(sender_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ConciergeError::Memory(format!("delete failed: {e}")))?;

        for (seq, turn) in history.iter().enumerate() {
            sqlx::query("INSERT INTO history (sender_id, seq, role, content) VALUES (?, ?, ?, ?)")
                .bind(sender_id)
                .bind(seq as i64)
                .bind(turn.role.as_str())
                .bind(&turn.content)
                .execute(&mut *tx)
                .await
                .map_err(|e| ConciergeError::Memory(format!("insert failed: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| ConciergeError::Memory(format!("commit failed: {e}")))
    }
}
