mod models;

pub use models::*;

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        // Strip SQL comment lines (lines starting with --)
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

pub async fn init(data_dir: &Path) -> Result<DbPool> {
    let db_path = data_dir.join("wolfstreet.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    info!("Initializing database at {}", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // Run migrations
    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    // Migration 001: Users and sessions
    execute_sql(pool, include_str!("../../migrations/001_initial.sql")).await?;

    // Migration 002: Watchlist items
    let has_watchlist_table: Option<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type='table' AND name='watchlist_items'",
    )
    .fetch_optional(pool)
    .await?;
    if has_watchlist_table.is_none() {
        execute_sql(pool, include_str!("../../migrations/002_watchlist.sql")).await?;
    }

    // Migration 003: Chat message history
    let has_chat_table: Option<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type='table' AND name='chat_messages'",
    )
    .fetch_optional(pool)
    .await?;
    if has_chat_table.is_none() {
        execute_sql(pool, include_str!("../../migrations/003_chat.sql")).await?;
    }

    info!("Migrations completed");
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    run_migrations(&pool).await.expect("migrations");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = test_pool().await;
        // Re-running the full set must not fail
        run_migrations(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert!(names.contains(&"users"));
        assert!(names.contains(&"sessions"));
        assert!(names.contains(&"watchlist_items"));
        assert!(names.contains(&"chat_messages"));
    }

    #[tokio::test]
    async fn test_email_uniqueness_enforced_by_storage() {
        let pool = test_pool().await;
        let now = chrono::Utc::now().to_rfc3339();

        let insert = |id: &str| {
            sqlx::query(
                "INSERT INTO users (id, name, email, password_hash, plan, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(id.to_string())
            .bind("Ada")
            .bind("ada@example.com")
            .bind("digest")
            .bind("free")
            .bind(now.clone())
            .bind(now.clone())
        };

        insert("u1").execute(&pool).await.unwrap();
        // Second insert with the same email must be rejected by the unique
        // index even though no application-level check ran.
        let err = insert("u2").execute(&pool).await.unwrap_err();
        assert!(err.to_string().contains("UNIQUE constraint failed"));
    }

    #[tokio::test]
    async fn test_token_hash_uniqueness_enforced_by_storage() {
        let pool = test_pool().await;
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, plan, created_at, updated_at)
             VALUES ('u1', 'Ada', 'ada@example.com', 'digest', 'free', ?, ?)",
        )
        .bind(&now)
        .bind(&now)
        .execute(&pool)
        .await
        .unwrap();

        let insert = |id: &str| {
            sqlx::query(
                "INSERT INTO sessions (id, user_id, token_hash, created_at, expires_at)
                 VALUES (?, 'u1', 'samehash', ?, ?)",
            )
            .bind(id.to_string())
            .bind(now.clone())
            .bind(now.clone())
        };

        insert("s1").execute(&pool).await.unwrap();
        let err = insert("s2").execute(&pool).await.unwrap_err();
        assert!(err.to_string().contains("UNIQUE constraint failed"));
    }
}
