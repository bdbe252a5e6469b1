//! Database schema migrations
//!
//! Versioned, idempotent migrations for catalog files created by earlier
//! releases. Fresh databases already have the final columns from
//! `init.rs`; each migration checks before it alters.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - users upgrade from older files
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Use ALTER TABLE** - prefer it over DROP/CREATE to preserve data

use crate::db::models::search_text;
use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> = sqlx::query_scalar(
        "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1"
    )
    .fetch_optional(pool)
    .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    if current_version < 3 {
        migrate_v3(pool).await?;
        set_schema_version(pool, 3).await?;
        info!("✓ Migration v3 completed");
    }

    Ok(())
}

async fn has_column(pool: &SqlitePool, table: &str, column: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?"
    )
    .bind(table)
    .bind(column)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

async fn add_column(pool: &SqlitePool, table: &str, column: &str, decl: &str) -> Result<()> {
    if has_column(pool, table, column).await? {
        info!("  {}.{} already exists - skipping", table, column);
        return Ok(());
    }

    let sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, decl);
    match sqlx::query(&sql).execute(pool).await {
        Ok(_) => {
            info!("  ✓ Added {} column to {} table", column, table);
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
            info!("  {}.{} added concurrently - skipping", table, column);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Migration v1: explicit designer relation on luminaires
///
/// Catalogs created before the relation existed matched designers only by
/// name. The column starts NULL; `POST /api/admin/designers/backfill` links
/// existing rows.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Add designer_id column to luminaires");
    add_column(pool, "luminaires", "designer_id", "TEXT").await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_luminaires_designer_id ON luminaires(designer_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Migration v2: keep the source filename of imported luminaires
///
/// Needed to map photo-similarity hits back to records.
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Add filename column to luminaires");
    add_column(pool, "luminaires", "filename", "TEXT").await
}

/// Migration v3: lowercased search column
///
/// Existing rows are filled from their name, designer and description.
async fn migrate_v3(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v3: Add search_text column to luminaires");
    add_column(pool, "luminaires", "search_text", "TEXT NOT NULL DEFAULT ''").await?;

    let rows: Vec<(String, String, String, String)> =
        sqlx::query_as("SELECT guid, name, designer, description FROM luminaires")
            .fetch_all(pool)
            .await?;

    let mut tx = pool.begin().await?;
    for (guid, name, designer, description) in &rows {
        sqlx::query("UPDATE luminaires SET search_text = ? WHERE guid = ?")
            .bind(search_text(name, designer, description))
            .bind(guid)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    info!("  ✓ Indexed {} existing luminaires for search", rows.len());
    Ok(())
}
