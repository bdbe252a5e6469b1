//! Timeline period descriptions

use lumicat_common::db::models::TimelineEntry;
use lumicat_common::{time, Result};
use sqlx::SqlitePool;

pub async fn list(pool: &SqlitePool) -> Result<Vec<TimelineEntry>> {
    let entries = sqlx::query_as::<_, TimelineEntry>(
        "SELECT period, description, updated_at FROM timeline ORDER BY period",
    )
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Insert or replace the description of a period
pub async fn upsert(pool: &SqlitePool, period: &str, description: &str) -> Result<TimelineEntry> {
    let entry = TimelineEntry {
        period: period.to_string(),
        description: description.to_string(),
        updated_at: time::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO timeline (period, description, updated_at) VALUES (?, ?, ?)
        ON CONFLICT(period) DO UPDATE SET
            description = excluded.description,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&entry.period)
    .bind(&entry.description)
    .bind(entry.updated_at)
    .execute(pool)
    .await?;

    Ok(entry)
}

pub async fn delete(pool: &SqlitePool, period: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM timeline WHERE period = ?")
        .bind(period)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
