//! Administrative bulk operations

use lumicat_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

/// Rows removed per table by a reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearedCounts {
    pub luminaires: u64,
    pub designers: u64,
    pub timeline: u64,
    pub assets: u64,
}

/// Empty the catalog, designers, timeline and asset store atomically
///
/// Settings survive, minus their logo and video asset ids.
pub async fn reset(pool: &SqlitePool) -> Result<ClearedCounts> {
    let mut tx = pool.begin().await?;

    let luminaires = sqlx::query("DELETE FROM luminaires")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let designers = sqlx::query("DELETE FROM designers")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let timeline = sqlx::query("DELETE FROM timeline")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let assets = sqlx::query("DELETE FROM assets")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query(
        r#"
        UPDATE settings
        SET value = json_set(value, '$.logoAssetId', NULL, '$.videoAssetId', NULL)
        WHERE key = 'site' AND json_valid(value)
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(ClearedCounts {
        luminaires,
        designers,
        timeline,
        assets,
    })
}
