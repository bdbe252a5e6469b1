//! Asset store: uploaded bytes plus metadata, partitioned by bucket

use lumicat_common::db::models::{AssetMeta, AssetRow, Bucket};
use lumicat_common::{time, uuid_utils, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

const SELECT_META: &str =
    "SELECT guid, bucket, filename, content_type, length, uploaded_at FROM assets";

/// Store an upload and return its metadata
pub async fn insert(
    pool: &SqlitePool,
    bucket: Bucket,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Result<AssetMeta> {
    let meta = AssetMeta {
        id: uuid_utils::generate(),
        bucket,
        filename: filename.to_string(),
        content_type: content_type.to_string(),
        length: data.len() as i64,
        uploaded_at: time::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO assets (guid, bucket, filename, content_type, length, data, uploaded_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(meta.id.to_string())
    .bind(bucket.as_str())
    .bind(&meta.filename)
    .bind(&meta.content_type)
    .bind(meta.length)
    .bind(data)
    .bind(meta.uploaded_at)
    .execute(pool)
    .await?;

    Ok(meta)
}

/// Metadata and bytes of one asset
pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<Option<(AssetMeta, Vec<u8>)>> {
    let meta = get_meta(pool, id).await?;
    let Some(meta) = meta else {
        return Ok(None);
    };

    let data: Vec<u8> = sqlx::query_scalar("SELECT data FROM assets WHERE guid = ?")
        .bind(id.to_string())
        .fetch_one(pool)
        .await?;

    Ok(Some((meta, data)))
}

pub async fn get_meta(pool: &SqlitePool, id: Uuid) -> Result<Option<AssetMeta>> {
    let row: Option<AssetRow> = sqlx::query_as(&format!("{} WHERE guid = ?", SELECT_META))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(AssetMeta::try_from).transpose()
}

/// Metadata listing, newest first; `None` lists every bucket
pub async fn list(pool: &SqlitePool, bucket: Option<Bucket>) -> Result<Vec<AssetMeta>> {
    let rows: Vec<AssetRow> = match bucket {
        Some(bucket) => {
            sqlx::query_as(&format!(
                "{} WHERE bucket = ? ORDER BY uploaded_at DESC, rowid DESC",
                SELECT_META
            ))
            .bind(bucket.as_str())
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(&format!("{} ORDER BY uploaded_at DESC, rowid DESC", SELECT_META))
                .fetch_all(pool)
                .await?
        }
    };

    rows.into_iter().map(AssetMeta::try_from).collect()
}

/// Delete an asset and every reference to it
///
/// The id is removed from luminaire image lists and cleared from the site
/// logo and video settings in the same transaction.
pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let guid = id.to_string();
    let mut tx = pool.begin().await?;

    let result = sqlx::query("DELETE FROM assets WHERE guid = ?")
        .bind(&guid)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query(
        r#"
        UPDATE luminaires
        SET images = (
            SELECT json_group_array(value) FROM json_each(luminaires.images) WHERE value != ?
        )
        WHERE EXISTS (SELECT 1 FROM json_each(luminaires.images) WHERE value = ?)
        "#,
    )
    .bind(&guid)
    .bind(&guid)
    .execute(&mut *tx)
    .await?;

    for field in ["$.logoAssetId", "$.videoAssetId"] {
        sqlx::query(
            r#"
            UPDATE settings SET value = json_set(value, ?, NULL)
            WHERE key = 'site' AND json_valid(value) AND json_extract(value, ?) = ?
            "#,
        )
        .bind(field)
        .bind(field)
        .bind(&guid)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(true)
}
