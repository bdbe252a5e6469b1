//! Asset store endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use lumicat_common::db::models::{AssetMeta, Bucket};
use lumicat_common::uuid_utils;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::api::{read_upload, FALLBACK_CONTENT_TYPE};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

#[derive(Debug, Default, Deserialize)]
pub struct BucketQuery {
    pub bucket: Option<String>,
}

impl BucketQuery {
    fn bucket(&self) -> ApiResult<Option<Bucket>> {
        Ok(self.bucket.as_deref().map(str::parse::<Bucket>).transpose()?)
    }
}

/// POST /api/assets?bucket= (multipart `file`)
pub async fn upload_asset(
    State(state): State<AppState>,
    Query(query): Query<BucketQuery>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<AssetMeta>)> {
    let bucket = query.bucket()?.unwrap_or(Bucket::Uploads);
    let upload = read_upload(multipart, "file").await?;
    let content_type = upload.resolved_content_type();

    let meta =
        db::assets::insert(&state.db, bucket, &upload.filename, &content_type, &upload.data)
            .await?;

    info!(id = %meta.id, %bucket, bytes = meta.length, "Asset stored");
    Ok((StatusCode::CREATED, Json(meta)))
}

/// GET /api/assets?bucket=
pub async fn list_assets(
    State(state): State<AppState>,
    Query(query): Query<BucketQuery>,
) -> ApiResult<Json<Vec<AssetMeta>>> {
    Ok(Json(db::assets::list(&state.db, query.bucket()?).await?))
}

/// GET /api/assets/:id
///
/// Streams the stored bytes with long-lived cache headers.
pub async fn get_asset(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let id = uuid_utils::parse_id(&id)?;
    let (meta, data) = db::assets::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Asset {} not found", id)))?;

    let content_type = HeaderValue::from_str(&meta.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_LENGTH, HeaderValue::from(data.len())),
            (header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL)),
        ],
        data,
    )
        .into_response())
}

/// DELETE /api/assets/:id
pub async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = uuid_utils::parse_id(&id)?;
    if !db::assets::delete(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Asset {} not found", id)));
    }
    Ok(Json(json!({ "deleted": true })))
}
