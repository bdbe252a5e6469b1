//! Photo similarity search

use axum::{
    extract::{Multipart, State},
    Json,
};
use lumicat_common::db::models::Bucket;
use serde::Serialize;

use crate::api::read_upload;
use crate::db;
use crate::error::ApiResult;
use crate::similarity::{match_hits, SearchMatch, SimilarityError};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PhotoSearchResponse {
    pub results: Vec<SearchMatch>,
}

/// POST /api/search/by-photo (multipart `image`)
///
/// 503 when no similarity service is configured, 502 when it fails.
pub async fn search_by_photo(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<PhotoSearchResponse>> {
    let client = state
        .similarity
        .as_ref()
        .ok_or(SimilarityError::NotConfigured)?;

    let upload = read_upload(multipart, "image").await?;
    let content_type = upload.resolved_content_type();

    let hits = client
        .search(upload.data, &upload.filename, &content_type)
        .await?;

    let luminaires = db::luminaires::list_all(&state.db).await?;
    let assets = db::assets::list(&state.db, Some(Bucket::Uploads)).await?;

    Ok(Json(PhotoSearchResponse {
        results: match_hits(&hits, &luminaires, &assets),
    }))
}
