//! Bulk import endpoints

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::api::read_upload;
use crate::error::ApiResult;
use crate::import::{self, ImportSummary};
use crate::AppState;

/// POST /api/catalog/import (multipart `file`)
pub async fn import_catalog(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ImportSummary>> {
    let upload = read_upload(multipart, "file").await?;
    info!(file = %upload.filename, bytes = upload.data.len(), "Catalog import started");

    let summary =
        import::import_luminaires(&state.db, &upload.data, state.config.import.year_policy)
            .await?;
    Ok(Json(summary))
}

/// POST /api/designers/import (multipart `file`)
pub async fn import_designers(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ImportSummary>> {
    let upload = read_upload(multipart, "file").await?;
    info!(file = %upload.filename, bytes = upload.data.len(), "Designer import started");

    let summary = import::import_designers(&state.db, &upload.data).await?;
    Ok(Json(summary))
}
