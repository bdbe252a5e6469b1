//! Designer directory and profile handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use lumicat_common::db::models::{Designer, NewDesigner};
use serde_json::{json, Value};
use tracing::info;

use crate::db;
use crate::designers::{self, DesignerProfile};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/designers
pub async fn list_designers(State(state): State<AppState>) -> ApiResult<Json<Vec<Designer>>> {
    let explicit = db::designers::list(&state.db).await?;
    let luminaires = db::luminaires::list_all(&state.db).await?;

    Ok(Json(designers::directory(explicit, &luminaires)))
}

/// POST /api/designers
pub async fn create_designer(
    State(state): State<AppState>,
    Json(body): Json<NewDesigner>,
) -> ApiResult<(StatusCode, Json<Designer>)> {
    let designer = db::designers::insert(&state.db, &body.validated()?).await?;

    info!(slug = %designer.slug, "Designer created");
    Ok((StatusCode::CREATED, Json(designer)))
}

/// GET /api/designers/:name_or_slug
pub async fn get_designer(
    State(state): State<AppState>,
    Path(lookup): Path<String>,
) -> ApiResult<Json<DesignerProfile>> {
    let explicit = db::designers::list(&state.db).await?;
    let luminaires = db::luminaires::list_all(&state.db).await?;

    designers::resolve(&lookup, &explicit, luminaires)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Designer '{}' not found", lookup)))
}

/// DELETE /api/designers/:slug
pub async fn delete_designer(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Value>> {
    let slug = slug.trim().to_lowercase();
    if !db::designers::delete_by_slug(&state.db, &slug).await? {
        return Err(ApiError::NotFound(format!("Designer '{}' not found", slug)));
    }

    info!(%slug, "Designer deleted");
    Ok(Json(json!({ "deleted": true })))
}
