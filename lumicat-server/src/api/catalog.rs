//! Catalog query and CRUD handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use lumicat_common::db::models::{Luminaire, LuminairePatch, NewLuminaire};
use lumicat_common::{time, uuid_utils};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::pagination::Pagination;
use crate::query::{CatalogParams, CatalogQuery};
use crate::AppState;

/// One catalog page
#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub records: Vec<Luminaire>,
    pub pagination: Pagination,
}

/// GET /api/catalog
pub async fn list_catalog(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> ApiResult<Json<CatalogPage>> {
    let query = CatalogQuery::from_params(&params, &state.config.catalog)?;
    let (records, pagination) = db::luminaires::query_page(&state.db, &query).await?;

    Ok(Json(CatalogPage {
        records,
        pagination,
    }))
}

/// POST /api/catalog
pub async fn create_luminaire(
    State(state): State<AppState>,
    Json(body): Json<NewLuminaire>,
) -> ApiResult<(StatusCode, Json<Luminaire>)> {
    let record = body.validated()?.into_record(time::now());
    db::luminaires::insert(&state.db, &record).await?;

    info!(id = %record.id, name = %record.name, "Luminaire created");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn load(state: &AppState, id: &str) -> ApiResult<Luminaire> {
    let id = uuid_utils::parse_id(id)?;
    db::luminaires::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Luminaire {} not found", id)))
}

async fn store(state: &AppState, record: &Luminaire) -> ApiResult<()> {
    if db::luminaires::update(&state.db, record).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("Luminaire {} not found", record.id)))
    }
}

/// GET /api/catalog/:id
pub async fn get_luminaire(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Luminaire>> {
    Ok(Json(load(&state, &id).await?))
}

/// PUT /api/catalog/:id
pub async fn update_luminaire(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<LuminairePatch>,
) -> ApiResult<Json<Value>> {
    let mut record = load(&state, &id).await?;
    record.apply(patch, time::now())?;
    store(&state, &record).await?;

    Ok(Json(json!({ "updated": true, "record": record })))
}

/// DELETE /api/catalog/:id
pub async fn delete_luminaire(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = uuid_utils::parse_id(&id)?;
    if !db::luminaires::delete(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Luminaire {} not found", id)));
    }

    info!(%id, "Luminaire deleted");
    Ok(Json(json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddImagesRequest {
    pub asset_ids: Vec<Uuid>,
}

/// POST /api/catalog/:id/images
///
/// Appends asset ids not already attached; unknown assets are rejected.
pub async fn add_images(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AddImagesRequest>,
) -> ApiResult<Json<Luminaire>> {
    let mut record = load(&state, &id).await?;

    for asset_id in &body.asset_ids {
        if db::assets::get_meta(&state.db, *asset_id).await?.is_none() {
            return Err(ApiError::BadRequest(format!("Unknown asset {}", asset_id)));
        }
    }

    if record.add_images(&body.asset_ids) > 0 {
        record.updated_at = time::now();
        store(&state, &record).await?;
    }

    Ok(Json(record))
}

/// POST /api/catalog/:id/favorite
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Luminaire>> {
    let mut record = load(&state, &id).await?;
    record.favorite = !record.favorite;
    record.updated_at = time::now();
    store(&state, &record).await?;

    Ok(Json(record))
}
