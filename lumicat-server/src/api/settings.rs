//! Site settings

use axum::{extract::State, Json};
use lumicat_common::db::models::{SiteSettings, SiteSettingsPatch};
use lumicat_common::time;

use crate::db;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<SiteSettings>> {
    Ok(Json(db::settings::get_site(&state.db).await?))
}

/// PUT /api/settings
pub async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SiteSettingsPatch>,
) -> ApiResult<Json<SiteSettings>> {
    let mut settings = db::settings::get_site(&state.db).await?;
    settings.apply(patch, time::now());
    db::settings::save_site(&state.db, &settings).await?;

    Ok(Json(settings))
}
