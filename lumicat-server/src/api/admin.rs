//! Administrative endpoints

use axum::{extract::State, Json};
use lumicat_common::time;
use serde::Serialize;
use tracing::{info, warn};

use crate::db::{self, admin::ClearedCounts};
use crate::designers::plan_backfill;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub cleared: ClearedCounts,
}

/// DELETE /api/admin/reset
///
/// Empties luminaires, designers, timeline and assets. Settings are kept.
pub async fn reset(State(state): State<AppState>) -> ApiResult<Json<ResetResponse>> {
    let cleared = db::admin::reset(&state.db).await?;

    warn!(
        luminaires = cleared.luminaires,
        designers = cleared.designers,
        timeline = cleared.timeline,
        assets = cleared.assets,
        "Catalog reset"
    );

    Ok(Json(ResetResponse {
        message: "Catalog reset complete".to_string(),
        timestamp: time::now(),
        cleared,
    }))
}

#[derive(Debug, Serialize)]
pub struct BackfillResponse {
    pub linked: usize,
    pub unmatched: usize,
}

/// POST /api/admin/designers/backfill
///
/// Links every unlinked luminaire to the explicit designer with the same
/// derived key.
pub async fn backfill_designers(
    State(state): State<AppState>,
) -> ApiResult<Json<BackfillResponse>> {
    let explicit = db::designers::list(&state.db).await?;
    let luminaires = db::luminaires::list_all(&state.db).await?;
    let plan = plan_backfill(&explicit, &luminaires);

    for (luminaire_id, designer_id) in &plan.links {
        db::luminaires::set_designer_id(&state.db, *luminaire_id, *designer_id).await?;
    }

    info!(linked = plan.links.len(), unmatched = plan.unmatched, "Designer backfill finished");
    Ok(Json(BackfillResponse {
        linked: plan.links.len(),
        unmatched: plan.unmatched,
    }))
}
