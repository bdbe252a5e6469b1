//! lumicat-server library: luminaire catalog HTTP service
//!
//! Exposes the router so integration tests can drive it with
//! `tower::ServiceExt::oneshot` against a temporary database.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use lumicat_common::config::TomlConfig;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod designers;
pub mod error;
pub mod import;
pub mod pagination;
pub mod query;
pub mod similarity;

pub use error::{ApiError, ApiResult};
use similarity::{SimilarityClient, SimilarityError};

/// Application state shared across HTTP handlers
///
/// Cloned into every request. `SqlitePool` and `reqwest::Client` (inside
/// [`SimilarityClient`]) are reference-counted and safe for concurrent use,
/// so both are created once at startup and shared without extra locking.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Resolved configuration, read-only after startup
    pub config: Arc<TomlConfig>,
    /// `None` when no similarity endpoint is configured
    pub similarity: Option<SimilarityClient>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, config: TomlConfig) -> Result<Self, SimilarityError> {
        let similarity = SimilarityClient::from_config(&config.similarity)?;
        Ok(Self {
            db,
            config: Arc::new(config),
            similarity,
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post, put};

    let catalog = Router::new()
        .route("/api/catalog", get(api::catalog::list_catalog).post(api::catalog::create_luminaire))
        .route("/api/catalog/import", post(api::import::import_catalog))
        .route(
            "/api/catalog/:id",
            get(api::catalog::get_luminaire)
                .put(api::catalog::update_luminaire)
                .delete(api::catalog::delete_luminaire),
        )
        .route("/api/catalog/:id/images", post(api::catalog::add_images))
        .route("/api/catalog/:id/favorite", post(api::catalog::toggle_favorite));

    let designers = Router::new()
        .route(
            "/api/designers",
            get(api::designers::list_designers).post(api::designers::create_designer),
        )
        .route("/api/designers/import", post(api::import::import_designers))
        .route(
            "/api/designers/:name_or_slug",
            get(api::designers::get_designer).delete(api::designers::delete_designer),
        );

    let assets = Router::new()
        .route("/api/assets", get(api::assets::list_assets).post(api::assets::upload_asset))
        .route(
            "/api/assets/:id",
            get(api::assets::get_asset).delete(api::assets::delete_asset),
        );

    let site = Router::new()
        .route("/api/timeline", get(api::timeline::list_timeline))
        .route(
            "/api/timeline/:period",
            put(api::timeline::put_timeline).delete(api::timeline::delete_timeline),
        )
        .route(
            "/api/settings",
            get(api::settings::get_settings).put(api::settings::update_settings),
        )
        .route("/api/search/by-photo", post(api::search::search_by_photo))
        .route("/api/buildinfo", get(api::get_build_info));

    let admin = Router::new()
        .route("/api/admin/reset", delete(api::admin::reset))
        .route("/api/admin/designers/backfill", post(api::admin::backfill_designers));

    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .merge(catalog)
        .merge(designers)
        .merge(assets)
        .merge(site)
        .merge(admin)
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
