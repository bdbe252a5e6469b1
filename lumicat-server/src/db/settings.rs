//! Site settings singleton, stored as JSON under the `site` key

use lumicat_common::db::models::SiteSettings;
use lumicat_common::db::DEFAULT_SITE_SETTINGS;
use lumicat_common::Result;
use sqlx::SqlitePool;
use tracing::warn;

const SITE_KEY: &str = "site";

/// Load the site settings, falling back to defaults when the stored value
/// is missing or unreadable
pub async fn get_site(pool: &SqlitePool) -> Result<SiteSettings> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(SITE_KEY)
            .fetch_optional(pool)
            .await?;

    let raw = value.flatten().unwrap_or_else(|| DEFAULT_SITE_SETTINGS.to_string());
    match serde_json::from_str(&raw) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            warn!("Stored site settings are unreadable ({}), using defaults", e);
            Ok(serde_json::from_str(DEFAULT_SITE_SETTINGS)?)
        }
    }
}

pub async fn save_site(pool: &SqlitePool, settings: &SiteSettings) -> Result<()> {
    let value = serde_json::to_string(settings)?;

    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
    )
    .bind(SITE_KEY)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}
