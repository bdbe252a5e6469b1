//! Explicit designer profiles

use lumicat_common::db::models::{Designer, DesignerRow, NewDesigner};
use lumicat_common::{time, uuid_utils, Error, Result};
use sqlx::SqlitePool;

const SELECT_COLUMNS: &str = "SELECT guid, name, slug, biography, birth_date, death_date, \
     nationality, image FROM designers";

/// Insert a validated designer
///
/// A reused slug fails with `Error::Conflict`.
pub async fn insert(pool: &SqlitePool, new: &NewDesigner) -> Result<Designer> {
    let id = uuid_utils::generate();
    let slug = new.slug();
    let now = time::now();

    sqlx::query(
        r#"
        INSERT INTO designers (
            guid, name, slug, biography, birth_date, death_date, nationality, image,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&new.name)
    .bind(&slug)
    .bind(&new.biography)
    .bind(&new.birth_date)
    .bind(&new.death_date)
    .bind(&new.nationality)
    .bind(&new.image)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| Error::from_write(e, &format!("Designer with slug '{}'", slug)))?;

    Ok(Designer {
        id: Some(id),
        name: new.name.clone(),
        slug,
        biography: new.biography.clone(),
        birth_date: new.birth_date.clone(),
        death_date: new.death_date.clone(),
        nationality: new.nationality.clone(),
        image: new.image.clone(),
        luminaire_count: 0,
        derived: false,
    })
}

/// All explicit designers, by name
pub async fn list(pool: &SqlitePool) -> Result<Vec<Designer>> {
    let rows: Vec<DesignerRow> =
        sqlx::query_as(&format!("{} ORDER BY name COLLATE NOCASE, rowid", SELECT_COLUMNS))
            .fetch_all(pool)
            .await?;

    rows.into_iter().map(Designer::try_from).collect()
}

/// Remove a profile and unlink its luminaires
///
/// Returns false when no designer has this slug.
pub async fn delete_by_slug(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let guid: Option<String> = sqlx::query_scalar("SELECT guid FROM designers WHERE slug = ?")
        .bind(slug)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(guid) = guid else {
        return Ok(false);
    };

    sqlx::query("UPDATE luminaires SET designer_id = NULL WHERE designer_id = ?")
        .bind(&guid)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM designers WHERE guid = ?")
        .bind(&guid)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}
