//! Luminaire queries
//!
//! The catalog page query is assembled with `sqlx::QueryBuilder`; only
//! whitelisted column names are ever spliced into SQL, every value is bound.

use lumicat_common::db::models::{Luminaire, LuminaireRow};
use lumicat_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::pagination::{calculate_pagination, Pagination};
use crate::query::{CatalogFilter, CatalogQuery, FieldFilter};

const SELECT_COLUMNS: &str = "SELECT guid, name, designer, designer_id, year, period, specialty, \
     description, materials, colors, height, width, depth, images, filename, favorite, \
     created_at, updated_at FROM luminaires";

fn into_records(rows: Vec<LuminaireRow>) -> Result<Vec<Luminaire>> {
    rows.into_iter().map(Luminaire::try_from).collect()
}

/// Insert a new record
pub async fn insert(pool: &SqlitePool, lum: &Luminaire) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO luminaires (
            guid, name, designer, designer_id, year, period, specialty, description,
            materials, colors, height, width, depth, images, filename, favorite,
            search_text, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(lum.id.to_string())
    .bind(&lum.name)
    .bind(&lum.designer)
    .bind(lum.designer_id.map(|id| id.to_string()))
    .bind(lum.year)
    .bind(&lum.period)
    .bind(&lum.specialty)
    .bind(&lum.description)
    .bind(serde_json::to_string(&lum.materials)?)
    .bind(serde_json::to_string(&lum.colors)?)
    .bind(lum.dimensions.height)
    .bind(lum.dimensions.width)
    .bind(lum.dimensions.depth)
    .bind(serde_json::to_string(&lum.images)?)
    .bind(&lum.filename)
    .bind(lum.favorite)
    .bind(lum.search_text())
    .bind(lum.created_at)
    .bind(lum.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<Option<Luminaire>> {
    let row: Option<LuminaireRow> = sqlx::query_as(&format!("{} WHERE guid = ?", SELECT_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(Luminaire::try_from).transpose()
}

/// Overwrite every mutable column of an existing record
///
/// Returns false when the id no longer exists.
pub async fn update(pool: &SqlitePool, lum: &Luminaire) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE luminaires SET
            name = ?, designer = ?, designer_id = ?, year = ?, period = ?, specialty = ?,
            description = ?, materials = ?, colors = ?, height = ?, width = ?, depth = ?,
            images = ?, filename = ?, favorite = ?, search_text = ?, updated_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(&lum.name)
    .bind(&lum.designer)
    .bind(lum.designer_id.map(|id| id.to_string()))
    .bind(lum.year)
    .bind(&lum.period)
    .bind(&lum.specialty)
    .bind(&lum.description)
    .bind(serde_json::to_string(&lum.materials)?)
    .bind(serde_json::to_string(&lum.colors)?)
    .bind(lum.dimensions.height)
    .bind(lum.dimensions.width)
    .bind(lum.dimensions.depth)
    .bind(serde_json::to_string(&lum.images)?)
    .bind(&lum.filename)
    .bind(lum.favorite)
    .bind(lum.search_text())
    .bind(lum.updated_at)
    .bind(lum.id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM luminaires WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Every record in storage order
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Luminaire>> {
    let rows: Vec<LuminaireRow> = sqlx::query_as(&format!("{} ORDER BY rowid", SELECT_COLUMNS))
        .fetch_all(pool)
        .await?;

    into_records(rows)
}

/// Link a record to an explicit designer without touching `updated_at`
pub async fn set_designer_id(pool: &SqlitePool, id: Uuid, designer_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE luminaires SET designer_id = ? WHERE guid = ?")
        .bind(designer_id.to_string())
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Escape LIKE wildcards in a user term
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

struct Clauses {
    started: bool,
}

impl Clauses {
    fn next(&mut self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(if self.started { " AND " } else { " WHERE " });
        self.started = true;
    }
}

fn push_any_of(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, values: &[String]) {
    qb.push(format!(
        "EXISTS (SELECT 1 FROM json_each(luminaires.{}) WHERE json_each.value IN (",
        column
    ));
    let mut separated = qb.separated(", ");
    for value in values {
        separated.push_bind(value.clone());
    }
    separated.push_unseparated("))");
}

fn push_fields(qb: &mut QueryBuilder<'_, Sqlite>, f: &FieldFilter) {
    let mut clauses = Clauses { started: false };

    if let Some(designer) = &f.designer {
        clauses.next(qb);
        qb.push("designer = ").push_bind(designer.clone());
    }
    if let Some(period) = &f.period {
        clauses.next(qb);
        qb.push("period = ").push_bind(period.clone());
    }
    if !f.materials.is_empty() {
        clauses.next(qb);
        push_any_of(qb, "materials", &f.materials);
    }
    if !f.colors.is_empty() {
        clauses.next(qb);
        push_any_of(qb, "colors", &f.colors);
    }
    if let Some(min) = f.year_min {
        clauses.next(qb);
        qb.push("year >= ").push_bind(min);
    }
    if let Some(max) = f.year_max {
        clauses.next(qb);
        qb.push("year <= ").push_bind(max);
    }
    if f.favorite_only {
        clauses.next(qb);
        qb.push("favorite = 1");
    }
}

/// Append the WHERE clause for a catalog filter
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &CatalogFilter) {
    match filter {
        CatalogFilter::Search(terms) => {
            let mut clauses = Clauses { started: false };
            // search_text is stored lowercased; terms are folded the same way
            for term in terms {
                clauses.next(qb);
                qb.push("search_text LIKE ")
                    .push_bind(like_pattern(&term.to_lowercase()))
                    .push(" ESCAPE '\\'");
            }
        }
        CatalogFilter::Fields(f) if f.is_empty() => {}
        CatalogFilter::Fields(f) => push_fields(qb, f),
    }
}

/// Execute a catalog query: one page of records plus the pagination block
pub async fn query_page(
    pool: &SqlitePool,
    query: &CatalogQuery,
) -> Result<(Vec<Luminaire>, Pagination)> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM luminaires");
    push_filter(&mut count, &query.filter);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let p = calculate_pagination(total, query.page, query.limit);

    let mut select = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
    push_filter(&mut select, &query.filter);
    // rowid keeps ties in insertion order
    select.push(format!(
        " ORDER BY {} {}, rowid ASC LIMIT ",
        query.sort.field.column(),
        query.sort.direction.sql()
    ));
    select.push_bind(p.limit);
    select.push(" OFFSET ");
    select.push_bind(p.offset());

    let rows = select.build_query_as::<LuminaireRow>().fetch_all(pool).await?;

    Ok((into_records(rows)?, p))
}
