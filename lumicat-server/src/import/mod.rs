//! Bulk import pipeline
//!
//! Upload bytes are parsed into a [`parse::Table`], every row is normalized
//! into an [`ImportRowResult`], then accepted rows are inserted one at a time.
//! A failed row never aborts the batch and nothing is rolled back.

pub mod normalize;
pub mod parse;
pub mod report;

use std::future::Future;

use lumicat_common::config::YearPolicy;
use lumicat_common::db::models::{NewDesigner, NewLuminaire};
use lumicat_common::{time, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db;
pub use parse::{parse_table, Table};
pub use report::{ImportReport, ImportRowResult, ImportSummary, RowOutcome};

/// Normalize every row of a luminaire upload
pub fn luminaire_rows(table: &Table, policy: YearPolicy) -> Vec<ImportRowResult<NewLuminaire>> {
    table
        .rows()
        .map(|row| ImportRowResult {
            row: row.index,
            outcome: match normalize::luminaire_from_row(&row, policy) {
                Ok(new) => RowOutcome::Accepted(new),
                Err(reason) => RowOutcome::Skipped(reason),
            },
        })
        .collect()
}

/// Normalize every row of a designer upload
pub fn designer_rows(table: &Table) -> Vec<ImportRowResult<NewDesigner>> {
    table
        .rows()
        .map(|row| ImportRowResult {
            row: row.index,
            outcome: match normalize::designer_from_row(&row) {
                Ok(new) => RowOutcome::Accepted(new),
                Err(reason) => RowOutcome::Skipped(reason),
            },
        })
        .collect()
}

/// Insert accepted rows sequentially, collecting every failure
async fn insert_sequentially<T, F, Fut>(
    results: Vec<ImportRowResult<T>>,
    mut insert: F,
) -> ImportSummary
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut report = ImportReport::new();

    for result in results {
        let label = result.label();
        match result.outcome {
            RowOutcome::Skipped(reason) => {
                warn!(row = result.row, %reason, "Import row skipped");
                report.record_error(format!("{}: {}", label, reason));
            }
            RowOutcome::Accepted(record) => match insert(record).await {
                Ok(()) => report.record_imported(),
                Err(e) => {
                    warn!(row = result.row, error = %e, "Import row insert failed");
                    report.record_error(format!("{}: {}", label, e));
                }
            },
        }
    }

    report.summary()
}

/// Import luminaires from an uploaded delimited-text file
pub async fn import_luminaires(
    pool: &SqlitePool,
    bytes: &[u8],
    policy: YearPolicy,
) -> Result<ImportSummary> {
    let table = parse_table(bytes)?;
    let rows = luminaire_rows(&table, policy);

    let summary = insert_sequentially(rows, |new| async move {
        db::luminaires::insert(pool, &new.into_record(time::now())).await
    })
    .await;

    info!(
        imported = summary.imported_count,
        processed = summary.processed_count,
        errors = summary.total_errors,
        "Luminaire import finished"
    );
    Ok(summary)
}

/// Import designer profiles from an uploaded delimited-text file
///
/// A row whose slug already exists fails its insert and is reported.
pub async fn import_designers(pool: &SqlitePool, bytes: &[u8]) -> Result<ImportSummary> {
    let table = parse_table(bytes)?;
    let rows = designer_rows(&table);

    let summary = insert_sequentially(rows, |new| async move {
        db::designers::insert(pool, &new).await.map(|_| ())
    })
    .await;

    info!(
        imported = summary.imported_count,
        processed = summary.processed_count,
        errors = summary.total_errors,
        "Designer import finished"
    );
    Ok(summary)
}
