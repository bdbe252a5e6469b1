//! Import outcome accounting

use serde::Serialize;

/// Error messages returned to the client; the total is always reported
pub const MAX_REPORTED_ERRORS: usize = 10;

/// What happened to one input row before insertion
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome<T> {
    Accepted(T),
    Skipped(String),
}

/// Per-row normalization result
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRowResult<T> {
    /// 1-based data row index
    pub row: usize,
    pub outcome: RowOutcome<T>,
}

impl<T> ImportRowResult<T> {
    /// Line label used in error messages; line 1 is the header
    pub fn label(&self) -> String {
        format!("row {}", self.row + 1)
    }
}

/// Response body of the import endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported_count: usize,
    pub processed_count: usize,
    pub errors: Vec<String>,
    pub total_errors: usize,
}

/// Running totals of an import
#[derive(Debug, Default)]
pub struct ImportReport {
    imported: usize,
    processed: usize,
    errors: Vec<String>,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_imported(&mut self) {
        self.processed += 1;
        self.imported += 1;
    }

    pub fn record_error(&mut self, message: String) {
        self.processed += 1;
        self.errors.push(message);
    }

    pub fn summary(self) -> ImportSummary {
        let total_errors = self.errors.len();
        let mut errors = self.errors;
        errors.truncate(MAX_REPORTED_ERRORS);

        ImportSummary {
            imported_count: self.imported,
            processed_count: self.processed,
            errors,
            total_errors,
        }
    }
}
