//! Pagination utilities
//!
//! Page numbers are 1-indexed. Pages past the end are not clamped: they
//! produce an empty slice alongside the true totals.

use serde::Serialize;

/// Pagination block returned with every catalog page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Page size actually applied
    pub limit: i64,
    /// Number of matching records
    pub total: i64,
    /// `ceil(total / limit)`
    pub pages: i64,
}

impl Pagination {
    /// Offset for SQL LIMIT/OFFSET query
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Calculate pagination metadata from total results and requested window
///
/// `limit` is assumed already clamped to at least 1; the page is raised to 1
/// when lower.
///
/// # Examples
/// ```
/// use lumicat_server::pagination::calculate_pagination;
///
/// // 250 total results, 100 per page = 3 pages (100 + 100 + 50)
/// let p = calculate_pagination(250, 2, 100);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.pages, 3);
/// assert_eq!(p.offset(), 100);
/// ```
pub fn calculate_pagination(total: i64, requested_page: i64, limit: i64) -> Pagination {
    let limit = limit.max(1);
    let pages = (total + limit - 1) / limit;
    let page = requested_page.max(1);

    Pagination {
        page,
        limit,
        total,
        pages,
    }
}
