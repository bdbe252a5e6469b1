//! Timestamp utilities

use chrono::{DateTime, Datelike, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Calendar year of the current UTC date
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Check that a year lies in `(1000, current_year]`
pub fn is_plausible_year(year: i32) -> bool {
    year > 1000 && year <= current_year()
}
