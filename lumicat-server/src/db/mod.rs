//! Database access layer for the catalog service
//!
//! Schema creation lives in `lumicat_common::db`; these modules hold the
//! queries. Ids are stored as hyphenated UUID text.

pub mod admin;
pub mod assets;
pub mod designers;
pub mod luminaires;
pub mod settings;
pub mod timeline;
