//! # Lumicat Common Library
//!
//! Shared code for the Lumicat catalog service:
//! - Database initialization, schema and migrations
//! - Catalog record models (luminaires, designers, assets, timeline, settings)
//! - Designer name resolution (derived keys and slugs)
//! - Configuration loading and root folder resolution
//! - Utility functions

pub mod config;
pub mod db;
pub mod designer;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
