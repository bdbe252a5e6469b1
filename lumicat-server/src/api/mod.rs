//! HTTP API handlers

pub mod admin;
pub mod assets;
pub mod buildinfo;
pub mod catalog;
pub mod designers;
pub mod health;
pub mod import;
pub mod search;
pub mod settings;
pub mod timeline;

pub use buildinfo::get_build_info;
pub use health::health_routes;

use axum::extract::Multipart;

use crate::error::{ApiError, ApiResult};

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// File part pulled out of a multipart body
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Upload {
    /// Declared type, else sniffed from the magic bytes
    pub fn resolved_content_type(&self) -> String {
        self.content_type
            .clone()
            .or_else(|| infer::get(&self.data).map(|kind| kind.mime_type().to_string()))
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
    }
}

/// Read the part named `field`, ignoring every other part
///
/// A missing or empty part is a 400.
pub async fn read_upload(mut multipart: Multipart, field: &str) -> ApiResult<Upload> {
    while let Some(part) = multipart.next_field().await? {
        if part.name() != Some(field) {
            continue;
        }

        let filename = part.file_name().unwrap_or("upload").to_string();
        let content_type = part
            .content_type()
            .map(|c| c.to_string())
            .filter(|c| !c.is_empty() && c != FALLBACK_CONTENT_TYPE);
        let data = part.bytes().await?.to_vec();

        if data.is_empty() {
            return Err(ApiError::BadRequest(format!("Part '{}' is empty", field)));
        }

        return Ok(Upload {
            filename,
            content_type,
            data,
        });
    }

    Err(ApiError::BadRequest(format!(
        "Missing '{}' part in multipart form",
        field
    )))
}
