//! External photo-similarity service client
//!
//! The service receives an image as multipart `image` and answers with
//! ranked hits naming catalog image files. Hits are mapped back to
//! luminaires through the source filename of the record and the filenames
//! of its image assets, compared by lowercase stem.

use std::collections::HashMap;
use std::time::Duration;

use lumicat_common::config::SimilarityConfig;
use lumicat_common::db::models::{AssetMeta, Luminaire};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::import::normalize::filename_stem;

const USER_AGENT: &str = concat!("lumicat/", env!("CARGO_PKG_VERSION"));

/// Keys holding the matched file name, by preference
const FILENAME_KEYS: &[&str] = &["filename", "file", "image", "name", "path"];
/// Keys holding the similarity score, by preference
const SCORE_KEYS: &[&str] = &["score", "similarity", "confidence"];
/// Keys wrapping the hit list when the answer is an object
const LIST_KEYS: &[&str] = &["results", "matches", "data"];

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("Photo search is not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Similarity service returned {0}: {1}")]
    Api(u16, String),

    #[error("Unexpected similarity response: {0}")]
    Parse(String),
}

impl From<SimilarityError> for ApiError {
    fn from(err: SimilarityError) -> Self {
        match err {
            SimilarityError::NotConfigured => ApiError::Unavailable(err.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

/// One ranked hit as reported by the service
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityHit {
    pub filename: String,
    pub score: f64,
}

/// Hit resolved to a catalog record
#[derive(Debug, Clone, Serialize)]
pub struct SearchMatch {
    pub score: f64,
    pub filename: String,
    pub record: Luminaire,
}

/// Client for the configured similarity endpoint
///
/// Cheap to clone; the underlying `reqwest::Client` shares its connection
/// pool between clones.
#[derive(Debug, Clone)]
pub struct SimilarityClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl SimilarityClient {
    /// Build a client, or `None` when no endpoint is configured
    pub fn from_config(config: &SimilarityConfig) -> Result<Option<Self>, SimilarityError> {
        let Some(endpoint) = config.endpoint.as_ref().filter(|e| !e.trim().is_empty()) else {
            return Ok(None);
        };

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SimilarityError::Network(e.to_string()))?;

        Ok(Some(Self {
            http_client,
            endpoint: endpoint.trim().to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        }))
    }

    /// Send an image and return the hits in the order the service gave them
    pub async fn search(
        &self,
        image: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<Vec<SimilarityHit>, SimilarityError> {
        let part = reqwest::multipart::Part::bytes(image)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| SimilarityError::Network(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let mut request = self.http_client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(endpoint = %self.endpoint, "Querying similarity service");

        let response = request
            .send()
            .await
            .map_err(|e| SimilarityError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SimilarityError::Api(status.as_u16(), error_text));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SimilarityError::Parse(e.to_string()))?;

        let hits = parse_hits(&body)?;
        tracing::info!(hits = hits.len(), "Similarity search answered");
        Ok(hits)
    }
}

fn first_str<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| item.get(*k).and_then(Value::as_str))
        .filter(|s| !s.trim().is_empty())
}

fn first_number(item: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| {
        item.get(*k).and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    })
}

/// Read hits from any of the accepted answer shapes
///
/// Entries without a usable file name or score are ignored.
pub fn parse_hits(body: &Value) -> Result<Vec<SimilarityHit>, SimilarityError> {
    let list = match body {
        Value::Array(items) => items,
        Value::Object(map) => LIST_KEYS
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_array))
            .ok_or_else(|| {
                SimilarityError::Parse("expected a list of results".to_string())
            })?,
        _ => return Err(SimilarityError::Parse("expected a JSON array or object".to_string())),
    };

    Ok(list
        .iter()
        .filter_map(|item| {
            let filename = first_str(item, FILENAME_KEYS)?;
            let score = first_number(item, SCORE_KEYS)?;
            Some(SimilarityHit {
                filename: filename.trim().to_string(),
                score,
            })
        })
        .collect())
}

fn stem_key(filename: &str) -> Option<String> {
    filename_stem(filename).map(|s| s.to_lowercase())
}

/// Map hits to luminaires, best score first
///
/// A luminaire is keyed by its source filename and by the filenames of its
/// image assets. Unmatched hits are dropped; a luminaire hit several times
/// keeps its best score.
pub fn match_hits(
    hits: &[SimilarityHit],
    luminaires: &[Luminaire],
    assets: &[AssetMeta],
) -> Vec<SearchMatch> {
    let asset_stems: HashMap<Uuid, String> = assets
        .iter()
        .filter_map(|a| stem_key(&a.filename).map(|s| (a.id, s)))
        .collect();

    let mut by_stem: HashMap<String, usize> = HashMap::new();
    for (idx, lum) in luminaires.iter().enumerate() {
        let own = lum.filename.as_deref().and_then(stem_key);
        let images = lum.images.iter().filter_map(|id| asset_stems.get(id).cloned());
        for stem in own.into_iter().chain(images) {
            by_stem.entry(stem).or_insert(idx);
        }
    }

    let mut best: HashMap<usize, &SimilarityHit> = HashMap::new();
    for hit in hits {
        let Some(&idx) = stem_key(&hit.filename).and_then(|s| by_stem.get(&s)) else {
            continue;
        };
        best.entry(idx)
            .and_modify(|current| {
                if hit.score > current.score {
                    *current = hit;
                }
            })
            .or_insert(hit);
    }

    let mut matches: Vec<SearchMatch> = best
        .into_iter()
        .map(|(idx, hit)| SearchMatch {
            score: hit.score,
            filename: hit.filename.clone(),
            record: luminaires[idx].clone(),
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.filename.cmp(&b.filename))
    });
    matches
}
