//! Database models
//!
//! `*Row` structs mirror table columns (JSON text for list fields); the
//! public records are what handlers serialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{time, Error, Result};

/// Optional physical dimensions, each independently optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub depth: Option<f64>,
}

/// One lighting-fixture catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Luminaire {
    pub id: Uuid,
    pub name: String,
    pub designer: String,
    pub designer_id: Option<Uuid>,
    pub year: Option<i32>,
    pub period: String,
    pub specialty: String,
    pub description: String,
    pub materials: Vec<String>,
    pub colors: Vec<String>,
    pub dimensions: Dimensions,
    pub images: Vec<Uuid>,
    pub filename: Option<String>,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a luminaire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewLuminaire {
    pub name: String,
    pub designer: String,
    pub designer_id: Option<Uuid>,
    pub year: Option<i32>,
    pub period: String,
    pub specialty: String,
    pub description: String,
    pub materials: Vec<String>,
    pub colors: Vec<String>,
    pub dimensions: Dimensions,
    pub filename: Option<String>,
    pub favorite: bool,
}

impl NewLuminaire {
    /// Trim text fields and check the record invariants
    pub fn validated(mut self) -> Result<Self> {
        self.name = self.name.trim().to_string();
        self.designer = self.designer.trim().to_string();
        self.period = self.period.trim().to_string();
        self.specialty = self.specialty.trim().to_string();
        self.description = self.description.trim().to_string();
        self.filename = self
            .filename
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());

        if self.name.is_empty() {
            return Err(Error::InvalidInput("name is required".to_string()));
        }
        check_year(self.year)?;
        Ok(self)
    }

    /// Build the stored record with a fresh id and timestamps
    pub fn into_record(self, now: DateTime<Utc>) -> Luminaire {
        Luminaire {
            id: crate::uuid_utils::generate(),
            name: self.name,
            designer: self.designer,
            designer_id: self.designer_id,
            year: self.year,
            period: self.period,
            specialty: self.specialty,
            description: self.description,
            materials: self.materials,
            colors: self.colors,
            dimensions: self.dimensions,
            images: Vec::new(),
            filename: self.filename,
            favorite: self.favorite,
            created_at: now,
            updated_at: now,
        }
    }
}

fn check_year(year: Option<i32>) -> Result<()> {
    match year {
        Some(y) if !time::is_plausible_year(y) => Err(Error::InvalidInput(format!(
            "year must be between 1001 and {}",
            time::current_year()
        ))),
        _ => Ok(()),
    }
}

/// Deserialize a present-but-null field as `Some(None)`
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Lowercased text the free-text search matches against
///
/// Fields are joined with newlines so a whitespace-free term never spans two
/// fields. Search terms must be lowercased with `str::to_lowercase` as well.
pub fn search_text(name: &str, designer: &str, description: &str) -> String {
    [name, designer, description].join("\n").to_lowercase()
}

/// Partial update of a luminaire; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LuminairePatch {
    pub name: Option<String>,
    pub designer: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub designer_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    pub year: Option<Option<i32>>,
    pub period: Option<String>,
    pub specialty: Option<String>,
    pub description: Option<String>,
    pub materials: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub dimensions: Option<Dimensions>,
    #[serde(default, deserialize_with = "nullable")]
    pub filename: Option<Option<String>>,
    pub favorite: Option<bool>,
}

impl Luminaire {
    pub fn search_text(&self) -> String {
        search_text(&self.name, &self.designer, &self.description)
    }

    /// Merge a patch into this record and stamp `updated_at`
    pub fn apply(&mut self, patch: LuminairePatch, now: DateTime<Utc>) -> Result<()> {
        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(Error::InvalidInput("name must not be empty".to_string()));
            }
            self.name = name;
        }
        if let Some(year) = patch.year {
            check_year(year)?;
            self.year = year;
        }
        if let Some(designer) = patch.designer {
            self.designer = designer.trim().to_string();
        }
        if let Some(designer_id) = patch.designer_id {
            self.designer_id = designer_id;
        }
        if let Some(period) = patch.period {
            self.period = period.trim().to_string();
        }
        if let Some(specialty) = patch.specialty {
            self.specialty = specialty.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_string();
        }
        if let Some(materials) = patch.materials {
            self.materials = materials;
        }
        if let Some(colors) = patch.colors {
            self.colors = colors;
        }
        if let Some(dimensions) = patch.dimensions {
            self.dimensions = dimensions;
        }
        if let Some(filename) = patch.filename {
            self.filename = filename;
        }
        if let Some(favorite) = patch.favorite {
            self.favorite = favorite;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Append image ids not already present, keeping order
    ///
    /// Returns how many ids were added.
    pub fn add_images(&mut self, ids: &[Uuid]) -> usize {
        let before = self.images.len();
        for id in ids {
            if !self.images.contains(id) {
                self.images.push(*id);
            }
        }
        self.images.len() - before
    }
}

/// Raw `luminaires` row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LuminaireRow {
    pub guid: String,
    pub name: String,
    pub designer: String,
    pub designer_id: Option<String>,
    pub year: Option<i32>,
    pub period: String,
    pub specialty: String,
    pub description: String,
    pub materials: String,
    pub colors: String,
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub depth: Option<f64>,
    pub images: String,
    pub filename: Option<String>,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn parse_guid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("corrupt id '{}': {}", value, e)))
}

impl TryFrom<LuminaireRow> for Luminaire {
    type Error = Error;

    fn try_from(row: LuminaireRow) -> Result<Self> {
        Ok(Luminaire {
            id: parse_guid(&row.guid)?,
            name: row.name,
            designer: row.designer,
            designer_id: row.designer_id.as_deref().map(parse_guid).transpose()?,
            year: row.year,
            period: row.period,
            specialty: row.specialty,
            description: row.description,
            materials: serde_json::from_str(&row.materials)?,
            colors: serde_json::from_str(&row.colors)?,
            dimensions: Dimensions {
                height: row.height,
                width: row.width,
                depth: row.depth,
            },
            images: serde_json::from_str(&row.images)?,
            filename: row.filename,
            favorite: row.favorite,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// One designer (person or studio)
///
/// `luminaire_count` is computed on read and never stored. Derived designers
/// (present only as luminaire strings) have no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Designer {
    pub id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub biography: String,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub nationality: String,
    pub image: Option<String>,
    pub luminaire_count: usize,
    pub derived: bool,
}

impl Designer {
    /// Profile-less designer built from a luminaire designer string
    pub fn derived_from(designer: &str) -> Self {
        Designer {
            id: None,
            name: crate::designer::derived_key(designer).to_string(),
            slug: crate::designer::slugify(designer),
            biography: String::new(),
            birth_date: None,
            death_date: None,
            nationality: String::new(),
            image: None,
            luminaire_count: 0,
            derived: true,
        }
    }
}

/// Fields accepted when creating a designer
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewDesigner {
    pub name: String,
    pub biography: String,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub nationality: String,
    pub image: Option<String>,
}

impl NewDesigner {
    /// Trim fields, require a name that yields a non-empty slug
    pub fn validated(mut self) -> Result<Self> {
        self.name = self.name.trim().to_string();
        self.biography = self.biography.trim().to_string();
        self.nationality = self.nationality.trim().to_string();
        self.birth_date = trim_opt(self.birth_date);
        self.death_date = trim_opt(self.death_date);
        self.image = trim_opt(self.image);

        if self.name.is_empty() {
            return Err(Error::InvalidInput("name is required".to_string()));
        }
        if self.slug().is_empty() {
            return Err(Error::InvalidInput(format!(
                "name '{}' does not produce a usable slug",
                self.name
            )));
        }
        Ok(self)
    }

    pub fn slug(&self) -> String {
        crate::designer::slugify(&self.name)
    }
}

fn trim_opt(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Raw `designers` row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DesignerRow {
    pub guid: String,
    pub name: String,
    pub slug: String,
    pub biography: String,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub nationality: String,
    pub image: Option<String>,
}

impl TryFrom<DesignerRow> for Designer {
    type Error = Error;

    fn try_from(row: DesignerRow) -> Result<Self> {
        Ok(Designer {
            id: Some(parse_guid(&row.guid)?),
            name: row.name,
            slug: row.slug,
            biography: row.biography,
            birth_date: row.birth_date,
            death_date: row.death_date,
            nationality: row.nationality,
            image: row.image,
            luminaire_count: 0,
            derived: false,
        })
    }
}

/// Description attached to a period label on the timeline view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub period: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

/// Site-wide settings singleton
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
    pub site_title: String,
    pub about_text: String,
    pub logo_asset_id: Option<Uuid>,
    pub video_asset_id: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update of the site settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettingsPatch {
    pub site_title: Option<String>,
    pub about_text: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub logo_asset_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    pub video_asset_id: Option<Option<Uuid>>,
}

impl SiteSettings {
    pub fn apply(&mut self, patch: SiteSettingsPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.site_title {
            self.site_title = title.trim().to_string();
        }
        if let Some(about) = patch.about_text {
            self.about_text = about;
        }
        if let Some(logo) = patch.logo_asset_id {
            self.logo_asset_id = logo;
        }
        if let Some(video) = patch.video_asset_id {
            self.video_asset_id = video;
        }
        self.updated_at = Some(now);
    }
}

/// Named partition of the asset store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    /// General catalog images
    Uploads,
    Logo,
    Video,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Uploads => "uploads",
            Bucket::Logo => "logo",
            Bucket::Video => "video",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "uploads" | "" => Ok(Bucket::Uploads),
            "logo" => Ok(Bucket::Logo),
            "video" => Ok(Bucket::Video),
            other => Err(Error::InvalidInput(format!("Unknown bucket: {}", other))),
        }
    }
}

/// Metadata of a stored asset (bytes excluded)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMeta {
    pub id: Uuid,
    pub bucket: Bucket,
    pub filename: String,
    pub content_type: String,
    pub length: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Raw `assets` row without the data column
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssetRow {
    pub guid: String,
    pub bucket: String,
    pub filename: String,
    pub content_type: String,
    pub length: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl TryFrom<AssetRow> for AssetMeta {
    type Error = Error;

    fn try_from(row: AssetRow) -> Result<Self> {
        Ok(AssetMeta {
            id: parse_guid(&row.guid)?,
            bucket: row.bucket.parse()?,
            filename: row.filename,
            content_type: row.content_type,
            length: row.length,
            uploaded_at: row.uploaded_at,
        })
    }
}
