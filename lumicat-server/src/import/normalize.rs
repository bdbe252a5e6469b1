//! Row normalization into the canonical record schema
//!
//! Column names vary between spreadsheet exports; each canonical field is
//! read from an ordered alias list.

use std::path::Path;

use lumicat_common::config::YearPolicy;
use lumicat_common::db::models::{Dimensions, NewDesigner, NewLuminaire};
use lumicat_common::time;

use super::parse::Row;
use crate::query::split_list;

pub const NAME: &[&str] = &["Nom luminaire", "Nom du luminaire", "Nom", "nom", "Name", "name"];
pub const DESIGNER: &[&str] = &["Designer", "designer", "Créateur", "createur", "Designers"];
pub const YEAR: &[&str] = &["Année", "annee", "Annee", "Year", "year", "Date"];
pub const PERIOD: &[&str] = &["Période", "periode", "Periode", "Period", "period"];
pub const SPECIALTY: &[&str] = &[
    "Spécialité",
    "specialite",
    "Specialty",
    "specialty",
    "Catégorie",
    "category",
];
pub const DESCRIPTION: &[&str] = &["Description", "description", "Descriptif", "Notes"];
pub const MATERIALS: &[&str] = &["Matériaux", "materiaux", "Materiaux", "Materials", "materials"];
pub const COLORS: &[&str] = &["Couleurs", "couleurs", "Couleur", "Colors", "colors"];
pub const FILENAME: &[&str] = &[
    "Nom du fichier",
    "nom_fichier",
    "Fichier",
    "filename",
    "Filename",
    "image",
];
pub const HEIGHT: &[&str] = &["Hauteur", "hauteur", "Height", "height"];
pub const WIDTH: &[&str] = &["Largeur", "largeur", "Width", "width"];
pub const DEPTH: &[&str] = &["Profondeur", "profondeur", "Depth", "depth"];

pub const DESIGNER_NAME: &[&str] = &["Nom", "nom", "Name", "name", "Designer", "designer"];
pub const BIOGRAPHY: &[&str] = &["Biographie", "biographie", "Biography", "biography", "bio"];
pub const BIRTH: &[&str] = &["Naissance", "naissance", "Birth", "birthDate", "birth_date"];
pub const DEATH: &[&str] = &["Décès", "deces", "Death", "deathDate", "death_date"];
pub const NATIONALITY: &[&str] = &["Nationalité", "nationalite", "Nationality", "nationality"];
pub const PORTRAIT: &[&str] = &["Image", "image", "Portrait", "portrait"];

/// Year within `(1000, current year]`, otherwise what the policy dictates
pub fn normalize_year(raw: Option<&str>, policy: YearPolicy) -> Option<i32> {
    let parsed = raw
        .and_then(|v| v.trim().parse::<i32>().ok())
        .filter(|y| time::is_plausible_year(*y));

    match (parsed, policy) {
        (Some(year), _) => Some(year),
        (None, YearPolicy::Absent) => None,
        (None, YearPolicy::CurrentYear) => Some(time::current_year()),
    }
}

/// Decimal number accepting `,` as the decimal separator
pub fn parse_decimal(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.trim().replace(',', ".").parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// File name without its extension
pub fn filename_stem(filename: &str) -> Option<String> {
    Path::new(filename.trim())
        .file_stem()
        .map(|s| s.to_string_lossy().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Build a luminaire from an import row
///
/// Errors carry the reason only; the caller prefixes the row label.
pub fn luminaire_from_row(row: &Row<'_>, policy: YearPolicy) -> Result<NewLuminaire, String> {
    let filename = row.pick(FILENAME).map(str::to_string);
    let name = row
        .pick(NAME)
        .map(str::to_string)
        .or_else(|| filename.as_deref().and_then(filename_stem))
        .ok_or_else(|| "missing name".to_string())?;

    let new = NewLuminaire {
        name,
        designer: row.pick(DESIGNER).unwrap_or_default().to_string(),
        designer_id: None,
        year: normalize_year(row.pick(YEAR), policy),
        period: row.pick(PERIOD).unwrap_or_default().to_string(),
        specialty: row.pick(SPECIALTY).unwrap_or_default().to_string(),
        description: row.pick(DESCRIPTION).unwrap_or_default().to_string(),
        materials: row.pick(MATERIALS).map(split_list).unwrap_or_default(),
        colors: row.pick(COLORS).map(split_list).unwrap_or_default(),
        dimensions: Dimensions {
            height: parse_decimal(row.pick(HEIGHT)),
            width: parse_decimal(row.pick(WIDTH)),
            depth: parse_decimal(row.pick(DEPTH)),
        },
        filename,
        favorite: false,
    };

    new.validated().map_err(|e| e.to_string())
}

/// Build a designer profile from an import row
pub fn designer_from_row(row: &Row<'_>) -> Result<NewDesigner, String> {
    let name = row
        .pick(DESIGNER_NAME)
        .ok_or_else(|| "missing name".to_string())?;

    NewDesigner {
        name: name.to_string(),
        biography: row.pick(BIOGRAPHY).unwrap_or_default().to_string(),
        birth_date: row.pick(BIRTH).map(str::to_string),
        death_date: row.pick(DEATH).map(str::to_string),
        nationality: row.pick(NATIONALITY).unwrap_or_default().to_string(),
        image: row.pick(PORTRAIT).map(str::to_string),
    }
    .validated()
    .map_err(|e| e.to_string())
}
