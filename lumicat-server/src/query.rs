//! Catalog query parameters
//!
//! Turns the raw `GET /api/catalog` query string into a validated
//! [`CatalogQuery`]: filter, sort and pagination window. SQL generation lives
//! in `db::luminaires`.

use lumicat_common::config::CatalogConfig;
use lumicat_common::{Error, Result};
use serde::Deserialize;

/// Raw query-string parameters
///
/// Everything arrives as text so that empty values (`?designer=`) can be
/// treated as absent instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogParams {
    pub search: Option<String>,
    pub designer: Option<String>,
    pub period: Option<String>,
    pub materials: Option<String>,
    pub colors: Option<String>,
    pub year_min: Option<String>,
    pub year_max: Option<String>,
    pub favorite: Option<String>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Whitelisted sort columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Designer,
    Year,
    Period,
    Specialty,
    CreatedAt,
    UpdatedAt,
    Favorite,
}

impl SortField {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "name" => Ok(SortField::Name),
            "designer" => Ok(SortField::Designer),
            "year" => Ok(SortField::Year),
            "period" => Ok(SortField::Period),
            "specialty" => Ok(SortField::Specialty),
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(SortField::UpdatedAt),
            "favorite" => Ok(SortField::Favorite),
            other => Err(Error::InvalidInput(format!("Invalid sort field: {}", other))),
        }
    }

    /// SQL expression to order by
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Name => "name COLLATE NOCASE",
            SortField::Designer => "designer COLLATE NOCASE",
            SortField::Year => "year",
            SortField::Period => "period COLLATE NOCASE",
            SortField::Specialty => "specialty COLLATE NOCASE",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Favorite => "favorite",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "asc" | "1" => Ok(SortDirection::Asc),
            "desc" | "-1" => Ok(SortDirection::Desc),
            other => Err(Error::InvalidInput(format!("Invalid sort direction: {}", other))),
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    /// Newest first
    fn default() -> Self {
        Sort {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// Structured field filters, combined with AND
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    pub designer: Option<String>,
    pub period: Option<String>,
    /// Any-of
    pub materials: Vec<String>,
    /// Any-of
    pub colors: Vec<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub favorite_only: bool,
}

impl FieldFilter {
    pub fn is_empty(&self) -> bool {
        *self == FieldFilter::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogFilter {
    /// Free-text terms; overrides every field filter
    Search(Vec<String>),
    Fields(FieldFilter),
}

/// Validated catalog query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub filter: CatalogFilter,
    pub sort: Sort,
    pub page: i64,
    pub limit: i64,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_int<T: std::str::FromStr>(value: &Option<String>, name: &str) -> Result<Option<T>> {
    present(value)
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| Error::InvalidInput(format!("{} must be a number, got '{}'", name, v)))
        })
        .transpose()
}

fn parse_flag(value: &Option<String>) -> Result<bool> {
    match present(value) {
        None => Ok(false),
        Some(v) => match v.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(Error::InvalidInput(format!("favorite must be true or false, got '{}'", other))),
        },
    }
}

/// Split a comma-separated list, trimming and dropping empty entries
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl CatalogQuery {
    pub fn from_params(params: &CatalogParams, config: &CatalogConfig) -> Result<Self> {
        let sort = Sort {
            field: present(&params.sort_field)
                .map(SortField::parse)
                .transpose()?
                .unwrap_or(SortField::CreatedAt),
            direction: present(&params.sort_direction)
                .map(SortDirection::parse)
                .transpose()?
                .unwrap_or(SortDirection::Desc),
        };

        let limit = parse_int::<i64>(&params.limit, "limit")?
            .unwrap_or(config.default_page_size)
            .clamp(1, config.max_page_size);
        // Keep (page - 1) * limit within i64
        let page = parse_int::<i64>(&params.page, "page")?
            .unwrap_or(1)
            .clamp(1, i64::MAX / limit);

        let terms: Vec<String> = present(&params.search)
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let filter = if !terms.is_empty() {
            CatalogFilter::Search(terms)
        } else {
            CatalogFilter::Fields(FieldFilter {
                designer: present(&params.designer).map(str::to_string),
                period: present(&params.period).map(str::to_string),
                materials: present(&params.materials).map(split_list).unwrap_or_default(),
                colors: present(&params.colors).map(split_list).unwrap_or_default(),
                year_min: parse_int(&params.year_min, "yearMin")?,
                year_max: parse_int(&params.year_max, "yearMax")?,
                favorite_only: parse_flag(&params.favorite)?,
            })
        };

        Ok(CatalogQuery {
            filter,
            sort,
            page,
            limit,
        })
    }
}
