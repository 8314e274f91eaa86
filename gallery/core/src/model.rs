//! Catalog Data Model
//!
//! Normalized records produced by the gateway. Everything here is immutable
//! once fetched; the engine never edits a record locally.
//!
//! # Display Conventions
//!
//! Optional free-text fields are rendered as [`UNKNOWN`] when absent, and a
//! missing image is carried as [`ImageSource::Placeholder`] so the surface can
//! swap in a bundled placeholder instead of issuing a network fetch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Text shown for any absent descriptive field
pub const UNKNOWN: &str = "Unknown";

/// Sentinel string form of [`ImageSource::Placeholder`]
pub const NO_IMAGE: &str = "no-image";

/// Where an artwork's picture comes from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSource {
    /// Image-service URL derived from the remote image identifier
    Remote(String),
    /// No image identifier upstream; render the local placeholder
    Placeholder,
}

impl ImageSource {
    /// The URL to fetch, if any
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Remote(url) => Some(url),
            Self::Placeholder => None,
        }
    }

    /// Whether the surface should show its placeholder
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// URL or the `no-image` sentinel
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Remote(url) => url,
            Self::Placeholder => NO_IMAGE,
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Temporal range of an artwork
///
/// Neither bound is validated against the other: catalogs contain records
/// whose end year precedes the start year and those are shown as-is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSpan {
    /// First year of creation
    pub start: Option<i32>,
    /// Last year of creation
    pub end: Option<i32>,
}

impl YearSpan {
    /// Create a span from optional bounds
    #[must_use]
    pub fn new(start: Option<i32>, end: Option<i32>) -> Self {
        Self { start, end }
    }

    /// Whether neither bound is known
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

impl fmt::Display for YearSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start == end => write!(f, "{start}"),
            (Some(start), Some(end)) => write!(f, "{start} - {end}"),
            (Some(year), None) | (None, Some(year)) => write!(f, "{year}"),
            (None, None) => f.write_str(UNKNOWN),
        }
    }
}

/// Lightweight pointer from an artwork to its artist
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    /// Artist identifier in the remote catalog
    pub id: String,
    /// Display name
    pub name: String,
}

/// A normalized catalog record for one piece of art
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    /// Stable identifier from the remote catalog
    pub id: String,
    /// Title
    pub title: String,
    /// Image to display
    pub image: ImageSource,
    /// Attributed artist, if the catalog names one
    pub artist: Option<ArtistRef>,
    /// Creation years
    pub years: YearSpan,
    /// Physical dimensions
    pub dimensions: Option<String>,
    /// Medium
    pub medium: Option<String>,
    /// Place of origin
    pub origin: Option<String>,
}

impl Artwork {
    /// Minimal record with a placeholder image and no optional fields
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image: ImageSource::Placeholder,
            artist: None,
            years: YearSpan::default(),
            dimensions: None,
            medium: None,
            origin: None,
        }
    }

    /// Artist name or [`UNKNOWN`]
    #[must_use]
    pub fn artist_name(&self) -> &str {
        self.artist.as_ref().map_or(UNKNOWN, |a| a.name.as_str())
    }

    /// Dimensions or [`UNKNOWN`]
    #[must_use]
    pub fn dimensions_display(&self) -> &str {
        or_unknown(self.dimensions.as_deref())
    }

    /// Medium or [`UNKNOWN`]
    #[must_use]
    pub fn medium_display(&self) -> &str {
        or_unknown(self.medium.as_deref())
    }

    /// Place of origin or [`UNKNOWN`]
    #[must_use]
    pub fn origin_display(&self) -> &str {
        or_unknown(self.origin.as_deref())
    }
}

/// Artist card data
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Artist identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Birth year
    pub birth_year: Option<i32>,
    /// Death year
    pub death_year: Option<i32>,
    /// Biography text (may contain markup from upstream)
    pub biography: Option<String>,
    /// Titles of attributed artworks; `None` until resolved
    pub artwork_titles: Option<Vec<String>>,
}

impl Artist {
    /// Biography or [`UNKNOWN`]
    #[must_use]
    pub fn biography_display(&self) -> &str {
        or_unknown(self.biography.as_deref())
    }

    /// Birth year for display
    #[must_use]
    pub fn born_display(&self) -> String {
        year_or_unknown(self.birth_year)
    }

    /// Death year for display
    #[must_use]
    pub fn died_display(&self) -> String {
        year_or_unknown(self.death_year)
    }
}

fn or_unknown(value: Option<&str>) -> &str {
    match value {
        Some(text) if !text.trim().is_empty() => text,
        _ => UNKNOWN,
    }
}

fn year_or_unknown(year: Option<i32>) -> String {
    year.map_or_else(|| UNKNOWN.to_string(), |y| y.to_string())
}
