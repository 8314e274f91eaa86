//! Record Normalization
//!
//! Converts raw catalog JSON into [`Artwork`] and [`Artist`]. This is the only
//! place that knows upstream field names.
//!
//! Two strictness levels exist:
//! - detail lookups require a title and fail with `NotFound` without one
//! - feed entries substitute [`UNKNOWN`] for a missing title so a page keeps
//!   its length; entries without an id cannot be keyed and are dropped

use serde::Deserialize;
use serde_json::Value;

use super::traits::{ArtworkPage, GatewayError, Resource};
use crate::model::{Artist, ArtistRef, Artwork, ImageSource, YearSpan, UNKNOWN};

/// Image-service URL template
///
/// Produces `https://{host}/{service_path}/{image_id}/full/{width},/0/default.jpg`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageTemplate {
    /// Image service host
    pub host: String,
    /// Path prefix of the image service
    pub service_path: String,
    /// Requested pixel width
    pub width: u32,
}

impl Default for ImageTemplate {
    fn default() -> Self {
        Self {
            host: "www.artic.edu".to_string(),
            service_path: "iiif/2".to_string(),
            width: 843,
        }
    }
}

impl ImageTemplate {
    /// Image source for an optional upstream image id
    #[must_use]
    pub fn source(&self, image_id: Option<&str>) -> ImageSource {
        match image_id.map(str::trim) {
            Some(id) if !id.is_empty() => ImageSource::Remote(format!(
                "https://{}/{}/{}/full/{},/0/default.jpg",
                self.host.trim_matches('/'),
                self.service_path.trim_matches('/'),
                id,
                self.width
            )),
            _ => ImageSource::Placeholder,
        }
    }
}

/// Upstream ids arrive as numbers; accept strings too
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> Option<String> {
        match self {
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) if !s.trim().is_empty() => Some(s),
            Self::Text(_) => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawArtwork {
    id: Option<RawId>,
    title: Option<String>,
    image_id: Option<String>,
    artist_id: Option<RawId>,
    artist_title: Option<String>,
    date_start: Option<i32>,
    date_end: Option<i32>,
    dimensions: Option<String>,
    medium_display: Option<String>,
    place_of_origin: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawArtist {
    id: Option<RawId>,
    title: Option<String>,
    birth_date: Option<i32>,
    death_date: Option<i32>,
    description: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn build_artwork(id: String, title: String, raw: RawArtwork, images: &ImageTemplate) -> Artwork {
    let artist = raw.artist_id.and_then(RawId::into_string).map(|artist_id| ArtistRef {
        id: artist_id,
        name: non_blank(raw.artist_title).unwrap_or_else(|| UNKNOWN.to_string()),
    });

    Artwork {
        id,
        title,
        image: images.source(raw.image_id.as_deref()),
        artist,
        years: YearSpan::new(raw.date_start, raw.date_end),
        dimensions: non_blank(raw.dimensions),
        medium: non_blank(raw.medium_display),
        origin: non_blank(raw.place_of_origin),
    }
}

/// Strict normalization of an artwork detail payload
///
/// `requested_id` is reported in the error and used when the payload itself
/// omits its id.
///
/// # Errors
///
/// `NotFound` when the payload is absent, malformed, or has no title.
pub fn artwork_detail(
    requested_id: &str,
    data: Option<Value>,
    images: &ImageTemplate,
) -> Result<Artwork, GatewayError> {
    let not_found = || GatewayError::not_found(Resource::Artwork, requested_id);

    let raw: RawArtwork = data
        .and_then(|value| serde_json::from_value(value).ok())
        .ok_or_else(not_found)?;

    let title = non_blank(raw.title.clone()).ok_or_else(not_found)?;
    let id = raw
        .id
        .clone()
        .and_then(RawId::into_string)
        .unwrap_or_else(|| requested_id.to_string());

    Ok(build_artwork(id, title, raw, images))
}

/// Lenient normalization of one feed entry
///
/// Returns `None` for entries that cannot be keyed.
#[must_use]
pub fn artwork_entry(value: Value, images: &ImageTemplate) -> Option<Artwork> {
    let raw: RawArtwork = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "Dropping malformed feed entry");
            return None;
        }
    };

    let Some(id) = raw.id.clone().and_then(RawId::into_string) else {
        tracing::warn!("Dropping feed entry without an id");
        return None;
    };

    let title = non_blank(raw.title.clone()).unwrap_or_else(|| UNKNOWN.to_string());
    Some(build_artwork(id, title, raw, images))
}

/// Normalize a feed page
///
/// `raw_len` of the result counts every entry, including dropped ones.
#[must_use]
pub fn artwork_page(entries: Vec<Value>, images: &ImageTemplate) -> ArtworkPage {
    let raw_len = entries.len();
    let items = entries
        .into_iter()
        .filter_map(|entry| artwork_entry(entry, images))
        .collect();
    ArtworkPage { items, raw_len }
}

/// Strict normalization of an artist detail payload
///
/// # Errors
///
/// `NotFound` when the payload is absent, malformed, or has no name.
pub fn artist_detail(requested_id: &str, data: Option<Value>) -> Result<Artist, GatewayError> {
    let not_found = || GatewayError::not_found(Resource::Artist, requested_id);

    let raw: RawArtist = data
        .and_then(|value| serde_json::from_value(value).ok())
        .ok_or_else(not_found)?;

    let name = non_blank(raw.title).ok_or_else(not_found)?;
    let id = raw
        .id
        .and_then(RawId::into_string)
        .unwrap_or_else(|| requested_id.to_string());

    Ok(Artist {
        id,
        name,
        birth_year: raw.birth_date,
        death_year: raw.death_date,
        biography: non_blank(raw.description),
        artwork_titles: None,
    })
}

/// Titles from an artist-works search page, skipping untitled entries
#[must_use]
pub fn artwork_titles(entries: &[Value]) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| entry.get("title").and_then(Value::as_str))
        .filter(|title| !title.trim().is_empty())
        .map(String::from)
        .collect()
}
