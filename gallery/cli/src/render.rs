//! Plain-text rendering of core snapshots

use std::collections::HashSet;
use std::fmt::Write;

use gallery_core::detail::ArtworkDetail;
use gallery_core::{Artist, Artwork, ListingSnapshot};

const HEART: &str = "♥";
const NO_IMAGE: &str = "[no image]";

fn marker(favorite: bool) -> &'static str {
    if favorite {
        HEART
    } else {
        " "
    }
}

/// One list row: favorite marker, id, title, artist, image note
#[must_use]
pub fn artwork_row(artwork: &Artwork, favorite: bool) -> String {
    let mut row = format!(
        "{} {:>8}  {} ({})",
        marker(favorite),
        artwork.id,
        artwork.title,
        artwork.artist_name()
    );
    if artwork.image.is_placeholder() {
        row.push_str("  ");
        row.push_str(NO_IMAGE);
    }
    row
}

/// A browse or search feed
#[must_use]
pub fn listing(snapshot: &ListingSnapshot, favorites: &HashSet<String>) -> String {
    let mut out = String::new();
    if let Some(ref query) = snapshot.query {
        let _ = writeln!(out, "Results for \"{query}\"");
    }
    for entry in &snapshot.entries {
        let favorite = favorites.contains(&entry.artwork.id);
        let _ = writeln!(out, "{}", artwork_row(&entry.artwork, favorite));
    }
    if let Some(ref error) = snapshot.error {
        let _ = writeln!(out, "! {error}");
    }
    let _ = write!(out, "{} artworks", snapshot.entries.len());
    if snapshot.has_more {
        let _ = write!(out, " (more from page {})", snapshot.next_page);
    }
    out.push('\n');
    out
}

/// The favorites view
#[must_use]
pub fn favorites(items: &[Artwork], unresolved: usize) -> String {
    if items.is_empty() && unresolved == 0 {
        return "No favorites yet\n".to_string();
    }
    let mut out = String::new();
    for artwork in items {
        let _ = writeln!(out, "{}", artwork_row(artwork, true));
    }
    if unresolved > 0 {
        let _ = writeln!(out, "({unresolved} favorites could not be loaded)");
    }
    out
}

/// The artwork card
#[must_use]
pub fn artwork_card(detail: &ArtworkDetail) -> String {
    let artwork = &detail.artwork;
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", marker(detail.is_favorite), artwork.title);
    let _ = writeln!(out, "  Artist:     {}", artwork.artist_name());
    if let Some(ref artist) = artwork.artist {
        let _ = writeln!(out, "  Artist id:  {}", artist.id);
    }
    let _ = writeln!(out, "  Date:       {}", artwork.years);
    let _ = writeln!(out, "  Dimensions: {}", artwork.dimensions_display());
    let _ = writeln!(out, "  Medium:     {}", artwork.medium_display());
    let _ = writeln!(out, "  Origin:     {}", artwork.origin_display());
    let _ = writeln!(out, "  Image:      {}", artwork.image.url().unwrap_or(NO_IMAGE));
    out
}

/// The artist card
#[must_use]
pub fn artist_card(artist: &Artist) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", artist.name);
    let _ = writeln!(out, "  Born:  {}", artist.born_display());
    let _ = writeln!(out, "  Died:  {}", artist.died_display());
    let _ = writeln!(out, "  About: {}", artist.biography_display());
    match artist.artwork_titles {
        Some(ref titles) if titles.is_empty() => {
            let _ = writeln!(out, "  Works: none listed");
        }
        Some(ref titles) => {
            let _ = writeln!(out, "  Works:");
            for title in titles {
                let _ = writeln!(out, "    - {title}");
            }
        }
        None => {
            let _ = writeln!(out, "  Works: could not be loaded");
        }
    }
    out
}
