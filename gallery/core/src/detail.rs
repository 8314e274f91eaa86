//! Detail Cards
//!
//! Single-record lookups for the artwork and artist cards. The artwork card
//! carries the favorited flag read at lookup time; subscribe a
//! [`FavoriteMarker`](crate::favorites::FavoriteMarker) to keep it current.

use std::sync::Arc;

use crate::favorites::FavoritesStore;
use crate::gateway::{CatalogGateway, GatewayError};
use crate::model::{Artist, Artwork};

/// Artwork card contents
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtworkDetail {
    /// The artwork
    pub artwork: Artwork,
    /// Whether the artwork was favorited when looked up
    pub is_favorite: bool,
}

/// Resolves detail cards
pub struct DetailController {
    gateway: Arc<dyn CatalogGateway>,
    store: FavoritesStore,
    artist_works_limit: u32,
}

impl DetailController {
    /// Create a controller; `artist_works_limit` caps the titles on artist cards
    pub fn new(gateway: Arc<dyn CatalogGateway>, store: FavoritesStore, artist_works_limit: u32) -> Self {
        Self {
            gateway,
            store,
            artist_works_limit,
        }
    }

    /// Artwork card for `id`
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id and `Transport` for network or
    /// protocol failures.
    pub async fn artwork(&self, id: &str) -> Result<ArtworkDetail, GatewayError> {
        let (artwork, is_favorite) = futures::join!(
            self.gateway.get_artwork_detail(id),
            self.store.is_favorite(id)
        );
        Ok(ArtworkDetail {
            artwork: artwork?,
            is_favorite,
        })
    }

    /// Artist card for `id`, with attributed titles
    ///
    /// # Errors
    ///
    /// Returns the artist lookup failure. A failed title lookup is logged and
    /// leaves `artwork_titles` as `None`.
    pub async fn artist(&self, id: &str) -> Result<Artist, GatewayError> {
        let (artist, titles) = futures::join!(
            self.gateway.get_artist_detail(id),
            self.gateway.artist_artwork_titles(id, self.artist_works_limit)
        );
        let mut artist = artist?;
        artist.artwork_titles = match titles {
            Ok(titles) => Some(titles),
            Err(e) => {
                tracing::warn!(artist = %id, error = %e, "Could not resolve artist works");
                None
            }
        };
        Ok(artist)
    }
}
