//! Catalog Gateway Traits
//!
//! Trait definitions for remote catalog access. The listing, hydration and
//! detail controllers only ever talk to [`CatalogGateway`], so the HTTP client
//! can be swapped for a scripted one in tests.
//!
//! # Paging Contract
//!
//! Pages are 1-based. A page past the end of the catalog is an empty page,
//! never an error. Callers infer the end of results from a short page, judged
//! by [`ArtworkPage::raw_len`] so entries dropped during normalization do not
//! end a feed early.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Artist, Artwork};

/// Kind of record a lookup was for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    /// An artwork record
    Artwork,
    /// An artist record
    Artist,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Artwork => write!(f, "artwork"),
            Self::Artist => write!(f, "artist"),
        }
    }
}

/// Errors surfaced by a catalog gateway
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Network failure, non-2xx status, or an undecodable body
    #[error("catalog request failed: {message}")]
    Transport {
        /// Human-readable cause
        message: String,
        /// HTTP status, when a response was received
        status: Option<u16>,
    },

    /// The record does not exist or lacks its required fields
    #[error("{resource} {id} not found")]
    NotFound {
        /// What was looked up
        resource: Resource,
        /// Identifier that failed to resolve
        id: String,
    },
}

impl GatewayError {
    /// Transport failure without an HTTP status
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// Transport failure carrying the HTTP status
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Missing record
    pub fn not_found(resource: Resource, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Whether this is a transport-level failure
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether this is a missing-record failure
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// One page of a feed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// Free-text query; `None` selects the plain browse feed
    pub query: Option<String>,
    /// 1-based page number
    pub page: u32,
    /// Requested page size
    pub page_size: u32,
}

impl PageRequest {
    /// Browse feed page
    #[must_use]
    pub fn browse(page: u32, page_size: u32) -> Self {
        Self {
            query: None,
            page,
            page_size,
        }
    }

    /// Search feed page
    pub fn search(query: impl Into<String>, page: u32, page_size: u32) -> Self {
        Self {
            query: Some(query.into()),
            page,
            page_size,
        }
    }
}

/// One page of feed results
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtworkPage {
    /// Normalized artworks in remote order
    pub items: Vec<Artwork>,
    /// Entries the remote returned, counting ones dropped by normalization
    pub raw_len: usize,
}

impl ArtworkPage {
    /// Page where every remote entry survived normalization
    #[must_use]
    pub fn from_items(items: Vec<Artwork>) -> Self {
        let raw_len = items.len();
        Self { items, raw_len }
    }

    /// Whether the remote returned fewer entries than `page_size`
    #[must_use]
    pub fn is_short(&self, page_size: u32) -> bool {
        self.raw_len < page_size as usize
    }

    /// Whether no artworks survived normalization
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of normalized artworks
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl From<Vec<Artwork>> for ArtworkPage {
    fn from(items: Vec<Artwork>) -> Self {
        Self::from_items(items)
    }
}

/// Remote catalog access
///
/// Implementations normalize raw records before returning them; callers never
/// see partially-populated upstream shapes.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Gateway name for logs (e.g. "artic")
    fn name(&self) -> &str;

    /// One page of the unfiltered browse feed
    async fn list_artworks(&self, page: u32, page_size: u32)
        -> Result<ArtworkPage, GatewayError>;

    /// One page of free-text search results
    ///
    /// An empty query is valid and yields the unfiltered feed.
    async fn search_artworks(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ArtworkPage, GatewayError>;

    /// Full record for one artwork
    async fn get_artwork_detail(&self, id: &str) -> Result<Artwork, GatewayError>;

    /// Full record for one artist, without artwork titles
    async fn get_artist_detail(&self, id: &str) -> Result<Artist, GatewayError>;

    /// Titles of artworks attributed to an artist
    async fn artist_artwork_titles(
        &self,
        artist_id: &str,
        limit: u32,
    ) -> Result<Vec<String>, GatewayError>;

    /// Dispatch a [`PageRequest`] to the browse or search endpoint
    async fn fetch_page(&self, request: &PageRequest) -> Result<ArtworkPage, GatewayError> {
        match request.query {
            Some(ref query) => {
                self.search_artworks(query, request.page, request.page_size)
                    .await
            }
            None => self.list_artworks(request.page, request.page_size).await,
        }
    }
}
