//! Gallery Core - Headless Art Catalog Browser
//!
//! This crate provides the logic of the gallery browser independent of any
//! presentation layer. It can drive the command-line front end, a TUI, or run
//! headless for testing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Surfaces                                │
//! │   ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌────────────┐   │
//! │   │  Browse  │   │  Search  │   │ Favorites │   │  Detail    │   │
//! │   └────┬─────┘   └────┬─────┘   └─────┬─────┘   └─────┬──────┘   │
//! └────────┼──────────────┼───────────────┼───────────────┼──────────┘
//!          │              │               │               │
//! ┌────────┼──────────────┼───────────────┼───────────────┼──────────┐
//! │        ▼              ▼               ▼               ▼          │
//! │  ┌─────────────────────────┐  ┌─────────────────┐ ┌───────────┐  │
//! │  │   ListingController     │  │ HydrationCtrl   │ │ DetailCtrl│  │
//! │  └───────────┬─────────────┘  └───┬─────────┬───┘ └─────┬─────┘  │
//! │              │                    │         │           │        │
//! │              │      ┌─────────────┘   ┌─────▼───────────▼──┐     │
//! │              │      │                 │  FavoritesStore    │     │
//! │              │      │  FavoriteMarker ◄── ChangeBus        │     │
//! │              ▼      ▼                 └─────────┬──────────┘     │
//! │        ┌───────────────────┐          ┌─────────▼──────────┐     │
//! │        │  CatalogGateway   │          │   KeyValueStore    │     │
//! │        │  (ArticGateway)   │          │ (FileStore/Memory) │     │
//! │        └─────────┬─────────┘          └────────────────────┘     │
//! │                  │                      GALLERY CORE             │
//! └──────────────────┼───────────────────────────────────────────────┘
//!                    ▼
//!            Remote catalog API
//! ```
//!
//! # Key Types
//!
//! - [`ListingController`]: Paginated browse and search feeds
//! - [`FavoritesStore`]: Durable favorites with change notification
//! - [`FavoriteMarker`]: Per-item favorited flag kept in sync via the bus
//! - [`HydrationController`]: Resolves favorites into full records
//! - [`DetailController`]: Artwork and artist cards
//! - [`CatalogGateway`]: Remote catalog abstraction
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use gallery_core::{
//!     ArticGateway, ChangeBus, FavoritesStore, FileStore, GalleryConfig, ListingController,
//! };
//!
//! let config = GalleryConfig::default();
//! let gateway = Arc::new(ArticGateway::from_config(&config)?);
//! let store = FavoritesStore::new(Arc::new(FileStore::new("storage.json")), ChangeBus::new());
//!
//! let feed = ListingController::browse(gateway, config.page_size);
//! feed.load_next().await?;
//! for entry in feed.snapshot().entries {
//!     let favorite = store.is_favorite(&entry.artwork.id).await;
//!     println!("{} {}", if favorite { "♥" } else { " " }, entry.artwork.title);
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`bus`]: In-process change notification
//! - [`config`]: TOML/env/CLI configuration
//! - [`detail`]: Artwork and artist cards
//! - [`favorites`]: Favorites store, markers, and hydration
//! - [`gateway`]: Remote catalog access and record normalization
//! - [`listing`]: Pagination state machine
//! - [`model`]: Domain records
//! - [`storage`]: Durable key-value storage

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bus;
pub mod config;
pub mod detail;
pub mod favorites;
pub mod gateway;
pub mod listing;
pub mod model;
pub mod storage;
pub mod test_utils;

// Re-exports for convenience
pub use bus::{ChangeBus, PublishReport, SubscriberId, Subscription};
pub use detail::{ArtworkDetail, DetailController};
pub use favorites::{
    FavoriteMarker, FavoritesStore, HydrationController, HydrationSnapshot, FAVORITES_KEY,
};
pub use gateway::{
    ArticGateway, ArtworkPage, CatalogGateway, GatewayError, ImageTemplate, PageRequest,
    Resource, DEFAULT_API_URL,
};
pub use listing::{
    ListingController, ListingEntry, ListingPhase, ListingSnapshot, LoadOutcome,
    DEFAULT_PAGE_SIZE,
};
pub use model::{Artist, ArtistRef, Artwork, ImageSource, YearSpan};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

// Config exports
pub use config::{
    default_config_path, default_storage_path, load_config, load_config_from_path,
    ConfigError, ConfigOverrides, ConfigSource, GalleryConfig, GalleryToml,
};
