//! Composition root
//!
//! Owns the one [`ChangeBus`] and [`FavoritesStore`] of the process and runs
//! each subcommand against them.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use gallery_core::{
    CatalogGateway, ChangeBus, DetailController, FavoriteMarker, FavoritesStore,
    HydrationController, KeyValueStore, ListingController, LoadOutcome,
};

use crate::render;

/// Favorites subcommand actions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FavAction {
    /// Mark an artwork as favorite
    Add(String),
    /// Unmark an artwork
    Remove(String),
    /// Flip an artwork's state
    Toggle(String),
    /// Remove every favorite
    Clear,
    /// Print the persisted ids
    Ids,
}

/// Wired-up gallery services
pub struct App {
    gateway: Arc<dyn CatalogGateway>,
    favorites: FavoritesStore,
    page_size: u32,
    artist_works_limit: u32,
    _bus_log: gallery_core::Subscription,
}

impl App {
    /// Wire services over `gateway` and `storage`
    pub fn new(
        gateway: Arc<dyn CatalogGateway>,
        storage: Arc<dyn KeyValueStore>,
        page_size: u32,
        artist_works_limit: u32,
    ) -> Self {
        let bus = ChangeBus::new();
        let bus_log = bus.subscribe(|| tracing::debug!("Favorites changed"));
        Self {
            gateway,
            favorites: FavoritesStore::new(storage, bus),
            page_size,
            artist_works_limit,
            _bus_log: bus_log,
        }
    }

    /// Unfiltered feed, up to `pages` pages
    pub async fn browse(&self, pages: u32) -> Result<String> {
        let feed = ListingController::browse(self.gateway.clone(), self.page_size);
        self.render_feed(&feed, pages).await
    }

    /// Search results for `query`, up to `pages` pages
    ///
    /// The first page is always fetched; the CLI rejects `--pages 0`.
    pub async fn search(&self, query: &str, pages: u32) -> Result<String> {
        let feed = ListingController::search(self.gateway.clone(), self.page_size);
        feed.set_query(query)
            .await
            .with_context(|| format!("search for \"{query}\" failed"))?;
        self.render_feed(&feed, pages.saturating_sub(1)).await
    }

    async fn render_feed(&self, feed: &ListingController, pages: u32) -> Result<String> {
        for _ in 0..pages {
            match feed.load_next().await {
                Ok(LoadOutcome::Loaded(_)) => {}
                Ok(LoadOutcome::Skipped | LoadOutcome::Discarded) => break,
                // Partial results are still worth showing; the snapshot carries the error
                Err(e) if !feed.snapshot().entries.is_empty() => {
                    tracing::warn!(error = %e, "Stopping pagination");
                    break;
                }
                Err(e) => return Err(e).context("could not load artworks"),
            }
        }
        let favorites: HashSet<String> = self.favorites.favorite_ids().await.into_iter().collect();
        Ok(render::listing(&feed.snapshot(), &favorites))
    }

    /// Artwork card
    pub async fn show(&self, id: &str) -> Result<String> {
        let detail = self.details().artwork(id).await?;
        Ok(render::artwork_card(&detail))
    }

    /// Artist card
    pub async fn artist(&self, id: &str) -> Result<String> {
        let artist = self.details().artist(id).await?;
        Ok(render::artist_card(&artist))
    }

    /// Hydrated favorites list
    pub async fn list_favorites(&self) -> Result<String> {
        let hydration = HydrationController::new(self.gateway.clone(), self.favorites.clone());
        hydration.hydrate().await;
        let snapshot = hydration.snapshot();
        Ok(render::favorites(&snapshot.items, snapshot.unresolved))
    }

    /// Run a favorites mutation or query
    pub async fn fav(&self, action: FavAction) -> Result<String> {
        match action {
            FavAction::Add(id) => {
                self.favorites.add_favorite(&id).await?;
                Ok(format!("Added {id}\n"))
            }
            FavAction::Remove(id) => {
                self.favorites.remove_favorite(&id).await?;
                Ok(format!("Removed {id}\n"))
            }
            FavAction::Toggle(id) => {
                let mut marker = FavoriteMarker::new(self.favorites.clone(), id.as_str()).await;
                let now = marker.toggle().await?;
                Ok(format!(
                    "{id} is {} a favorite\n",
                    if now { "now" } else { "no longer" }
                ))
            }
            FavAction::Clear => {
                self.favorites.clear_favorites().await?;
                Ok("Cleared favorites\n".to_string())
            }
            FavAction::Ids => {
                let ids = self.favorites.try_favorite_ids().await?;
                let mut out = String::new();
                for id in ids {
                    out.push_str(&id);
                    out.push('\n');
                }
                Ok(out)
            }
        }
    }

    fn details(&self) -> DetailController {
        DetailController::new(
            self.gateway.clone(),
            self.favorites.clone(),
            self.artist_works_limit,
        )
    }
}
