//! Favorite Marker
//!
//! The favorited flag shown next to one artwork in a list. Each marker holds
//! its own bus subscription; when any screen changes the favorites set, every
//! marker is flagged stale and re-reads the store before it is shown again.
//!
//! ```ignore
//! let mut marker = FavoriteMarker::new(store.clone(), artwork.id.clone()).await;
//! render_heart(marker.is_favorite());
//!
//! // somewhere else: store.add_favorite(&artwork.id).await?;
//!
//! marker.changed().await;           // wakes after the publish
//! render_heart(marker.is_favorite()); // re-read from storage
//! ```

use tokio::sync::watch;

use super::store::FavoritesStore;
use crate::bus::Subscription;
use crate::storage::StorageError;

/// Per-item favorited flag kept in sync with the store
#[derive(Debug)]
pub struct FavoriteMarker {
    artwork_id: String,
    store: FavoritesStore,
    /// Last value read from the store
    favorited: bool,
    /// Bumped by the bus callback on every publish
    revisions: watch::Receiver<u64>,
    /// Held for the marker's lifetime; dropping the marker unsubscribes
    subscription: Subscription,
}

impl FavoriteMarker {
    /// Subscribe for `artwork_id` and read its current state
    pub async fn new(store: FavoritesStore, artwork_id: impl Into<String>) -> Self {
        let (tx, rx) = watch::channel(0u64);
        let subscription = store.bus().subscribe(move || {
            tx.send_modify(|rev| *rev = rev.wrapping_add(1));
        });

        let mut marker = Self {
            artwork_id: artwork_id.into(),
            store,
            favorited: false,
            revisions: rx,
            subscription,
        };
        marker.refresh().await;
        marker
    }

    /// Artwork this marker tracks
    #[must_use]
    pub fn artwork_id(&self) -> &str {
        &self.artwork_id
    }

    /// Last known state; may be stale until [`refresh`](Self::refresh)
    #[must_use]
    pub fn is_favorite(&self) -> bool {
        self.favorited
    }

    /// Whether a change was published since the last refresh
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.revisions.has_changed().unwrap_or(false)
    }

    /// Re-read the store and return the current state
    pub async fn refresh(&mut self) -> bool {
        self.revisions.mark_unchanged();
        self.favorited = self.store.is_favorite(&self.artwork_id).await;
        self.favorited
    }

    /// Wait for the next published change, then refresh
    ///
    /// Returns immediately if a change is already pending.
    pub async fn changed(&mut self) -> bool {
        if self.revisions.changed().await.is_err() {
            // The bus dropped our callback; nothing more will arrive
            return self.favorited;
        }
        self.refresh().await
    }

    /// Flip the artwork in the store
    ///
    /// The local flag is updated from the store's answer; other markers catch
    /// up through the bus. If another change was published while the toggle
    /// was in flight, the store is re-read instead.
    ///
    /// # Errors
    ///
    /// Surfaces storage failures; the local flag is left unchanged then.
    pub async fn toggle(&mut self) -> Result<bool, StorageError> {
        let before = *self.revisions.borrow();
        let now = self.store.toggle_favorite(&self.artwork_id).await?;

        // A successful toggle publishes exactly once
        if *self.revisions.borrow() == before.wrapping_add(1) {
            self.revisions.mark_unchanged();
            self.favorited = now;
            return Ok(now);
        }
        tracing::debug!(artwork_id = %self.artwork_id, "Concurrent change during toggle, re-reading");
        Ok(self.refresh().await)
    }

    /// Stop receiving changes
    pub fn detach(&self) {
        self.subscription.unsubscribe();
    }
}
