//! Favorites Hydration
//!
//! Turns the persisted id list into full artwork records for the favorites
//! view. One detail request is issued per id, all concurrently; the call
//! returns once every request has settled.
//!
//! Ids that fail to resolve (removed upstream, transport errors) are logged
//! and left out. A single vanished artwork must never hide the rest of the
//! user's favorites.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;

use super::store::FavoritesStore;
use crate::gateway::CatalogGateway;
use crate::model::Artwork;

/// What the favorites view renders
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HydrationSnapshot {
    /// Resolved favorites in persisted order
    pub items: Vec<Artwork>,
    /// Whether a hydration is in flight
    pub is_loading: bool,
    /// Ids that failed to resolve on the last completed pass
    pub unresolved: usize,
}

#[derive(Default)]
struct HydrationState {
    snapshot: HydrationSnapshot,
    in_flight: usize,
}

/// Resolves persisted favorites into artwork records
pub struct HydrationController {
    gateway: Arc<dyn CatalogGateway>,
    store: FavoritesStore,
    state: Mutex<HydrationState>,
    /// Tags each pass; only the newest pass may publish its items
    generation: AtomicU64,
}

impl HydrationController {
    /// Create a controller over `gateway` and `store`
    pub fn new(gateway: Arc<dyn CatalogGateway>, store: FavoritesStore) -> Self {
        Self {
            gateway,
            store,
            state: Mutex::new(HydrationState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Resolve every persisted favorite
    ///
    /// Safe to call on every activation of the favorites view. Each call
    /// re-reads storage, so additions and removals since the last call are
    /// reflected. Storage read failures count as "no favorites".
    pub async fn hydrate(&self) -> Vec<Artwork> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock();
            state.in_flight += 1;
            state.snapshot.is_loading = true;
        }

        let ids = self.store.favorite_ids().await;
        tracing::debug!(count = ids.len(), generation, "Hydrating favorites");

        let lookups = ids.iter().map(|id| self.gateway.get_artwork_detail(id));
        let results = join_all(lookups).await;

        let mut items = Vec::with_capacity(ids.len());
        let mut unresolved = 0;
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(artwork) => items.push(artwork),
                Err(e) => {
                    unresolved += 1;
                    tracing::warn!(id = %id, error = %e, "Dropping favorite that failed to resolve");
                }
            }
        }

        {
            let mut state = self.state.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.snapshot.is_loading = state.in_flight > 0;
            if generation == self.generation.load(Ordering::SeqCst) {
                state.snapshot.items = items.clone();
                state.snapshot.unresolved = unresolved;
            }
        }

        tracing::info!(
            resolved = items.len(),
            unresolved,
            "Favorites hydrated"
        );
        items
    }

    /// Current view state
    #[must_use]
    pub fn snapshot(&self) -> HydrationSnapshot {
        self.state.lock().snapshot.clone()
    }
}
