//! Listing Controller
//!
//! Incremental pagination over one feed (browse or search).
//!
//! # State Machine
//!
//! ```text
//!            load_next()                 full page
//!   Idle ───────────────► Fetching ───────────────► Idle
//!    ▲                       │
//!    │     transport error   │  short page (by remote entry count)
//!    └───────────────────────┤
//!                            └──────────────────► Exhausted
//! ```
//!
//! `load_next()` in `Fetching` or `Exhausted` is a no-op, which absorbs the
//! burst of scroll events a list emits near its end. A failed fetch leaves the
//! page counter where it was so the next call retries the same page.
//!
//! # Query Changes
//!
//! Every reset bumps a generation counter. A response stamped with an older
//! generation is dropped on arrival; the request itself is not aborted.
//!
//! The state lock is never held across an `.await`.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::gateway::{CatalogGateway, GatewayError, PageRequest};
use crate::model::Artwork;

/// Default number of artworks per page
pub const DEFAULT_PAGE_SIZE: u32 = 15;

/// Pagination phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListingPhase {
    /// Ready to fetch the next page
    Idle,
    /// A page request is in flight
    Fetching,
    /// The last page came back short; nothing more to fetch
    Exhausted,
}

/// Result of a [`ListingController::load_next`] call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived and this many artworks were appended
    Loaded(usize),
    /// No request was made (already fetching or exhausted)
    Skipped,
    /// The response belonged to a superseded query and was dropped
    Discarded,
}

/// One row of the list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingEntry {
    /// Display identity, unique per (artwork id, position)
    pub key: String,
    /// The artwork
    pub artwork: Artwork,
}

impl ListingEntry {
    fn new(artwork: Artwork, position: usize) -> Self {
        Self {
            key: format!("{}-{}", artwork.id, position),
            artwork,
        }
    }
}

/// Everything the surface needs to render the feed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingSnapshot {
    /// Accumulated rows in remote order
    pub entries: Vec<ListingEntry>,
    /// Whether a page request is in flight
    pub is_loading: bool,
    /// Whether another `load_next` may return more rows
    pub has_more: bool,
    /// Last fetch failure, cleared by the next success or reset
    pub error: Option<GatewayError>,
    /// Active search query; `None` for the browse feed
    pub query: Option<String>,
    /// Page the next `load_next` will request
    pub next_page: u32,
}

#[derive(Debug)]
struct ListingState {
    query: Option<String>,
    generation: u64,
    next_page: u32,
    phase: ListingPhase,
    entries: Vec<ListingEntry>,
    error: Option<GatewayError>,
}

impl ListingState {
    fn new(query: Option<String>) -> Self {
        Self {
            query,
            generation: 0,
            next_page: 1,
            phase: ListingPhase::Idle,
            entries: Vec::new(),
            error: None,
        }
    }

    fn reset(&mut self, query: Option<String>) -> u64 {
        self.generation += 1;
        self.query = query;
        self.next_page = 1;
        self.phase = ListingPhase::Idle;
        self.entries.clear();
        self.error = None;
        self.generation
    }
}

/// Paginated feed driver
pub struct ListingController {
    gateway: Arc<dyn CatalogGateway>,
    page_size: u32,
    state: Mutex<ListingState>,
}

impl ListingController {
    /// Controller over the unfiltered browse feed
    pub fn browse(gateway: Arc<dyn CatalogGateway>, page_size: u32) -> Self {
        Self::with_query(gateway, page_size, None)
    }

    /// Controller over search results, starting from an empty query
    pub fn search(gateway: Arc<dyn CatalogGateway>, page_size: u32) -> Self {
        Self::with_query(gateway, page_size, Some(String::new()))
    }

    fn with_query(gateway: Arc<dyn CatalogGateway>, page_size: u32, query: Option<String>) -> Self {
        Self {
            gateway,
            page_size: page_size.max(1),
            state: Mutex::new(ListingState::new(query)),
        }
    }

    /// Requested page size
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> ListingPhase {
        self.state.lock().phase
    }

    /// Current view state
    #[must_use]
    pub fn snapshot(&self) -> ListingSnapshot {
        let state = self.state.lock();
        ListingSnapshot {
            entries: state.entries.clone(),
            is_loading: state.phase == ListingPhase::Fetching,
            has_more: state.phase != ListingPhase::Exhausted,
            error: state.error.clone(),
            query: state.query.clone(),
            next_page: state.next_page,
        }
    }

    /// Fetch and append the next page
    ///
    /// # Errors
    ///
    /// Returns the gateway error of a failed fetch for the current query. The
    /// error also stays in the snapshot until the next success or reset.
    pub async fn load_next(&self) -> Result<LoadOutcome, GatewayError> {
        let (request, generation) = {
            let mut state = self.state.lock();
            if state.phase != ListingPhase::Idle {
                tracing::trace!(phase = ?state.phase, "load_next skipped");
                return Ok(LoadOutcome::Skipped);
            }
            state.phase = ListingPhase::Fetching;
            let request = PageRequest {
                query: state.query.clone(),
                page: state.next_page,
                page_size: self.page_size,
            };
            (request, state.generation)
        };

        tracing::debug!(
            gateway = self.gateway.name(),
            query = ?request.query,
            page = request.page,
            generation,
            "Fetching page"
        );
        let result = self.gateway.fetch_page(&request).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            tracing::debug!(
                stale = generation,
                current = state.generation,
                page = request.page,
                "Discarding response for superseded query"
            );
            return Ok(LoadOutcome::Discarded);
        }

        match result {
            Ok(page) => {
                let count = page.len();
                let exhausted = page.is_short(self.page_size);
                let start = state.entries.len();
                state.entries.extend(
                    page.items
                        .into_iter()
                        .enumerate()
                        .map(|(offset, artwork)| ListingEntry::new(artwork, start + offset)),
                );
                state.next_page += 1;
                state.error = None;
                state.phase = if exhausted {
                    ListingPhase::Exhausted
                } else {
                    ListingPhase::Idle
                };
                tracing::debug!(count, total = state.entries.len(), phase = ?state.phase, "Page appended");
                Ok(LoadOutcome::Loaded(count))
            }
            Err(e) => {
                tracing::warn!(error = %e, page = request.page, "Page fetch failed");
                state.phase = ListingPhase::Idle;
                state.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Switch to `query` and fetch its first page
    ///
    /// Results of the previous query, including any still in flight, are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the first page fails.
    pub async fn set_query(&self, query: impl Into<String>) -> Result<LoadOutcome, GatewayError> {
        let query = query.into();
        let generation = self.state.lock().reset(Some(query.clone()));
        tracing::debug!(query = %query, generation, "Query changed");
        self.load_next().await
    }

    /// Start the current feed over from page 1
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the first page fails.
    pub async fn refresh(&self) -> Result<LoadOutcome, GatewayError> {
        {
            let mut state = self.state.lock();
            let query = state.query.clone();
            state.reset(query);
        }
        self.load_next().await
    }
}
