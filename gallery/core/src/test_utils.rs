//! Test Utilities
//!
//! Scripted stand-ins for the remote catalog and for durable storage, so the
//! controllers can be exercised without network access.
//!
//! # Usage
//!
//! ```ignore
//! use gallery_core::test_utils::{MockGateway, numbered_artworks};
//!
//! let gateway = MockGateway::new()
//!     .with_browse_pages(vec![numbered_artworks(1, 15), numbered_artworks(16, 7)]);
//!
//! // Hold "cat" responses until the test releases them
//! gateway.hold_search("cat");
//! // ... trigger a fetch ...
//! gateway.release_search("cat");
//!
//! // Detail lookups can be held per id the same way
//! gateway.hold_detail("42");
//! gateway.release_detail("42");
//!
//! assert_eq!(gateway.page_requests().len(), 1);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::gateway::{ArtworkPage, CatalogGateway, GatewayError, PageRequest, Resource};
use crate::model::{Artist, Artwork};
use crate::storage::{KeyValueStore, MemoryStore, StorageError};

// ============================================================================
// Fixtures
// ============================================================================

/// Artworks with ids `start..start + count` and titles "Artwork {id}"
#[must_use]
pub fn numbered_artworks(start: u32, count: u32) -> Vec<Artwork> {
    (start..start + count)
        .map(|n| Artwork::new(n.to_string(), format!("Artwork {n}")))
        .collect()
}

/// Artworks with the given ids, titled after a feed label
#[must_use]
pub fn labelled_artworks(label: &str, ids: &[&str]) -> Vec<Artwork> {
    ids.iter()
        .map(|id| Artwork::new(*id, format!("{label} {id}")))
        .collect()
}

// ============================================================================
// Mock Gateway
// ============================================================================

/// Feed key: `None` is the browse feed, `Some(q)` a search query
type FeedKey = Option<String>;

#[derive(Default)]
struct MockState {
    feeds: HashMap<FeedKey, Vec<ArtworkPage>>,
    /// One-shot failures consumed in order per (feed, page)
    failures: HashMap<(FeedKey, u32), VecDeque<GatewayError>>,
    details: HashMap<String, Result<Artwork, GatewayError>>,
    artists: HashMap<String, Result<Artist, GatewayError>>,
    artist_titles: HashMap<String, Result<Vec<String>, GatewayError>>,
    gates: HashMap<FeedKey, Arc<Notify>>,
    detail_gates: HashMap<String, Arc<Notify>>,
    page_requests: Vec<PageRequest>,
    detail_requests: Vec<String>,
}

/// Scripted [`CatalogGateway`]
///
/// Pages are served from per-feed scripts (page `n` is entry `n - 1`, past the
/// end is empty). An empty search query falls back to the browse script when
/// no script exists for `""`. Unknown detail ids are `NotFound`.
#[derive(Default)]
pub struct MockGateway {
    state: Mutex<MockState>,
}

impl MockGateway {
    /// Gateway with no scripted data
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the browse feed
    #[must_use]
    pub fn with_browse_pages(self, pages: Vec<Vec<Artwork>>) -> Self {
        self.with_browse_page_script(pages.into_iter().map(ArtworkPage::from).collect())
    }

    /// Script the browse feed with explicit remote entry counts
    #[must_use]
    pub fn with_browse_page_script(self, pages: Vec<ArtworkPage>) -> Self {
        self.state.lock().feeds.insert(None, pages);
        self
    }

    /// Script a search feed
    #[must_use]
    pub fn with_search_pages(self, query: &str, pages: Vec<Vec<Artwork>>) -> Self {
        self.state.lock().feeds.insert(
            Some(query.to_string()),
            pages.into_iter().map(ArtworkPage::from).collect(),
        );
        self
    }

    /// Fail the next request for a browse page once
    #[must_use]
    pub fn with_browse_failure(self, page: u32, error: GatewayError) -> Self {
        self.push_failure(None, page, error);
        self
    }

    /// Fail the next request for a search page once
    #[must_use]
    pub fn with_search_failure(self, query: &str, page: u32, error: GatewayError) -> Self {
        self.push_failure(Some(query.to_string()), page, error);
        self
    }

    /// Make `artwork` resolvable by id
    #[must_use]
    pub fn with_detail(self, artwork: Artwork) -> Self {
        self.state
            .lock()
            .details
            .insert(artwork.id.clone(), Ok(artwork));
        self
    }

    /// Make a detail lookup fail with `error`
    #[must_use]
    pub fn with_detail_error(self, id: &str, error: GatewayError) -> Self {
        self.state.lock().details.insert(id.to_string(), Err(error));
        self
    }

    /// Make `artist` resolvable by id
    #[must_use]
    pub fn with_artist(self, artist: Artist) -> Self {
        self.state
            .lock()
            .artists
            .insert(artist.id.clone(), Ok(artist));
        self
    }

    /// Script the titles attributed to an artist
    #[must_use]
    pub fn with_artist_titles(
        self,
        artist_id: &str,
        titles: Result<Vec<String>, GatewayError>,
    ) -> Self {
        self.state
            .lock()
            .artist_titles
            .insert(artist_id.to_string(), titles);
        self
    }

    fn push_failure(&self, feed: FeedKey, page: u32, error: GatewayError) {
        self.state
            .lock()
            .failures
            .entry((feed, page))
            .or_default()
            .push_back(error);
    }

    fn hold(&self, feed: FeedKey) {
        self.state
            .lock()
            .gates
            .insert(feed, Arc::new(Notify::new()));
    }

    fn release(&self, feed: &FeedKey) {
        let gate = self.state.lock().gates.remove(feed);
        if let Some(gate) = gate {
            gate.notify_waiters();
            // Stores a permit if a request has not reached the gate yet
            gate.notify_one();
        }
    }

    /// Hold browse responses until [`release_browse`](Self::release_browse)
    pub fn hold_browse(&self) {
        self.hold(None);
    }

    /// Let held browse responses through
    pub fn release_browse(&self) {
        self.release(&None);
    }

    /// Hold responses for `query` until [`release_search`](Self::release_search)
    pub fn hold_search(&self, query: &str) {
        self.hold(Some(query.to_string()));
    }

    /// Let held responses for `query` through
    pub fn release_search(&self, query: &str) {
        self.release(&Some(query.to_string()));
    }

    /// Hold detail responses for `id` until [`release_detail`](Self::release_detail)
    pub fn hold_detail(&self, id: &str) {
        self.state
            .lock()
            .detail_gates
            .insert(id.to_string(), Arc::new(Notify::new()));
    }

    /// Let held detail responses for `id` through
    pub fn release_detail(&self, id: &str) {
        let gate = self.state.lock().detail_gates.remove(id);
        if let Some(gate) = gate {
            gate.notify_waiters();
            gate.notify_one();
        }
    }

    /// Every page request received, in arrival order
    #[must_use]
    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.state.lock().page_requests.clone()
    }

    /// Artwork ids of every detail lookup received, in arrival order
    #[must_use]
    pub fn detail_requests(&self) -> Vec<String> {
        self.state.lock().detail_requests.clone()
    }

    /// Number of artwork detail lookups received
    #[must_use]
    pub fn detail_calls(&self) -> usize {
        self.state.lock().detail_requests.len()
    }

    async fn serve(&self, request: PageRequest) -> Result<ArtworkPage, GatewayError> {
        let gate = {
            let mut state = self.state.lock();
            state.page_requests.push(request.clone());
            state.gates.get(&request.query).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state.lock();
        let key = (request.query.clone(), request.page);
        if let Some(error) = state.failures.get_mut(&key).and_then(VecDeque::pop_front) {
            return Err(error);
        }

        let feed = match request.query.as_deref() {
            Some("") if !state.feeds.contains_key(&Some(String::new())) => state.feeds.get(&None),
            _ => state.feeds.get(&request.query),
        };
        let index = request.page.saturating_sub(1) as usize;
        Ok(feed
            .and_then(|pages| pages.get(index))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl CatalogGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_artworks(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<ArtworkPage, GatewayError> {
        self.serve(PageRequest::browse(page, page_size)).await
    }

    async fn search_artworks(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ArtworkPage, GatewayError> {
        self.serve(PageRequest::search(query, page, page_size))
            .await
    }

    async fn get_artwork_detail(&self, id: &str) -> Result<Artwork, GatewayError> {
        let gate = {
            let mut state = self.state.lock();
            state.detail_requests.push(id.to_string());
            state.detail_gates.get(id).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.state
            .lock()
            .details
            .get(id)
            .cloned()
            .unwrap_or_else(|| Err(GatewayError::not_found(Resource::Artwork, id)))
    }

    async fn get_artist_detail(&self, id: &str) -> Result<Artist, GatewayError> {
        self.state
            .lock()
            .artists
            .get(id)
            .cloned()
            .unwrap_or_else(|| Err(GatewayError::not_found(Resource::Artist, id)))
    }

    async fn artist_artwork_titles(
        &self,
        artist_id: &str,
        limit: u32,
    ) -> Result<Vec<String>, GatewayError> {
        let titles = self
            .state
            .lock()
            .artist_titles
            .get(artist_id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))?;
        Ok(titles.into_iter().take(limit as usize).collect())
    }
}

// ============================================================================
// Flaky Storage
// ============================================================================

/// [`MemoryStore`] with switchable read and write failures
#[derive(Clone, Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    /// Healthy store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make reads fail (or succeed again)
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make writes fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected read failure".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected write failure".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected write failure".to_string()));
        }
        self.inner.remove(key).await
    }
}
