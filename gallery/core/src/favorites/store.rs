//! Favorites Store
//!
//! Owns the persisted set of favorited artwork ids. The set is stored under a
//! single key as a JSON array of strings and read back on every query, so
//! every handle and every screen sees the same durable state.
//!
//! # Ordering Guarantee
//!
//! Each mutation finishes its durable write before publishing on the
//! [`ChangeBus`]. A subscriber that re-reads the store from its callback
//! therefore always observes the new value.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::bus::ChangeBus;
use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the favorites array
pub const FAVORITES_KEY: &str = "@favorite_items";

/// Persisted favorites with change notification
///
/// Cheap to clone; clones share the backing store, bus and write lock.
#[derive(Clone)]
pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
    bus: ChangeBus,
    /// Serializes read-modify-write so concurrent toggles cannot lose updates
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("storage", &self.storage.name())
            .field("bus", &self.bus)
            .finish()
    }
}

impl FavoritesStore {
    /// Create a store over `storage` that announces changes on `bus`
    pub fn new(storage: Arc<dyn KeyValueStore>, bus: ChangeBus) -> Self {
        Self {
            storage,
            bus,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The bus this store publishes on
    #[must_use]
    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    /// Read and decode the persisted ids
    ///
    /// A missing key is an empty set. Duplicate ids in the stored array are
    /// collapsed, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backend fails or the value is not a
    /// JSON array of strings.
    pub async fn try_favorite_ids(&self) -> Result<Vec<String>, StorageError> {
        let Some(raw) = self.storage.get(FAVORITES_KEY).await? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            key: FAVORITES_KEY.to_string(),
            reason: e.to_string(),
        })?;

        let mut unique: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Ok(unique)
    }

    /// Persisted ids, or an empty list if storage cannot be read
    pub async fn favorite_ids(&self) -> Vec<String> {
        match self.try_favorite_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "Favorites unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Whether `id` is favorited; storage failures read as `false`
    pub async fn is_favorite(&self, id: &str) -> bool {
        match self.try_favorite_ids().await {
            Ok(ids) => ids.iter().any(|fav| fav == id),
            Err(e) => {
                tracing::warn!(error = %e, id, "Favorites unreadable, reporting not favorited");
                false
            }
        }
    }

    /// Add `id`; adding a present id changes nothing but still notifies
    ///
    /// # Errors
    ///
    /// Surfaces storage read or write failures; nothing is published then.
    pub async fn add_favorite(&self, id: &str) -> Result<(), StorageError> {
        self.mutate("add", |ids| {
            if !ids.iter().any(|fav| fav == id) {
                ids.push(id.to_string());
            }
        })
        .await
        .map(|_| ())
    }

    /// Remove `id`; removing an absent id changes nothing but still notifies
    ///
    /// # Errors
    ///
    /// Surfaces storage read or write failures; nothing is published then.
    pub async fn remove_favorite(&self, id: &str) -> Result<(), StorageError> {
        self.mutate("remove", |ids| ids.retain(|fav| fav != id))
            .await
            .map(|_| ())
    }

    /// Flip `id` and return whether it is now favorited
    ///
    /// # Errors
    ///
    /// Surfaces storage read or write failures; nothing is published then.
    pub async fn toggle_favorite(&self, id: &str) -> Result<bool, StorageError> {
        let ids = self
            .mutate("toggle", |ids| {
                if ids.iter().any(|fav| fav == id) {
                    ids.retain(|fav| fav != id);
                } else {
                    ids.push(id.to_string());
                }
            })
            .await?;
        Ok(ids.iter().any(|fav| fav == id))
    }

    /// Reset to an empty set; publishes once
    ///
    /// Does not read the previous value, so it also recovers a corrupt store.
    ///
    /// # Errors
    ///
    /// Surfaces storage write failures; nothing is published then.
    pub async fn clear_favorites(&self) -> Result<(), StorageError> {
        let guard = self.write_lock.lock().await;
        self.write(&[]).await?;
        drop(guard);

        tracing::info!("Favorites cleared");
        self.bus.publish();
        Ok(())
    }

    async fn write(&self, ids: &[String]) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(ids)?;
        self.storage.set(FAVORITES_KEY, encoded).await
    }

    /// Read, apply `change`, write back, then publish
    async fn mutate<F>(&self, operation: &str, change: F) -> Result<Vec<String>, StorageError>
    where
        F: FnOnce(&mut Vec<String>),
    {
        let ids = {
            let _guard = self.write_lock.lock().await;
            let mut ids = self.try_favorite_ids().await?;
            change(&mut ids);
            self.write(&ids).await?;
            ids
        };

        tracing::debug!(operation, count = ids.len(), "Favorites updated");
        self.bus.publish();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::test_utils::FlakyStore;
    use futures::FutureExt;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store() -> (FavoritesStore, MemoryStore, ChangeBus) {
        let memory = MemoryStore::new();
        let bus = ChangeBus::new();
        let store = FavoritesStore::new(Arc::new(memory.clone()), bus.clone());
        (store, memory, bus)
    }

    async fn persisted(memory: &MemoryStore) -> Option<String> {
        memory.get(FAVORITES_KEY).await.unwrap()
    }

    #[tokio::test]
    async fn test_empty_on_first_use() {
        let (store, memory, _bus) = store();
        assert!(store.favorite_ids().await.is_empty());
        assert!(!store.is_favorite("1").await);
        assert_eq!(persisted(&memory).await, None);
    }

    #[tokio::test]
    async fn test_add_twice_persists_once() {
        let (store, memory, _bus) = store();
        store.add_favorite("42").await.unwrap();
        store.add_favorite("42").await.unwrap();

        assert!(store.is_favorite("42").await);
        assert_eq!(persisted(&memory).await.as_deref(), Some(r#"["42"]"#));
    }

    #[tokio::test]
    async fn test_last_operation_wins() {
        let (store, _memory, _bus) = store();
        store.add_favorite("1").await.unwrap();
        store.remove_favorite("1").await.unwrap();
        store.add_favorite("1").await.unwrap();
        assert!(store.is_favorite("1").await);

        store.add_favorite("2").await.unwrap();
        store.remove_favorite("2").await.unwrap();
        assert!(!store.is_favorite("2").await);

        store.remove_favorite("never-added").await.unwrap();
        assert_eq!(store.favorite_ids().await, vec!["1".to_string()]);
    }

    #[tokio::test]
    async fn test_insertion_order_is_kept() {
        let (store, _memory, _bus) = store();
        for id in ["3", "1", "2", "1"] {
            store.add_favorite(id).await.unwrap();
        }
        assert_eq!(store.favorite_ids().await, vec!["3", "1", "2"]);
    }

    #[tokio::test]
    async fn test_clear_resets_everything() {
        let (store, memory, _bus) = store();
        for id in ["a", "b", "c"] {
            store.add_favorite(id).await.unwrap();
        }
        store.clear_favorites().await.unwrap();

        for id in ["a", "b", "c"] {
            assert!(!store.is_favorite(id).await);
        }
        assert_eq!(persisted(&memory).await.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_toggle_flips_state() {
        let (store, _memory, _bus) = store();
        assert!(store.toggle_favorite("7").await.unwrap());
        assert!(store.is_favorite("7").await);
        assert!(!store.toggle_favorite("7").await.unwrap());
        assert!(!store.is_favorite("7").await);
    }

    #[tokio::test]
    async fn test_every_mutation_publishes_even_without_change() {
        let (store, _memory, bus) = store();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let _sub = bus.subscribe(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        store.add_favorite("1").await.unwrap();
        store.add_favorite("1").await.unwrap();
        store.remove_favorite("2").await.unwrap();
        store.clear_favorites().await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_write_lands_before_notification() {
        let (store, memory, bus) = store();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let seen_in_cb = seen.clone();
        let memory_in_cb = memory.clone();
        let _sub = bus.subscribe(move || {
            // MemoryStore resolves immediately, so the callback can read it inline
            let value = memory_in_cb
                .get(FAVORITES_KEY)
                .now_or_never()
                .expect("memory store is ready")
                .unwrap();
            seen_in_cb.lock().push(value);
        });

        store.add_favorite("9").await.unwrap();
        assert_eq!(*seen.lock(), vec![Some(r#"["9"]"#.to_string())]);
    }

    #[tokio::test]
    async fn test_duplicates_in_storage_are_collapsed() {
        let (store, memory, _bus) = store();
        memory
            .set(FAVORITES_KEY, r#"["1","2","1"]"#.to_string())
            .await
            .unwrap();
        assert_eq!(store.favorite_ids().await, vec!["1", "2"]);

        store.remove_favorite("1").await.unwrap();
        assert_eq!(persisted(&memory).await.as_deref(), Some(r#"["2"]"#));
    }

    #[tokio::test]
    async fn test_read_failure_fails_open() {
        let flaky = FlakyStore::new();
        let bus = ChangeBus::new();
        let store = FavoritesStore::new(Arc::new(flaky.clone()), bus);
        store.add_favorite("1").await.unwrap();

        flaky.fail_reads(true);
        assert!(!store.is_favorite("1").await);
        assert!(store.favorite_ids().await.is_empty());
        assert!(store.try_favorite_ids().await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_value_fails_open_and_clear_recovers() {
        let (store, memory, _bus) = store();
        memory
            .set(FAVORITES_KEY, "{\"not\": \"an array\"}".to_string())
            .await
            .unwrap();

        assert!(!store.is_favorite("1").await);
        assert!(matches!(
            store.try_favorite_ids().await,
            Err(StorageError::Corrupt { .. })
        ));
        assert!(store.add_favorite("1").await.is_err());

        store.clear_favorites().await.unwrap();
        store.add_favorite("1").await.unwrap();
        assert!(store.is_favorite("1").await);
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_and_does_not_publish() {
        let flaky = FlakyStore::new();
        let bus = ChangeBus::new();
        let store = FavoritesStore::new(Arc::new(flaky.clone()), bus.clone());
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let _sub = bus.subscribe(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        flaky.fail_writes(true);
        assert!(store.add_favorite("1").await.is_err());
        assert!(store.clear_favorites().await.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        flaky.fail_writes(false);
        assert!(!store.is_favorite("1").await);
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let (store, _memory, _bus) = store();
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.add_favorite(&i.to_string()).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.favorite_ids().await.len(), 20);
    }
}
