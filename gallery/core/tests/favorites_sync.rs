//! Favorites integration tests
//!
//! Store, bus, markers and hydration wired together the way the composition
//! root wires them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gallery_core::test_utils::MockGateway;
use gallery_core::{
    Artwork, ChangeBus, FavoriteMarker, FavoritesStore, FileStore, HydrationController,
    KeyValueStore, MemoryStore, FAVORITES_KEY,
};
use pretty_assertions::assert_eq;

fn memory_store() -> (FavoritesStore, Arc<MemoryStore>) {
    let memory = Arc::new(MemoryStore::new());
    (FavoritesStore::new(memory.clone(), ChangeBus::new()), memory)
}

#[tokio::test]
async fn test_is_favorite_reflects_last_operation() {
    let (store, _) = memory_store();
    let ops = [
        (true, "1"),
        (true, "2"),
        (false, "1"),
        (true, "3"),
        (true, "1"),
        (false, "2"),
        (false, "4"),
        (true, "3"),
    ];

    let mut expected: HashMap<&str, bool> = HashMap::new();
    for (add, id) in ops {
        if add {
            store.add_favorite(id).await.unwrap();
        } else {
            store.remove_favorite(id).await.unwrap();
        }
        expected.insert(id, add);

        for (id, favorited) in &expected {
            assert_eq!(store.is_favorite(id).await, *favorited, "id {id}");
        }
    }
    assert_eq!(store.favorite_ids().await, vec!["3", "1"]);
}

#[tokio::test]
async fn test_clear_unfavorites_everything() {
    let (store, memory) = memory_store();
    for id in ["1", "2", "3"] {
        store.add_favorite(id).await.unwrap();
    }

    store.clear_favorites().await.unwrap();

    for id in ["1", "2", "3"] {
        assert!(!store.is_favorite(id).await);
    }
    assert_eq!(memory.get(FAVORITES_KEY).await.unwrap().as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_double_add_persists_once() {
    let (store, memory) = memory_store();
    store.add_favorite("42").await.unwrap();
    store.add_favorite("42").await.unwrap();

    assert!(store.is_favorite("42").await);
    let raw = memory.get(FAVORITES_KEY).await.unwrap().unwrap();
    let ids: Vec<String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(ids, vec!["42"]);
}

#[tokio::test]
async fn test_publish_reaches_current_subscribers_only() {
    let bus = ChangeBus::new();
    let store = FavoritesStore::new(Arc::new(MemoryStore::new()), bus.clone());

    let kept = Arc::new(AtomicUsize::new(0));
    let dropped = Arc::new(AtomicUsize::new(0));
    let _kept_sub = bus.subscribe({
        let kept = kept.clone();
        move || {
            kept.fetch_add(1, Ordering::SeqCst);
        }
    });
    let dropped_sub = bus.subscribe({
        let dropped = dropped.clone();
        move || {
            dropped.fetch_add(1, Ordering::SeqCst);
        }
    });

    store.add_favorite("1").await.unwrap();
    drop(dropped_sub);
    store.remove_favorite("1").await.unwrap();
    store.clear_favorites().await.unwrap();

    assert_eq!(kept.load(Ordering::SeqCst), 3);
    assert_eq!(dropped.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_markers_converge_across_handles() {
    let (store, _) = memory_store();
    let other_handle = store.clone();

    let mut in_list = FavoriteMarker::new(store.clone(), "7").await;
    let mut in_detail = FavoriteMarker::new(store.clone(), "7").await;
    let mut unrelated = FavoriteMarker::new(store, "8").await;

    other_handle.add_favorite("7").await.unwrap();
    assert!(in_list.changed().await);
    assert!(in_detail.changed().await);
    assert!(!unrelated.changed().await);

    assert!(!in_detail.toggle().await.unwrap());
    assert!(in_list.is_stale());
    assert!(!in_list.refresh().await);
}

#[tokio::test]
async fn test_hydration_skips_vanished_artwork() {
    let gateway = Arc::new(
        MockGateway::new()
            .with_detail(Artwork::new("1", "Nighthawks"))
            .with_detail(Artwork::new("3", "American Gothic")),
    );
    let (store, _) = memory_store();
    for id in ["1", "2", "3"] {
        store.add_favorite(id).await.unwrap();
    }

    let hydration = HydrationController::new(gateway.clone(), store.clone());
    let mut ids: Vec<String> = hydration.hydrate().await.into_iter().map(|a| a.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(gateway.detail_calls(), 3);

    store.remove_favorite("1").await.unwrap();
    let titles: Vec<String> = hydration.hydrate().await.into_iter().map(|a| a.title).collect();
    assert_eq!(titles, vec!["American Gothic"]);
    assert!(!hydration.snapshot().is_loading);
}

#[tokio::test]
async fn test_slow_favorite_does_not_block_the_others() {
    let gateway = Arc::new(
        MockGateway::new()
            .with_detail(Artwork::new("1", "Nighthawks"))
            .with_detail(Artwork::new("2", "The Bedroom"))
            .with_detail(Artwork::new("3", "American Gothic")),
    );
    gateway.hold_detail("1");
    let (store, _) = memory_store();
    for id in ["1", "2", "3"] {
        store.add_favorite(id).await.unwrap();
    }
    let hydration = Arc::new(HydrationController::new(gateway.clone(), store));

    let pass = tokio::spawn({
        let hydration = hydration.clone();
        async move { hydration.hydrate().await }
    });

    let all_issued = async {
        while gateway.detail_calls() < 3 {
            tokio::task::yield_now().await;
        }
    };
    tokio::time::timeout(Duration::from_secs(5), all_issued)
        .await
        .expect("lookups for 2 and 3 should start while 1 is held");
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!pass.is_finished());
    assert!(hydration.snapshot().is_loading);

    gateway.release_detail("1");
    let ids: Vec<String> = pass.await.unwrap().into_iter().map(|a| a.id).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert!(!hydration.snapshot().is_loading);
}

#[tokio::test]
async fn test_file_backed_favorites_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gallery").join("storage.json");

    {
        let store = FavoritesStore::new(Arc::new(FileStore::new(&path)), ChangeBus::new());
        store.add_favorite("16568").await.unwrap();
        store.add_favorite("27992").await.unwrap();
        store.toggle_favorite("16568").await.unwrap();
    }

    let reopened = FavoritesStore::new(Arc::new(FileStore::new(&path)), ChangeBus::new());
    assert_eq!(reopened.favorite_ids().await, vec!["27992"]);
    assert!(reopened.is_favorite("27992").await);
}
