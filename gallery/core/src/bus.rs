//! Change Notification Bus
//!
//! In-process publish/subscribe used to tell every on-screen item that the
//! favorites set changed. The bus carries no payload: subscribers are
//! expected to re-read whatever state they display.
//!
//! # Architecture
//!
//! ```text
//!   FavoritesStore ──publish()──► ChangeBus
//!                                   │
//!                ┌──────────────────┼──────────────────┐
//!                ▼                  ▼                  ▼
//!          list item #1       list item #2       favorites view
//!         (Subscription)     (Subscription)      (Subscription)
//! ```
//!
//! The bus is an ordinary value. Tests build isolated instances; the
//! application composition root owns the one shared by the whole process.
//!
//! # Failure Isolation
//!
//! A panicking callback is caught, logged and counted; the remaining callbacks
//! still run.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Identifier of one registration on a bus
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

struct BusInner {
    /// Keyed by a monotonic id so iteration order is subscription order
    subscribers: Mutex<BTreeMap<SubscriberId, Callback>>,
    next_id: AtomicU64,
}

/// Outcome of a [`ChangeBus::publish`] call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Callbacks that returned normally
    pub delivered: usize,
    /// Callbacks that panicked
    pub failed: Vec<SubscriberId>,
}

impl PublishReport {
    /// Whether every callback returned normally
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Cloneable handle to a shared subscriber list
#[derive(Clone)]
pub struct ChangeBus {
    inner: Arc<BusInner>,
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl ChangeBus {
    /// Create a bus with no subscribers
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscribers: Mutex::new(BTreeMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register `callback`; it runs on every later [`publish`](Self::publish)
    ///
    /// The registration lasts until the returned [`Subscription`] is
    /// unsubscribed or dropped.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriberId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.subscribers.lock().insert(id, Arc::new(callback));
        tracing::trace!(subscriber = %id, "Subscribed to change bus");

        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Invoke every currently registered callback, in subscription order
    ///
    /// The subscriber list is snapshotted first, so callbacks may subscribe or
    /// unsubscribe without deadlocking; such changes apply to the next publish.
    pub fn publish(&self) -> PublishReport {
        let snapshot: Vec<(SubscriberId, Callback)> = {
            let subscribers = self.inner.subscribers.lock();
            subscribers
                .iter()
                .map(|(id, cb)| (*id, Arc::clone(cb)))
                .collect()
        };

        let mut report = PublishReport::default();
        for (id, callback) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| callback())) {
                Ok(()) => report.delivered += 1,
                Err(_) => {
                    tracing::warn!(subscriber = %id, "Change subscriber panicked");
                    report.failed.push(id);
                }
            }
        }

        tracing::debug!(
            delivered = report.delivered,
            failed = report.failed.len(),
            "Change published"
        );
        report
    }

    /// Number of live registrations
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

/// Revocable registration on a [`ChangeBus`]
///
/// Owned by whatever displays the subscribed state. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    bus: Weak<BusInner>,
}

impl Subscription {
    /// Identifier of this registration
    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Remove exactly this callback; later calls do nothing
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.bus.upgrade() {
            if inner.subscribers.lock().remove(&self.id).is_some() {
                tracing::trace!(subscriber = %self.id, "Unsubscribed from change bus");
            }
        }
    }

    /// Whether the callback is still registered
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.bus
            .upgrade()
            .is_some_and(|inner| inner.subscribers.lock().contains_key(&self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
