//! Favorites
//!
//! Locally persisted favorites and the views built on them:
//!
//! - [`FavoritesStore`]: durable id set with change notification
//! - [`FavoriteMarker`]: one list item's favorited flag, kept in sync via the bus
//! - [`HydrationController`]: resolves persisted ids into full records

mod hydration;
mod marker;
mod store;

pub use hydration::{HydrationController, HydrationSnapshot};
pub use marker::FavoriteMarker;
pub use store::{FavoritesStore, FAVORITES_KEY};
