//! Paginated Listings
//!
//! Drives the browse feed and free-text search for list surfaces.
//!
//! # Usage
//!
//! ```ignore
//! use gallery_core::listing::ListingController;
//!
//! let search = ListingController::search(gateway.clone(), 15);
//! search.set_query("monet").await?;
//!
//! // On every "near the end of the list" event:
//! search.load_next().await?;
//! render(search.snapshot());
//! ```

mod controller;

pub use controller::{
    ListingController, ListingEntry, ListingPhase, ListingSnapshot, LoadOutcome,
    DEFAULT_PAGE_SIZE,
};
