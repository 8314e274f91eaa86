//! Remote Catalog Gateway
//!
//! Typed access to the remote artwork catalog through a common trait.
//!
//! # Available Gateways
//!
//! - **ArticGateway**: Art Institute of Chicago public API (default)
//! - **MockGateway** (`crate::test_utils`): scripted responses for tests
//!
//! # Usage
//!
//! ```ignore
//! use gallery_core::gateway::{ArticGateway, CatalogGateway, ImageTemplate};
//!
//! let gateway = ArticGateway::new(DEFAULT_API_URL, ImageTemplate::default(), None)?;
//! let page = gateway.list_artworks(1, 15).await?;
//! let more = !page.is_short(15);
//! ```

mod artic;
pub mod normalize;
mod traits;

pub use artic::{ArticGateway, DEFAULT_API_URL, DEFAULT_SEARCH_FIELDS};
pub use normalize::ImageTemplate;
pub use traits::{ArtworkPage, CatalogGateway, GatewayError, PageRequest, Resource};
