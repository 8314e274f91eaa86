//! Art Institute of Chicago Gateway
//!
//! [`CatalogGateway`] backed by the public AIC REST API.
//!
//! # Endpoints
//!
//! - `GET /artworks?limit&page` - browse feed
//! - `POST /artworks/search` - free-text search (`{q, limit, page, fields}`)
//! - `GET /artworks/{id}` - artwork detail
//! - `GET /artists/{id}` - artist detail
//!
//! Every response wraps its payload in a `data` field; pages also carry a
//! `pagination` block.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::normalize::{self, ImageTemplate};
use super::traits::{ArtworkPage, CatalogGateway, GatewayError, Resource};
use crate::config::GalleryConfig;
use crate::model::{Artist, Artwork};

/// Default API root
pub const DEFAULT_API_URL: &str = "https://api.artic.edu/api/v1";

/// Fields requested from the search endpoint
pub const DEFAULT_SEARCH_FIELDS: &[&str] = &[
    "id",
    "title",
    "image_id",
    "artist_id",
    "artist_title",
    "date_start",
    "date_end",
    "dimensions",
    "medium_display",
    "place_of_origin",
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Pagination {
    total_pages: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageEnvelope {
    data: Vec<Value>,
    pagination: Option<Pagination>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecordEnvelope {
    data: Option<Value>,
}

/// AIC catalog client
#[derive(Clone)]
pub struct ArticGateway {
    /// API root without trailing slash
    base_url: String,
    /// Image URL template
    images: ImageTemplate,
    /// Fields requested from search
    search_fields: Vec<String>,
    /// HTTP client
    http_client: reqwest::Client,
}

impl ArticGateway {
    /// Create a gateway against `base_url`
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        images: ImageTemplate,
        timeout: Option<Duration>,
    ) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("gallery/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| GatewayError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            images,
            search_fields: DEFAULT_SEARCH_FIELDS.iter().map(|f| (*f).to_string()).collect(),
            http_client,
        })
    }

    /// Create from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be built.
    pub fn from_config(config: &GalleryConfig) -> Result<Self, GatewayError> {
        let mut gateway = Self::new(
            config.api_url.clone(),
            config.images.clone(),
            config.request_timeout,
        )?;
        if !config.search_fields.is_empty() {
            gateway.search_fields = config.search_fields.clone();
        }
        Ok(gateway)
    }

    /// Replace the search field list
    #[must_use]
    pub fn with_search_fields(mut self, fields: Vec<String>) -> Self {
        self.search_fields = fields;
        self
    }

    fn artworks_url(&self) -> String {
        format!("{}/artworks", self.base_url)
    }

    fn search_url(&self) -> String {
        format!("{}/artworks/search", self.base_url)
    }

    fn artwork_url(&self, id: &str) -> String {
        format!("{}/artworks/{}", self.base_url, id)
    }

    fn artist_url(&self, id: &str) -> String {
        format!("{}/artists/{}", self.base_url, id)
    }

    fn search_body(&self, query: &str, page: u32, page_size: u32) -> Value {
        serde_json::json!({
            "q": query,
            "limit": page_size,
            "page": page,
            "fields": self.search_fields,
        })
    }

    /// Send a request, mapping connection failures and non-2xx statuses
    ///
    /// A 404 becomes `NotFound` when `missing` names the record looked up.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        missing: Option<(Resource, &str)>,
    ) -> Result<reqwest::Response, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some((resource, id)) = missing {
                return Err(GatewayError::not_found(resource, id));
            }
        }

        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::status(
            status.as_u16(),
            format!("catalog returned {status}: {}", body.trim()),
        ))
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::transport(format!("invalid catalog response: {e}")))
    }

    fn page_from(&self, envelope: PageEnvelope, page: u32) -> ArtworkPage {
        let past_end = envelope
            .pagination
            .and_then(|p| p.total_pages)
            .is_some_and(|total| page > total);
        if past_end {
            tracing::debug!(page, "Requested page is past the end of the catalog");
            return ArtworkPage::default();
        }
        normalize::artwork_page(envelope.data, &self.images)
    }
}

#[async_trait]
impl CatalogGateway for ArticGateway {
    fn name(&self) -> &'static str {
        "artic"
    }

    async fn list_artworks(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<ArtworkPage, GatewayError> {
        tracing::debug!(page, page_size, "Fetching browse page");
        let request = self
            .http_client
            .get(self.artworks_url())
            .query(&[("limit", page_size), ("page", page)]);

        let response = self.execute(request, None).await?;
        let envelope: PageEnvelope = Self::decode(response).await?;
        Ok(self.page_from(envelope, page))
    }

    async fn search_artworks(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ArtworkPage, GatewayError> {
        tracing::debug!(query, page, page_size, "Fetching search page");
        let request = self
            .http_client
            .post(self.search_url())
            .json(&self.search_body(query, page, page_size));

        let response = self.execute(request, None).await?;
        let envelope: PageEnvelope = Self::decode(response).await?;
        Ok(self.page_from(envelope, page))
    }

    async fn get_artwork_detail(&self, id: &str) -> Result<Artwork, GatewayError> {
        let request = self.http_client.get(self.artwork_url(id));
        let response = self.execute(request, Some((Resource::Artwork, id))).await?;
        let envelope: RecordEnvelope = Self::decode(response).await?;
        normalize::artwork_detail(id, envelope.data, &self.images)
    }

    async fn get_artist_detail(&self, id: &str) -> Result<Artist, GatewayError> {
        let request = self.http_client.get(self.artist_url(id));
        let response = self.execute(request, Some((Resource::Artist, id))).await?;
        let envelope: RecordEnvelope = Self::decode(response).await?;
        normalize::artist_detail(id, envelope.data)
    }

    async fn artist_artwork_titles(
        &self,
        artist_id: &str,
        limit: u32,
    ) -> Result<Vec<String>, GatewayError> {
        let body = serde_json::json!({
            "query": { "term": { "artist_id": artist_id } },
            "limit": limit,
            "fields": ["title"],
        });
        let request = self.http_client.post(self.search_url()).json(&body);

        let response = self.execute(request, None).await?;
        let envelope: PageEnvelope = Self::decode(response).await?;
        Ok(normalize::artwork_titles(&envelope.data))
    }
}
