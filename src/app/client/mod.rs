//! HTTP client for the course backend
//!
//! This module provides the client the organizer uses to reach its external
//! collaborators: the playlist lookup and the remote course store.
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: Core HTTP operations with rate limiting and retries
//! - `store`: the `PlaylistFetcher` and `RemoteStore` traits
//! - `wire`: JSON shapes of the backend endpoints

use async_trait::async_trait;
use reqwest::Method;
use url::Url;

use crate::app::models::{
    BulkImportResponse, CatalogItem, Chapter, ImportPayload, Lecture, PositionUpdate,
};
use crate::constants::api;
use crate::errors::{ConfigResult, FetchError, FetchResult, SyncError, SyncResult};

// Module declarations
pub mod config;
pub mod http;
pub mod store;
pub mod wire;

pub use config::ClientConfig;
pub use store::{PlaylistFetcher, RemoteStore};

use http::HttpHandler;
use wire::{PlaylistResponse, RemoteChapter, RemoteLecture};

/// Client for the course backend REST API
#[derive(Debug)]
pub struct ApiClient {
    http_handler: HttpHandler,
}

impl ApiClient {
    /// Creates a client with default configuration
    pub fn new() -> ConfigResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL, token or rate limit is invalid
    pub fn with_config(config: ClientConfig) -> ConfigResult<Self> {
        let client = config.build_http_client()?;
        let base_url = config.parsed_base_url()?;
        let http_handler =
            HttpHandler::new(client, base_url, config.rate_limit_rps, config.max_retries)?;

        tracing::info!("Created backend client for {}", http_handler.base_url());
        Ok(Self { http_handler })
    }

    /// Get the backend base URL
    pub fn base_url(&self) -> &Url {
        self.http_handler.base_url()
    }

    fn fetch_error(error: SyncError) -> FetchError {
        match error {
            SyncError::Status { status } => FetchError::Status { status },
            SyncError::InvalidResponse { reason } => FetchError::Malformed { reason },
            other => FetchError::Unreachable {
                message: other.to_string(),
            },
        }
    }
}

#[async_trait]
impl PlaylistFetcher for ApiClient {
    async fn fetch_playlist(&self, playlist_url: &str) -> FetchResult<Vec<CatalogItem>> {
        Url::parse(playlist_url).map_err(|e| FetchError::InvalidUrl {
            url: playlist_url.to_string(),
            error: e.to_string(),
        })?;

        let mut url = self
            .http_handler
            .endpoint(api::PLAYLIST_PATH)
            .map_err(Self::fetch_error)?;
        url.query_pairs_mut().append_pair("url", playlist_url);

        let response: PlaylistResponse = self
            .http_handler
            .get_json(url)
            .await
            .map_err(Self::fetch_error)?;
        let items = response.into_catalog_items();

        tracing::info!("Fetched {} playlist items from {}", items.len(), playlist_url);
        Ok(items)
    }
}

#[async_trait]
impl RemoteStore for ApiClient {
    async fn bulk_import(
        &self,
        scope_id: &str,
        payload: &[ImportPayload],
    ) -> SyncResult<BulkImportResponse> {
        let url = self
            .http_handler
            .course_endpoint(scope_id, api::BULK_IMPORT_SEGMENTS)?;
        self.http_handler
            .send_json(Method::POST, url, payload)
            .await
    }

    async fn set_positions(&self, scope_id: &str, updates: &[PositionUpdate]) -> SyncResult<()> {
        let url = self
            .http_handler
            .course_endpoint(scope_id, api::POSITIONS_SEGMENTS)?;
        self.http_handler
            .send_json_no_content(Method::PUT, url, updates)
            .await
    }

    async fn list_chapters(&self, scope_id: &str) -> SyncResult<Vec<Chapter>> {
        let url = self
            .http_handler
            .course_endpoint(scope_id, api::CHAPTERS_SEGMENTS)?;
        let chapters: Vec<RemoteChapter> = self.http_handler.get_json(url).await?;
        Ok(chapters.into_iter().map(Chapter::from).collect())
    }

    async fn list_unique_tags(&self) -> SyncResult<Vec<String>> {
        let url = self.http_handler.endpoint(api::TAGS_PATH)?;
        self.http_handler.get_json(url).await
    }

    async fn search_lectures(&self, query: &str) -> SyncResult<Vec<Lecture>> {
        let mut url = self.http_handler.endpoint(api::LECTURES_PATH)?;
        if !query.is_empty() {
            url.set_query(Some(query));
        }
        let lectures: Vec<RemoteLecture> = self.http_handler.get_json(url).await?;
        Ok(lectures.into_iter().map(Lecture::from).collect())
    }
}
