//! Interfaces of the external collaborators
//!
//! The organizer only depends on these traits. `ApiClient` implements both
//! over HTTP; tests provide in-memory implementations.

use async_trait::async_trait;

use crate::app::models::{
    BulkImportResponse, CatalogItem, Chapter, ImportPayload, Lecture, PositionUpdate,
};
use crate::errors::{FetchResult, SyncResult};

/// Retrieves the ordered videos of an external playlist
#[async_trait]
pub trait PlaylistFetcher: Send + Sync {
    /// Fetch a playlist; items come back with `source_index` in playlist order
    async fn fetch_playlist(&self, playlist_url: &str) -> FetchResult<Vec<CatalogItem>>;
}

/// Remote ordered store of chapters and lectures
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create all lectures of a staged hierarchy in one call
    async fn bulk_import(
        &self,
        scope_id: &str,
        payload: &[ImportPayload],
    ) -> SyncResult<BulkImportResponse>;

    /// Persist lecture positions (and chapter membership)
    async fn set_positions(&self, scope_id: &str, updates: &[PositionUpdate]) -> SyncResult<()>;

    /// Load the persisted hierarchy of a course
    async fn list_chapters(&self, scope_id: &str) -> SyncResult<Vec<Chapter>>;

    /// All distinct tags, for autocomplete
    async fn list_unique_tags(&self) -> SyncResult<Vec<String>>;

    /// Lectures matching a composed tag query
    async fn search_lectures(&self, query: &str) -> SyncResult<Vec<Lecture>>;
}
