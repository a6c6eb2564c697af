//! Organizer session: playlist in, bulk import out
//!
//! A session owns a staged `HierarchyModel` from the moment a playlist is
//! fetched until the compiled hierarchy is accepted by the remote store.
//! Nothing is persisted before `submit`.

use tracing::{debug, info, warn};

use crate::app::client::{PlaylistFetcher, RemoteStore};
use crate::app::hierarchy::{HierarchyModel, Mutation};
use crate::app::import::BulkImportCompiler;
use crate::app::models::ImportPayload;
use crate::errors::{Result, StructuralResult, SyncError};

/// Outcome of a successful bulk import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub scope_id: String,
    pub chapters: usize,
    pub lectures: usize,
    pub message: String,
}

/// Staged organization of one playlist into one course
#[derive(Debug, Clone)]
pub struct OrganizerSession {
    scope_id: String,
    playlist_url: String,
    model: HierarchyModel,
}

impl OrganizerSession {
    /// Fetch a playlist and put all of its items in the unassigned pool
    ///
    /// # Errors
    ///
    /// `FetchError` if the playlist cannot be retrieved. No model exists in
    /// that case.
    pub async fn from_playlist(
        fetcher: &dyn PlaylistFetcher,
        playlist_url: &str,
        scope_id: impl Into<String>,
        chapter_prefix: &str,
    ) -> Result<Self> {
        let items = fetcher.fetch_playlist(playlist_url).await?;
        info!("Staging {} playlist items", items.len());

        Ok(Self {
            scope_id: scope_id.into(),
            playlist_url: playlist_url.to_string(),
            model: HierarchyModel::with_pool(items).with_chapter_prefix(chapter_prefix),
        })
    }

    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    pub fn playlist_url(&self) -> &str {
        &self.playlist_url
    }

    pub fn model(&self) -> &HierarchyModel {
        &self.model
    }

    /// Apply a manual edit to the staged hierarchy
    pub fn apply(&mut self, mutation: &Mutation) -> StructuralResult<()> {
        debug!("Session edit: {}", mutation.name());
        mutation.apply(&mut self.model)
    }

    /// Split everything left in the pool into chapters of `target_size`
    pub fn auto_partition(&mut self, target_size: usize) -> StructuralResult<Vec<String>> {
        self.model.assign().auto_partition(target_size)
    }

    pub fn compile(&self) -> StructuralResult<Vec<ImportPayload>> {
        BulkImportCompiler::compile(&self.model)
    }

    /// Compile the staged hierarchy and create it remotely in one call
    ///
    /// # Errors
    ///
    /// - `StructuralError::EmptyImport` if nothing is staged; no call is made
    /// - `SyncError::Rejected` if the store answers `success: false`
    /// - any transport `SyncError`
    ///
    /// The staged model is left untouched on error so the user can retry.
    pub async fn submit(&self, store: &dyn RemoteStore) -> Result<ImportSummary> {
        let payload = self.compile()?;
        let chapters = payload
            .iter()
            .map(|p| p.chapter_number)
            .collect::<std::collections::BTreeSet<_>>()
            .len();

        info!(
            "Importing {} lectures in {} chapters into course {}",
            payload.len(),
            chapters,
            self.scope_id
        );
        let response = store.bulk_import(&self.scope_id, &payload).await?;

        if !response.success {
            warn!("Bulk import rejected: {}", response.message);
            return Err(SyncError::Rejected {
                message: response.message,
            }
            .into());
        }

        info!("Bulk import into course {} succeeded", self.scope_id);
        Ok(ImportSummary {
            scope_id: self.scope_id.clone(),
            chapters,
            lectures: payload.len(),
            message: response.message,
        })
    }
}
