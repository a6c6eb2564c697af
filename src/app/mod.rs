//! Core application logic for the lecture organizer
//!
//! This module contains the hierarchy model and its assignment operations,
//! the optimistic sync controller, the bulk-import compiler, tag query
//! composition and the HTTP client for the course backend.
//!
//! # Examples
//!
//! ```rust,no_run
//! use lecture_organizer::app::{ApiClient, OrganizerSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new()?;
//!
//! // Stage a playlist and split it into chapters of ten
//! let mut session = OrganizerSession::from_playlist(
//!     &client,
//!     "https://www.youtube.com/playlist?list=PL123",
//!     "course-42",
//!     "Chapter",
//! )
//! .await?;
//! session.auto_partition(10)?;
//!
//! let summary = session.submit(&client).await?;
//! println!("Imported {} lectures", summary.lectures);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod hierarchy;
pub mod import;
pub mod models;
pub mod session;
pub mod sync;
pub mod tags;

// Re-export main public API
pub use client::{ApiClient, ClientConfig, PlaylistFetcher, RemoteStore};
pub use hierarchy::{AssignmentEngine, HierarchyModel, Mutation};
pub use import::BulkImportCompiler;
pub use models::{
    BulkImportResponse, CatalogItem, Chapter, ImportPayload, Lecture, LectureId, PositionUpdate,
};
pub use session::{ImportSummary, OrganizerSession};
pub use sync::{ReorderSyncController, SyncPhase, SyncReport, SyncStats};
pub use tags::{TagFilterComposer, TagSet};
