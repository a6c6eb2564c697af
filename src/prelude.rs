//! Prelude module for the Lecture Organizer library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use lecture_organizer::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use lecture_organizer::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store: Arc<dyn RemoteStore> = Arc::new(ApiClient::new()?);
//!     let controller = ReorderSyncController::load(store, "course-1").await?;
//!     println!("{} chapters", controller.model().await.chapters().len());
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result, StructuralError, SyncError};

// Essential app components
pub use crate::app::{
    ApiClient,
    AssignmentEngine,
    BulkImportCompiler,
    CatalogItem,
    Chapter,
    ClientConfig,
    HierarchyModel,
    ImportPayload,
    Lecture,
    Mutation,
    OrganizerSession,
    PlaylistFetcher,
    RemoteStore,
    ReorderSyncController,
    SyncReport,
    TagFilterComposer,
    TagSet,
};

pub use crate::config::AppConfig;

// Commonly used constants
pub use crate::constants::{DEFAULT_CHAPTER_SIZE, DEFAULT_RATE_LIMIT_RPS, USER_AGENT};

pub use std::sync::Arc;

pub use tokio;
