//! Optimistic mutation sync with rollback
//!
//! `ReorderSyncController` applies hierarchy mutations to a shared model
//! right away, confirms them against the remote store in the background of
//! the caller, and reverts them if the store refuses.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lecture_organizer::app::client::ApiClient;
//! use lecture_organizer::app::sync::ReorderSyncController;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(ApiClient::new()?);
//! let controller = ReorderSyncController::load(store, "course-1").await?;
//!
//! let chapter_id = controller.model().await.chapters()[0].id.clone();
//! match controller.reorder_lecture(&chapter_id, 0, 2).await {
//!     Ok(report) => println!("confirmed in {}ms", report.latency_ms()),
//!     Err(e) => eprintln!("{}", e.user_message()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod snapshot;
pub mod types;

#[cfg(test)]
mod tests;

pub use controller::{position_updates, ReorderSyncController};
pub use snapshot::Snapshot;
pub use types::{OperationId, SyncPhase, SyncReport, SyncStats};
