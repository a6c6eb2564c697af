//! Chapter/lecture hierarchy
//!
//! This module holds the in-memory tree the organizer works on and the
//! operations that move lectures around inside it.
//!
//! - `model`: the tree itself plus the unassigned pool; owns the numbering
//!   invariants
//! - `assignment`: moves between pool and chapters, reorders, auto-partition
//! - `mutation`: the same operations as values, for the sync controller
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use lecture_organizer::app::hierarchy::HierarchyModel;
//! # fn example(items: Vec<lecture_organizer::app::models::CatalogItem>)
//! #     -> Result<(), Box<dyn std::error::Error>> {
//! let mut model = HierarchyModel::with_pool(items);
//! let chapters = model.assign().auto_partition(10)?;
//! model.assign().reorder_within_chapter(&chapters[0], 3, 0)?;
//! model.verify_invariants()?;
//! # Ok(())
//! # }
//! ```

pub mod assignment;
pub mod model;
pub mod mutation;

pub use assignment::AssignmentEngine;
pub use model::HierarchyModel;
pub use mutation::Mutation;
