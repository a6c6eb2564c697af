//! Lecture Organizer Library
//!
//! Organizes an external video playlist into an ordered course of numbered
//! chapters and lectures. The hierarchy is edited locally, imported in one
//! bulk call, and later reorders are applied optimistically and rolled back
//! if the backend refuses them.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
