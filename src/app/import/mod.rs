//! Bulk import of a staged hierarchy
//!
//! Flattens the chapters built in the organizer into the ordered payload the
//! remote store's bulk-create endpoint expects.

pub mod compiler;

pub use compiler::BulkImportCompiler;
