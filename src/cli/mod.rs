//! Command-line interface components
//!
//! This module contains CLI-specific code for the lecture organizer,
//! including argument parsing and command handlers.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, GlobalArgs, ImportArgs, MoveArgs, ReorderArgs, TagsArgs};
pub use commands::{handle_import, handle_move, handle_reorder, handle_tags};
