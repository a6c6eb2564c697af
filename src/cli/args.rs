//! Command-line argument parsing for the lecture organizer
//!
//! This module defines the CLI structure using clap derive macros: staging
//! and importing a playlist, reordering persisted lectures, and tag queries.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Lecture Organizer - arrange video playlists into course chapters
#[derive(Parser, Debug)]
#[command(
    name = "lecture_organizer",
    version,
    about = "Organize video playlists into chaptered courses",
    long_about = "Stage an external video playlist, split it into numbered chapters and import it
into a course in one call. Persisted lectures can be reordered and moved between
chapters; failed changes are rolled back locally."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stage a playlist, partition it and bulk-import it into a course
    Import(ImportArgs),

    /// Move a lecture to another position in its chapter
    Reorder(ReorderArgs),

    /// Move a lecture into another chapter
    Move(MoveArgs),

    /// List known tags or compose a tag search
    Tags(TagsArgs),
}

/// Arguments for the import command
#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Playlist URL
    #[arg(value_name = "PLAYLIST_URL")]
    pub playlist_url: String,

    /// Target course id
    #[arg(short, long)]
    pub course: String,

    /// Lectures per chapter (defaults to the configured size)
    #[arg(short = 's', long)]
    pub chapter_size: Option<usize>,

    /// Name prefix for generated chapters
    #[arg(long)]
    pub chapter_prefix: Option<String>,

    /// Show the compiled import without sending it
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the reorder command
#[derive(Args, Debug, Clone)]
pub struct ReorderArgs {
    /// Course id
    #[arg(short, long)]
    pub course: String,

    /// Chapter id
    #[arg(long)]
    pub chapter: String,

    /// Current 1-based position of the lecture
    #[arg(long)]
    pub from: usize,

    /// New 1-based position of the lecture
    #[arg(long)]
    pub to: usize,
}

/// Arguments for the move command
#[derive(Args, Debug, Clone)]
pub struct MoveArgs {
    /// Course id
    #[arg(short, long)]
    pub course: String,

    /// Source chapter id
    #[arg(long)]
    pub from_chapter: String,

    /// 1-based position of the lecture in the source chapter
    #[arg(long)]
    pub position: usize,

    /// Target chapter id
    #[arg(long)]
    pub to_chapter: String,

    /// 1-based position in the target chapter
    #[arg(long)]
    pub to_position: usize,
}

/// Arguments for tag queries
#[derive(Args, Debug, Clone)]
pub struct TagsArgs {
    /// Tags to filter by (repeatable); without any, lists all known tags
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Restrict the search to one course
    #[arg(short, long)]
    pub course: Option<String>,

    /// Print the composed query instead of running the search
    #[arg(long)]
    pub query_only: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl ImportArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.chapter_size == Some(0) {
            return Err("Chapter size must be greater than 0".to_string());
        }
        if self.course.trim().is_empty() {
            return Err("Course id must not be empty".to_string());
        }
        Ok(())
    }
}

impl ReorderArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.from == 0 || self.to == 0 {
            return Err("Positions start at 1".to_string());
        }
        Ok(())
    }
}

impl MoveArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.position == 0 || self.to_position == 0 {
            return Err("Positions start at 1".to_string());
        }
        Ok(())
    }
}
