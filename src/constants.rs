//! Application constants for Lecture Organizer
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Base URL of the course backend
    pub const API_URL: &str = "LECTURE_ORGANIZER_API_URL";

    /// Bearer token for the course backend
    pub const API_TOKEN: &str = "LECTURE_ORGANIZER_API_TOKEN";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "Lecture-Organizer/0.1.0 (Course Admin Tool)";

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 8;
}

/// Rate limiting and retry configuration
pub mod limits {
    /// Default rate limit for backend requests (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 10;

    /// Maximum retry attempts for failed requests
    pub const MAX_RETRIES: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 250;
}

/// Backend REST endpoints
pub mod api {
    /// Default backend base URL
    pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

    /// Playlist lookup, takes `?url=`
    pub const PLAYLIST_PATH: &str = "/api/playlists";

    /// Unique tag listing
    pub const TAGS_PATH: &str = "/api/tags";

    /// Lecture search, takes a composed tag query
    pub const LECTURES_PATH: &str = "/api/lectures";

    /// Prefix of every course-scoped endpoint; the course id follows as one segment
    pub const COURSES_PATH: &str = "/api/courses/";

    /// Bulk create, under a course
    pub const BULK_IMPORT_SEGMENTS: &[&str] = &["lectures", "bulk"];

    /// Position update, under a course
    pub const POSITIONS_SEGMENTS: &[&str] = &["lectures", "positions"];

    /// Persisted hierarchy, under a course
    pub const CHAPTERS_SEGMENTS: &[&str] = &["chapters"];
}

/// Organizer defaults
pub mod organizer {
    /// Default number of lectures per auto-partitioned chapter
    pub const DEFAULT_CHAPTER_SIZE: usize = 10;

    /// Default prefix for auto-partitioned chapter names
    pub const DEFAULT_CHAPTER_PREFIX: &str = "Chapter";

    /// Prefix for locally generated lecture ids
    pub const STAGED_LECTURE_PREFIX: &str = "tmp-";

    /// Prefix for locally generated chapter ids
    pub const LOCAL_CHAPTER_PREFIX: &str = "chapter-";
}

/// Tag query parameter names
pub mod query {
    /// Comma-joined tag list parameter
    pub const TAGS_PARAM: &str = "tags";

    /// Course scope parameter
    pub const SCOPE_PARAM: &str = "course";

    /// Separator between tags
    pub const TAG_SEPARATOR: &str = ",";
}

/// Configuration file locations
pub mod config {
    /// Project-local config file name
    pub const LOCAL_CONFIG_FILE: &str = "lecture-organizer.toml";

    /// Directory under the user config dir
    pub const CONFIG_DIR_NAME: &str = "lecture-organizer";

    /// Config file name under the user config dir
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

// Re-export commonly used constants at module level for convenience
pub use api::DEFAULT_BASE_URL;
pub use env::{API_TOKEN as ENV_API_TOKEN, API_URL as ENV_API_URL};
pub use http::USER_AGENT;
pub use limits::DEFAULT_RATE_LIMIT_RPS;
pub use organizer::{DEFAULT_CHAPTER_PREFIX, DEFAULT_CHAPTER_SIZE};
