//! Error types for Lecture Organizer
//!
//! Errors are split by how the caller is expected to react to them:
//! structural errors are precondition violations and are never retried,
//! sync errors are transient and arrive only after the local model has been
//! rolled back, and fetch errors happen before any model state exists.

use std::path::PathBuf;
use thiserror::Error;

/// Precondition violations raised synchronously by the hierarchy operations
///
/// A structural error always means the model was left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// Chapter id does not exist in the hierarchy
    #[error("Chapter not found: {chapter_id}")]
    TargetNotFound { chapter_id: String },

    /// Lecture index outside the chapter's lecture list
    #[error("Index {index} out of range for chapter {chapter_id} ({len} lectures)")]
    IndexOutOfRange {
        chapter_id: String,
        index: usize,
        len: usize,
    },

    /// Catalog item is not (or no longer) in the unassigned pool
    #[error("Catalog item {item_id} is not in the unassigned pool")]
    ItemNotInPool { item_id: String },

    /// Auto-partition requested with a zero chapter size
    #[error("Chapter size for auto-partition must be greater than zero")]
    InvalidPartitionSize,

    /// No chapter contains a lecture to import
    #[error("Nothing to import: no chapter contains a staged lecture")]
    EmptyImport,

    /// Operation requires persisted lectures but found a staged one
    #[error("Lecture {lecture_id} has not been persisted yet")]
    NotPersisted { lecture_id: String },

    /// Mutation moves no lecture, so there are no positions to persist
    #[error("{operation} does not change lecture positions")]
    NoPositionChange { operation: String },

    /// Numbering invariant broken
    #[error("Hierarchy invariant violated: {reason}")]
    InvariantViolation { reason: String },
}

/// Remote persistence failures; the local model is already rolled back
#[derive(Error, Debug)]
pub enum SyncError {
    /// Transport level failure
    #[error("Network error while syncing: {message}")]
    Network { message: String },

    /// Remote store answered with a non-2xx status
    #[error("Remote store responded with HTTP {status}")]
    Status { status: u16 },

    /// Request timed out
    #[error("Sync request timed out")]
    Timeout,

    /// Remote store accepted the request but reported failure
    #[error("Remote store rejected the request: {message}")]
    Rejected { message: String },

    /// Response body could not be decoded
    #[error("Invalid response from remote store: {reason}")]
    InvalidResponse { reason: String },

    /// Rate limit exceeded after retries
    #[error("Rate limit exceeded. Remote store responded with HTTP 429")]
    RateLimitExceeded,

    /// Operation was reverted because an earlier in-flight operation failed
    #[error("Operation {operation_id} was discarded by the rollback of operation {rolled_back_by}; retry it")]
    Discarded {
        operation_id: u64,
        rolled_back_by: u64,
    },

    /// Failed operation after local rollback
    #[error("Operation {operation_id} failed and was rolled back: {source}")]
    RolledBack {
        operation_id: u64,
        #[source]
        source: Box<SyncError>,
    },

    /// Failed operation whose pre-mutation state could not be put back
    ///
    /// The model is left as it was when the failure arrived; reload it from
    /// the remote store.
    #[error("Operation {operation_id} failed and could not be rolled back ({reason}): {source}")]
    RollbackIncomplete {
        operation_id: u64,
        reason: StructuralError,
        #[source]
        source: Box<SyncError>,
    },
}

impl SyncError {
    /// Classify a reqwest error into a sync error
    pub fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            SyncError::Timeout
        } else if let Some(status) = error.status() {
            SyncError::Status {
                status: status.as_u16(),
            }
        } else if error.is_decode() {
            SyncError::InvalidResponse {
                reason: error.to_string(),
            }
        } else {
            SyncError::Network {
                message: error.to_string(),
            }
        }
    }

    /// The failure underneath any rollback wrapper
    pub fn root_cause(&self) -> &SyncError {
        match self {
            SyncError::RolledBack { source, .. } | SyncError::RollbackIncomplete { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}

/// Playlist retrieval errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// Playlist endpoint unreachable
    #[error("Playlist unreachable: {message}")]
    Unreachable { message: String },

    /// Non-2xx response
    #[error("Playlist fetch failed: HTTP {status}")]
    Status { status: u16 },

    /// Body did not decode into a playlist
    #[error("Malformed playlist response: {reason}")]
    Malformed { reason: String },

    /// Playlist URL could not be parsed
    #[error("Invalid playlist URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {reason}")]
    ClientBuild { reason: String },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Structural precondition violation
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// Remote sync failure
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Playlist fetch failure
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    ///
    /// Only sync failures are; the user may retry the action against the
    /// rolled-back state.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Sync(_))
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Structural(_) => "structural",
            AppError::Sync(_) => "sync",
            AppError::Fetch(_) => "fetch",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            AppError::Sync(e @ SyncError::RollbackIncomplete { .. }) => {
                format!("{}. Reload the course before making further changes.", e)
            }
            AppError::Sync(e) => format!("{}. Your change was undone; please try again.", e),
            other => other.to_string(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Structural result type alias
pub type StructuralResult<T> = std::result::Result<T, StructuralError>;

/// Sync result type alias
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
