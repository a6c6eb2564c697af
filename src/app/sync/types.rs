//! Core data structures for the sync controller

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::hierarchy::Mutation;

/// Identifier of one optimistic operation, increasing in application order
pub type OperationId = u64;

/// Where an operation is in its lifecycle
///
/// `Idle -> Mutating -> Syncing -> Idle`, whether the remote call succeeds
/// or the operation is rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPhase {
    /// Nothing in flight
    Idle,
    /// Mutation being applied to the local model
    Mutating,
    /// Applied locally, waiting for remote confirmation
    Syncing,
}

impl SyncPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, SyncPhase::Idle)
    }
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Mutating => "mutating",
            SyncPhase::Syncing => "syncing",
        };
        f.write_str(name)
    }
}

/// A confirmed operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub operation_id: OperationId,
    pub mutation: Mutation,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    /// Round-trip time of the remote call in milliseconds
    pub fn latency_ms(&self) -> i64 {
        self.finished_at
            .signed_duration_since(self.started_at)
            .num_milliseconds()
    }
}

/// Counters over the controller's lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    /// Mutations applied locally
    pub applied: u64,
    /// Remote calls confirmed
    pub confirmed: u64,
    /// Operations whose own remote call failed
    pub rolled_back: u64,
    /// Operations reverted because an earlier one failed
    pub discarded: u64,
    /// Mutations refused before touching the model
    pub rejected: u64,
    /// Operations whose caller stopped waiting for the remote call
    pub abandoned: u64,
}

impl SyncStats {
    /// Operations neither confirmed nor reverted yet
    pub fn pending(&self) -> u64 {
        self.applied - self.confirmed - self.rolled_back - self.discarded - self.abandoned
    }
}
