//! Optimistic apply-then-sync with rollback
//!
//! Mutations are applied to the local model immediately and confirmed
//! remotely afterwards. The model lock is never held across a remote call,
//! so several operations can be in flight at once. When one fails, the model
//! goes back to the state just before that operation: every later in-flight
//! operation is reverted too (newest first) and reported as discarded, since
//! the remote state after a failure is unknown.
//!
//! A snapshot can only be restored while its target still exists. When a
//! confirmed operation removed the chapter a failing one captured, the
//! failure is reported as `SyncError::RollbackIncomplete` and the model is
//! left as it was.
//!
//! Dropping an `apply_and_sync` future while its remote call is pending
//! keeps the local change and stops tracking the operation.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::app::client::RemoteStore;
use crate::app::hierarchy::{HierarchyModel, Mutation};
use crate::app::models::PositionUpdate;
use crate::errors::{AppError, Result, StructuralError, StructuralResult, SyncError, SyncResult};

use super::snapshot::Snapshot;
use super::types::{OperationId, SyncPhase, SyncReport, SyncStats};

/// An applied operation waiting for its remote call
#[derive(Debug)]
struct InFlight {
    mutation: Mutation,
    snapshot: Snapshot,
    started_at: DateTime<Utc>,
}

/// Outcome of reverting a failed operation
#[derive(Debug, Default)]
struct Rollback {
    discarded: usize,
    /// First snapshot that could not be restored
    failed: Option<StructuralError>,
}

/// State shared by all operations of one controller
#[derive(Debug)]
struct ControllerState {
    model: HierarchyModel,
    in_flight: BTreeMap<OperationId, InFlight>,
    /// Discarded operation -> operation whose rollback discarded it
    discarded: HashMap<OperationId, OperationId>,
    next_operation_id: OperationId,
    stats: SyncStats,
}

impl ControllerState {
    fn phase(&self) -> SyncPhase {
        if self.in_flight.is_empty() {
            SyncPhase::Idle
        } else {
            SyncPhase::Syncing
        }
    }

    /// Revert `operation_id` and every later in-flight operation
    ///
    /// Every snapshot is attempted even if an earlier one cannot be applied.
    fn roll_back(&mut self, operation_id: OperationId, own: InFlight) -> Rollback {
        let later: Vec<OperationId> = self
            .in_flight
            .range(operation_id + 1..)
            .map(|(id, _)| *id)
            .collect();

        let mut rollback = Rollback::default();
        for id in later.iter().rev() {
            if let Some(op) = self.in_flight.remove(id) {
                debug!("Reverting operation {} ({})", id, op.mutation.name());
                if let Err(e) = op.snapshot.restore(&mut self.model) {
                    rollback.failed.get_or_insert(e);
                }
                self.discarded.insert(*id, operation_id);
                rollback.discarded += 1;
            }
        }
        if let Err(e) = own.snapshot.restore(&mut self.model) {
            rollback.failed.get_or_insert(e);
        }
        rollback
    }

    /// Stop tracking an operation whose caller went away
    fn abandon(&mut self, operation_id: OperationId) {
        let tracked = self.in_flight.remove(&operation_id).is_some()
            || self.discarded.remove(&operation_id).is_some();
        if tracked {
            self.stats.abandoned += 1;
            warn!(
                "Operation {} abandoned before its remote call resolved",
                operation_id
            );
        }
    }
}

/// Forgets an in-flight operation if the future driving it is dropped
struct InFlightGuard {
    state: Arc<Mutex<ControllerState>>,
    operation_id: OperationId,
    armed: bool,
}

impl InFlightGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let operation_id = self.operation_id;
        if let Ok(mut state) = self.state.try_lock() {
            state.abandon(operation_id);
        } else if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let state = Arc::clone(&self.state);
            handle.spawn(async move {
                state.lock().await.abandon(operation_id);
            });
        }
    }
}

/// Applies hierarchy mutations optimistically and syncs them remotely
#[derive(Clone)]
pub struct ReorderSyncController {
    state: Arc<Mutex<ControllerState>>,
    store: Arc<dyn RemoteStore>,
    scope_id: String,
}

impl std::fmt::Debug for ReorderSyncController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReorderSyncController")
            .field("scope_id", &self.scope_id)
            .finish_non_exhaustive()
    }
}

impl ReorderSyncController {
    /// Create a controller over a persisted hierarchy of one course
    pub fn new(model: HierarchyModel, store: Arc<dyn RemoteStore>, scope_id: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ControllerState {
                model,
                in_flight: BTreeMap::new(),
                discarded: HashMap::new(),
                next_operation_id: 1,
                stats: SyncStats::default(),
            })),
            store,
            scope_id: scope_id.into(),
        }
    }

    /// Load a course's persisted hierarchy from the store
    pub async fn load(store: Arc<dyn RemoteStore>, scope_id: impl Into<String>) -> Result<Self> {
        let scope_id = scope_id.into();
        let chapters = store.list_chapters(&scope_id).await?;
        info!("Loaded {} chapters for course {}", chapters.len(), scope_id);
        Ok(Self::new(HierarchyModel::from_chapters(chapters), store, scope_id))
    }

    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    /// Copy of the current model for rendering
    pub async fn model(&self) -> HierarchyModel {
        self.state.lock().await.model.clone()
    }

    pub async fn phase(&self) -> SyncPhase {
        self.state.lock().await.phase()
    }

    pub async fn stats(&self) -> SyncStats {
        self.state.lock().await.stats.clone()
    }

    pub async fn in_flight_count(&self) -> usize {
        self.state.lock().await.in_flight.len()
    }

    /// Apply `mutation` now and confirm it with the call built by `remote_call`
    ///
    /// `remote_call` sees the model right after the mutation and returns the
    /// request to issue. If it cannot build one, the mutation is reverted
    /// before the lock is released and the structural error is returned.
    ///
    /// # Errors
    ///
    /// - `StructuralError` if the mutation or the request is invalid; the
    ///   model is unchanged
    /// - `SyncError::RolledBack` if the remote call failed; the model is back
    ///   to its state before this operation
    /// - `SyncError::Discarded` if an earlier operation failed while this one
    ///   was in flight; this operation was reverted and should be retried
    /// - `SyncError::RollbackIncomplete` if the remote call failed and a
    ///   snapshot no longer fits the model; the model needs reloading
    pub async fn apply_and_sync<F, Fut>(&self, mutation: Mutation, remote_call: F) -> Result<SyncReport>
    where
        F: FnOnce(&HierarchyModel) -> StructuralResult<Fut>,
        Fut: Future<Output = SyncResult<()>>,
    {
        let (operation_id, call) = {
            let mut state = self.state.lock().await;
            debug!("{} {} on course {}", SyncPhase::Mutating, mutation.name(), self.scope_id);

            let snapshot = Snapshot::capture(&state.model, &mutation);
            if let Err(e) = mutation.apply(&mut state.model) {
                state.stats.rejected += 1;
                return Err(e.into());
            }

            let call = match remote_call(&state.model) {
                Ok(call) => call,
                Err(e) => {
                    state.stats.rejected += 1;
                    if let Err(restore_err) = snapshot.restore(&mut state.model) {
                        return Err(StructuralError::InvariantViolation {
                            reason: format!(
                                "could not undo {} after {}: {}",
                                mutation.name(),
                                e,
                                restore_err
                            ),
                        }
                        .into());
                    }
                    return Err(e.into());
                }
            };

            let operation_id = state.next_operation_id;
            state.next_operation_id += 1;
            state.stats.applied += 1;
            state.in_flight.insert(
                operation_id,
                InFlight {
                    mutation,
                    snapshot,
                    started_at: Utc::now(),
                },
            );
            debug!("Operation {} applied locally, {}", operation_id, SyncPhase::Syncing);
            (operation_id, call)
        };

        let guard = InFlightGuard {
            state: Arc::clone(&self.state),
            operation_id,
            armed: true,
        };

        let result = call.await;

        let mut state = self.state.lock().await;
        guard.disarm();
        if let Some(rolled_back_by) = state.discarded.remove(&operation_id) {
            state.stats.discarded += 1;
            warn!(
                "Operation {} resolved after being discarded by operation {}",
                operation_id, rolled_back_by
            );
            return Err(SyncError::Discarded {
                operation_id,
                rolled_back_by,
            }
            .into());
        }

        let Some(own) = state.in_flight.remove(&operation_id) else {
            return Err(AppError::generic(format!(
                "operation {} is no longer tracked",
                operation_id
            )));
        };

        match result {
            Ok(()) => {
                state.stats.confirmed += 1;
                let report = SyncReport {
                    operation_id,
                    mutation: own.mutation,
                    started_at: own.started_at,
                    finished_at: Utc::now(),
                };
                info!(
                    "Operation {} ({}) confirmed in {}ms",
                    operation_id,
                    report.mutation.name(),
                    report.latency_ms()
                );
                Ok(report)
            }
            Err(e) => {
                let name = own.mutation.name();
                let rollback = state.roll_back(operation_id, own);
                state.stats.rolled_back += 1;

                if let Some(reason) = rollback.failed {
                    warn!(
                        "Operation {} ({}) failed: {}. Rollback incomplete: {}",
                        operation_id, name, e, reason
                    );
                    return Err(SyncError::RollbackIncomplete {
                        operation_id,
                        reason,
                        source: Box::new(e),
                    }
                    .into());
                }

                warn!(
                    "Operation {} ({}) failed: {}. Rolled back, {} later operations discarded",
                    operation_id, name, e, rollback.discarded
                );
                Err(SyncError::RolledBack {
                    operation_id,
                    source: Box::new(e),
                }
                .into())
            }
        }
    }

    /// Move a lecture inside a chapter and persist the chapter's positions
    pub async fn reorder_lecture(
        &self,
        chapter_id: &str,
        from_index: usize,
        to_index: usize,
    ) -> Result<SyncReport> {
        self.sync_positions(Mutation::ReorderWithinChapter {
            chapter_id: chapter_id.to_string(),
            from_index,
            to_index,
        })
        .await
    }

    /// Move a lecture between chapters and persist both chapters' positions
    pub async fn move_lecture(
        &self,
        from_chapter_id: &str,
        lecture_index: usize,
        to_chapter_id: &str,
        to_index: usize,
    ) -> Result<SyncReport> {
        self.sync_positions(Mutation::MoveBetweenChapters {
            from_chapter_id: from_chapter_id.to_string(),
            lecture_index,
            to_chapter_id: to_chapter_id.to_string(),
            to_index,
        })
        .await
    }

    /// Apply a mutation and send the full position list of every chapter it touched
    ///
    /// Mutations that touch no chapter's lecture order are refused with
    /// `NoPositionChange` before the model is changed.
    pub(crate) async fn sync_positions(&self, mutation: Mutation) -> Result<SyncReport> {
        let chapter_ids: Vec<String> = mutation
            .affected_chapters()
            .into_iter()
            .map(str::to_string)
            .collect();
        if chapter_ids.is_empty() {
            self.state.lock().await.stats.rejected += 1;
            return Err(StructuralError::NoPositionChange {
                operation: mutation.name().to_string(),
            }
            .into());
        }
        let store = Arc::clone(&self.store);
        let scope_id = self.scope_id.clone();

        self.apply_and_sync(mutation, move |model| {
            let updates = position_updates(model, &chapter_ids)?;
            Ok(async move { store.set_positions(&scope_id, &updates).await })
        })
        .await
    }
}

/// Position records for every lecture of the given chapters
///
/// # Errors
///
/// `TargetNotFound` for an unknown chapter, `NotPersisted` if a chapter
/// holds a lecture the remote store does not know.
pub fn position_updates(
    model: &HierarchyModel,
    chapter_ids: &[String],
) -> StructuralResult<Vec<PositionUpdate>> {
    let mut updates = Vec::new();
    for chapter_id in chapter_ids {
        let chapter = model
            .chapter(chapter_id)
            .ok_or_else(|| StructuralError::TargetNotFound {
                chapter_id: chapter_id.clone(),
            })?;
        for lecture in &chapter.lectures {
            if !lecture.is_persisted() {
                return Err(StructuralError::NotPersisted {
                    lecture_id: lecture.id.to_string(),
                });
            }
            updates.push(PositionUpdate {
                lecture_id: lecture.id.to_string(),
                chapter_id: chapter.id.clone(),
                position: lecture.position,
            });
        }
    }
    Ok(updates)
}
