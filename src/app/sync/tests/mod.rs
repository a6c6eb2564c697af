//! Unit tests for the sync controller
//!
//! Remote calls are held open with oneshot gates so tests decide when and
//! how each in-flight operation resolves.

#[cfg(test)]
mod controller_tests {
    use super::super::*;
    use crate::app::client::RemoteStore;
    use crate::app::hierarchy::{HierarchyModel, Mutation};
    use crate::app::models::{BulkImportResponse, Chapter, ImportPayload, Lecture, PositionUpdate};
    use crate::errors::{AppError, StructuralError, SyncError, SyncResult};
    use async_trait::async_trait;
    use futures::FutureExt;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::sync::oneshot;

    /// Store whose position calls wait on a per-chapter gate
    #[derive(Default)]
    struct GatedStore {
        gates: Mutex<HashMap<String, oneshot::Receiver<SyncResult<()>>>>,
        calls: Mutex<Vec<Vec<PositionUpdate>>>,
        chapters: Vec<Chapter>,
    }

    impl GatedStore {
        fn gate(&self, chapter_id: &str) -> oneshot::Sender<SyncResult<()>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(chapter_id.to_string(), rx);
            tx
        }

        fn calls(&self) -> Vec<Vec<PositionUpdate>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteStore for GatedStore {
        async fn bulk_import(
            &self,
            _scope_id: &str,
            _payload: &[ImportPayload],
        ) -> SyncResult<BulkImportResponse> {
            Ok(BulkImportResponse {
                success: true,
                message: String::new(),
            })
        }

        async fn set_positions(&self, _scope_id: &str, updates: &[PositionUpdate]) -> SyncResult<()> {
            self.calls.lock().unwrap().push(updates.to_vec());
            let gate = updates
                .first()
                .and_then(|u| self.gates.lock().unwrap().remove(&u.chapter_id));
            match gate {
                Some(rx) => rx.await.unwrap_or(Err(SyncError::Timeout)),
                None => Ok(()),
            }
        }

        async fn list_chapters(&self, _scope_id: &str) -> SyncResult<Vec<Chapter>> {
            Ok(self.chapters.clone())
        }

        async fn list_unique_tags(&self) -> SyncResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn search_lectures(&self, _query: &str) -> SyncResult<Vec<Lecture>> {
            Ok(Vec::new())
        }
    }

    fn persisted_chapters() -> Vec<Chapter> {
        (1..=2)
            .map(|c| {
                let mut chapter = Chapter::with_id(format!("c{}", c), format!("Chapter {}", c));
                chapter.number = c;
                chapter.lectures = (1..=3)
                    .map(|l| {
                        let mut lecture = Lecture::persisted(
                            format!("c{}-l{}", c, l),
                            format!("Lecture {}.{}", c, l),
                            format!("https://video.example/{}/{}", c, l),
                            60,
                        );
                        lecture.position = l;
                        lecture
                    })
                    .collect();
                chapter
            })
            .collect()
    }

    fn controller(store: Arc<GatedStore>) -> ReorderSyncController {
        let model = HierarchyModel::from_chapters(persisted_chapters());
        ReorderSyncController::new(model, store, "course-1")
    }

    fn lecture_ids(model: &HierarchyModel, chapter_index: usize) -> Vec<String> {
        model.chapters()[chapter_index]
            .lectures
            .iter()
            .map(|l| l.id.to_string())
            .collect()
    }

    async fn wait_for_in_flight(controller: &ReorderSyncController, count: usize) {
        while controller.in_flight_count().await < count {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_confirmed_reorder_keeps_new_order() {
        let store = Arc::new(GatedStore::default());
        let controller = controller(Arc::clone(&store));

        let report = controller.reorder_lecture("c1", 0, 2).await.unwrap();
        assert_eq!(report.operation_id, 1);

        let model = controller.model().await;
        assert_eq!(lecture_ids(&model, 0), vec!["c1-l2", "c1-l3", "c1-l1"]);
        assert_eq!(model.chapters()[0].lecture_positions(), vec![1, 2, 3]);

        let calls = store.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 3);
        assert_eq!(calls[0][0].lecture_id, "c1-l2");
        assert_eq!(calls[0][0].position, 1);

        let stats = controller.stats().await;
        assert_eq!(stats.applied, 1);
        assert_eq!(stats.confirmed, 1);
        assert_eq!(stats.pending(), 0);
        assert!(controller.phase().await.is_idle());
    }

    #[tokio::test]
    async fn test_failed_reorder_restores_prior_state() {
        let store = Arc::new(GatedStore::default());
        let controller = controller(Arc::clone(&store));
        let before = controller.model().await;

        let gate = store.gate("c1");
        let task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.reorder_lecture("c1", 0, 2).await })
        };

        wait_for_in_flight(&controller, 1).await;
        assert_eq!(controller.phase().await, SyncPhase::Syncing);
        let optimistic = controller.model().await;
        assert_eq!(lecture_ids(&optimistic, 0), vec!["c1-l2", "c1-l3", "c1-l1"]);

        gate.send(Err(SyncError::Status { status: 500 })).unwrap();
        let err = task.await.unwrap().unwrap_err();

        match &err {
            AppError::Sync(SyncError::RolledBack {
                operation_id,
                source,
            }) => {
                assert_eq!(*operation_id, 1);
                assert!(matches!(**source, SyncError::Status { status: 500 }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.is_recoverable());
        assert_eq!(controller.model().await, before);
        assert_eq!(controller.stats().await.rolled_back, 1);
    }

    #[tokio::test]
    async fn test_later_operation_discarded_when_earlier_fails() {
        let store = Arc::new(GatedStore::default());
        let controller = controller(Arc::clone(&store));
        let before = controller.model().await;

        let first_gate = store.gate("c1");
        let second_gate = store.gate("c2");

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.reorder_lecture("c1", 0, 1).await })
        };
        wait_for_in_flight(&controller, 1).await;

        let second = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.reorder_lecture("c2", 2, 0).await })
        };
        wait_for_in_flight(&controller, 2).await;

        let optimistic = controller.model().await;
        assert_eq!(lecture_ids(&optimistic, 0), vec!["c1-l2", "c1-l1", "c1-l3"]);
        assert_eq!(lecture_ids(&optimistic, 1), vec!["c2-l3", "c2-l1", "c2-l2"]);

        first_gate
            .send(Err(SyncError::Network {
                message: "connection reset".to_string(),
            }))
            .unwrap();
        let first_err = first.await.unwrap().unwrap_err();
        assert!(matches!(
            first_err,
            AppError::Sync(SyncError::RolledBack { operation_id: 1, .. })
        ));

        // Both chapters are back to their original order
        assert_eq!(controller.model().await, before);
        assert_eq!(controller.in_flight_count().await, 0);

        // The second call succeeds remotely but its local change is already gone
        second_gate.send(Ok(())).unwrap();
        let second_err = second.await.unwrap().unwrap_err();
        assert!(matches!(
            second_err,
            AppError::Sync(SyncError::Discarded {
                operation_id: 2,
                rolled_back_by: 1
            })
        ));
        assert_eq!(controller.model().await, before);

        let stats = controller.stats().await;
        assert_eq!(stats.applied, 2);
        assert_eq!(stats.rolled_back, 1);
        assert_eq!(stats.discarded, 1);
        assert_eq!(stats.confirmed, 0);
    }

    #[tokio::test]
    async fn test_move_between_chapters_sends_both_chapters() {
        let store = Arc::new(GatedStore::default());
        let controller = controller(Arc::clone(&store));

        controller.move_lecture("c1", 0, "c2", 1).await.unwrap();

        let model = controller.model().await;
        assert_eq!(lecture_ids(&model, 0), vec!["c1-l2", "c1-l3"]);
        assert_eq!(lecture_ids(&model, 1), vec!["c2-l1", "c1-l1", "c2-l2", "c2-l3"]);
        model.verify_invariants().unwrap();

        let calls = store.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 6);
        let moved = calls[0]
            .iter()
            .find(|u| u.lecture_id == "c1-l1")
            .unwrap();
        assert_eq!(moved.chapter_id, "c2");
        assert_eq!(moved.position, 2);
    }

    #[tokio::test]
    async fn test_invalid_mutation_leaves_model_unchanged() {
        let store = Arc::new(GatedStore::default());
        let controller = controller(Arc::clone(&store));
        let before = controller.model().await;

        let err = controller.reorder_lecture("c1", 0, 7).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Structural(StructuralError::IndexOutOfRange { .. })
        ));

        let err = controller.reorder_lecture("missing", 0, 1).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Structural(StructuralError::TargetNotFound { .. })
        ));

        assert_eq!(controller.model().await, before);
        assert!(store.calls().is_empty());
        let stats = controller.stats().await;
        assert_eq!(stats.rejected, 2);
        assert_eq!(stats.applied, 0);
    }

    #[tokio::test]
    async fn test_staged_lectures_cannot_sync_positions() {
        let store = Arc::new(GatedStore::default());
        let mut model = HierarchyModel::from_chapters(persisted_chapters());
        let staged = Lecture::from_catalog_item(crate::app::models::CatalogItem {
            id: "v9".to_string(),
            title: "Staged".to_string(),
            description: String::new(),
            duration_seconds: 30,
            thumbnail_url: String::new(),
            external_url: String::new(),
            source_index: 0,
        });
        model.chapters_mut()[0].lectures.push(staged);
        model.renumber();
        let before = model.clone();
        let controller = ReorderSyncController::new(model, store.clone(), "course-1");

        let err = controller.reorder_lecture("c1", 3, 0).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Structural(StructuralError::NotPersisted { .. })
        ));
        assert_eq!(controller.model().await, before);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_custom_remote_call_with_whole_model_snapshot() {
        let store = Arc::new(GatedStore::default());
        let controller = controller(Arc::clone(&store));
        let before = controller.model().await;

        let err = controller
            .apply_and_sync(
                Mutation::RemoveChapter {
                    chapter_id: "c1".to_string(),
                },
                |model| {
                    assert_eq!(model.chapters().len(), 1);
                    assert_eq!(model.unassigned_pool().len(), 3);
                    Ok(async { Err::<(), _>(SyncError::Timeout) })
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Sync(SyncError::RolledBack { .. })
        ));
        assert_eq!(controller.model().await, before);
    }

    #[tokio::test]
    async fn test_rollback_after_chapter_removed_is_reported_incomplete() {
        let store = Arc::new(GatedStore::default());
        let controller = controller(Arc::clone(&store));

        let gate = store.gate("c1");
        let reorder = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.reorder_lecture("c1", 0, 2).await })
        };
        wait_for_in_flight(&controller, 1).await;

        let report = controller
            .apply_and_sync(
                Mutation::RemoveChapter {
                    chapter_id: "c1".to_string(),
                },
                |_| Ok(async { Ok::<(), SyncError>(()) }),
            )
            .await
            .unwrap();
        assert_eq!(report.operation_id, 2);
        let after_removal = controller.model().await;

        gate.send(Err(SyncError::Status { status: 500 })).unwrap();
        let err = reorder.await.unwrap().unwrap_err();

        match &err {
            AppError::Sync(SyncError::RollbackIncomplete {
                operation_id,
                reason,
                source,
            }) => {
                assert_eq!(*operation_id, 1);
                assert_eq!(
                    *reason,
                    StructuralError::TargetNotFound {
                        chapter_id: "c1".to_string()
                    }
                );
                assert!(matches!(**source, SyncError::Status { status: 500 }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.user_message().contains("Reload"));

        // Nothing was reverted, and the model says so
        let model = controller.model().await;
        assert_eq!(model, after_removal);
        model.verify_invariants().unwrap();
        let pool: Vec<&str> = model
            .unassigned_pool()
            .iter()
            .map(|item| item.title.as_str())
            .collect();
        assert_eq!(pool, vec!["Lecture 1.2", "Lecture 1.3", "Lecture 1.1"]);

        let stats = controller.stats().await;
        assert_eq!(stats.confirmed, 1);
        assert_eq!(stats.rolled_back, 1);
        assert_eq!(controller.in_flight_count().await, 0);
    }

    #[tokio::test]
    async fn test_position_sync_refuses_mutation_without_lecture_moves() {
        let store = Arc::new(GatedStore::default());
        let controller = controller(Arc::clone(&store));
        let before = controller.model().await;

        let err = controller
            .sync_positions(Mutation::AddChapter {
                name: "Extra".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Structural(StructuralError::NoPositionChange { .. })
        ));

        assert_eq!(controller.model().await, before);
        assert!(store.calls().is_empty());
        let stats = controller.stats().await;
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.applied, 0);
    }

    #[tokio::test]
    async fn test_dropped_operation_stops_being_tracked() {
        let store = Arc::new(GatedStore::default());
        let controller = controller(Arc::clone(&store));

        // Held open so the call is still pending when the future is dropped
        let _held = store.gate("c1");
        let dropped = controller.reorder_lecture("c1", 0, 2).now_or_never();
        assert!(dropped.is_none());

        assert_eq!(controller.in_flight_count().await, 0);
        assert!(controller.phase().await.is_idle());
        let stats = controller.stats().await;
        assert_eq!(stats.abandoned, 1);
        assert_eq!(stats.pending(), 0);

        // A later failure only reverts its own change
        let gate = store.gate("c2");
        gate.send(Err(SyncError::Timeout)).unwrap();
        let err = controller.reorder_lecture("c2", 0, 1).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Sync(SyncError::RolledBack { operation_id: 2, .. })
        ));

        let model = controller.model().await;
        assert_eq!(lecture_ids(&model, 0), vec!["c1-l2", "c1-l3", "c1-l1"]);
        assert_eq!(lecture_ids(&model, 1), vec!["c2-l1", "c2-l2", "c2-l3"]);
    }

    #[tokio::test]
    async fn test_load_from_store() {
        let store = Arc::new(GatedStore {
            chapters: persisted_chapters().into_iter().rev().collect(),
            ..Default::default()
        });
        let controller = ReorderSyncController::load(store, "course-1").await.unwrap();
        let model = controller.model().await;
        assert_eq!(controller.scope_id(), "course-1");
        assert_eq!(model.chapters()[0].id, "c1");
        model.verify_invariants().unwrap();
    }

    #[test]
    fn test_position_updates_for_unknown_chapter() {
        let model = HierarchyModel::from_chapters(persisted_chapters());
        let err = position_updates(&model, &["c9".to_string()]).unwrap_err();
        assert_eq!(
            err,
            StructuralError::TargetNotFound {
                chapter_id: "c9".to_string()
            }
        );
    }
}
