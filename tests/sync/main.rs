//! Integration tests for import and optimistic reorder sync
//!
//! The backend is an in-memory store that persists bulk imports and applies
//! position updates, so tests can compare the local model with what the
//! store ended up holding.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lecture_organizer::app::client::{PlaylistFetcher, RemoteStore};
use lecture_organizer::app::models::{
    BulkImportResponse, CatalogItem, Chapter, ImportPayload, Lecture, PositionUpdate,
};
use lecture_organizer::app::session::OrganizerSession;
use lecture_organizer::app::sync::ReorderSyncController;
use lecture_organizer::errors::{AppError, FetchResult, SyncError, SyncResult};
use tokio::sync::oneshot;
use tokio_test::{assert_err, assert_ok};

struct StaticPlaylist(Vec<CatalogItem>);

#[async_trait]
impl PlaylistFetcher for StaticPlaylist {
    async fn fetch_playlist(&self, _playlist_url: &str) -> FetchResult<Vec<CatalogItem>> {
        Ok(self.0.clone())
    }
}

/// Backend that keeps chapters in memory
#[derive(Default)]
struct MemoryStore {
    chapters: Mutex<Vec<Chapter>>,
    /// Lecture id -> owning chapter id
    membership: Mutex<HashMap<String, String>>,
    failing_chapters: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

impl MemoryStore {
    fn fail_chapter(&self, chapter_id: &str) {
        self.failing_chapters
            .lock()
            .unwrap()
            .insert(chapter_id.to_string());
    }

    fn hold_chapter(&self, chapter_id: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(chapter_id.to_string(), rx);
        tx
    }

    fn titles(&self, chapter_id: &str) -> Vec<String> {
        let chapters = self.chapters.lock().unwrap();
        let membership = self.membership.lock().unwrap();
        let mut lectures: Vec<Lecture> = chapters
            .iter()
            .flat_map(|c| c.lectures.iter().cloned())
            .filter(|l| membership.get(l.id.as_str()).map(String::as_str) == Some(chapter_id))
            .collect();
        lectures.sort_by_key(|l| l.position);
        lectures.into_iter().map(|l| l.title).collect()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn bulk_import(
        &self,
        scope_id: &str,
        payload: &[ImportPayload],
    ) -> SyncResult<BulkImportResponse> {
        let mut chapters: Vec<Chapter> = Vec::new();
        let mut membership = HashMap::new();
        for (n, record) in payload.iter().enumerate() {
            if chapters.last().map(|c| c.number) != Some(record.chapter_number) {
                let mut chapter = Chapter::with_id(
                    format!("{}-ch{}", scope_id, record.chapter_number),
                    record.chapter_name.clone(),
                );
                chapter.number = record.chapter_number;
                chapters.push(chapter);
            }
            let mut lecture = Lecture::persisted(
                format!("lec-{}", n + 1),
                record.title.clone(),
                record.external_url.clone(),
                record.duration_seconds,
            );
            lecture.position = record.lecture_number;
            if let Some(chapter) = chapters.last_mut() {
                membership.insert(lecture.id.to_string(), chapter.id.clone());
                chapter.lectures.push(lecture);
            }
        }
        *self.chapters.lock().unwrap() = chapters;
        *self.membership.lock().unwrap() = membership;
        Ok(BulkImportResponse {
            success: true,
            message: format!("{} lectures created", payload.len()),
        })
    }

    async fn set_positions(&self, _scope_id: &str, updates: &[PositionUpdate]) -> SyncResult<()> {
        let gate = updates
            .first()
            .and_then(|u| self.gates.lock().unwrap().remove(&u.chapter_id));
        if let Some(rx) = gate {
            let _ = rx.await;
        }

        let failing = self.failing_chapters.lock().unwrap().clone();
        if updates.iter().any(|u| failing.contains(&u.chapter_id)) {
            return Err(SyncError::Status { status: 409 });
        }

        let mut chapters = self.chapters.lock().unwrap();
        let mut membership = self.membership.lock().unwrap();
        for update in updates {
            for lecture in chapters.iter_mut().flat_map(|c| c.lectures.iter_mut()) {
                if lecture.id.as_str() == update.lecture_id {
                    lecture.position = update.position;
                    membership.insert(update.lecture_id.clone(), update.chapter_id.clone());
                }
            }
        }
        Ok(())
    }

    async fn list_chapters(&self, _scope_id: &str) -> SyncResult<Vec<Chapter>> {
        Ok(self.chapters.lock().unwrap().clone())
    }

    async fn list_unique_tags(&self) -> SyncResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn search_lectures(&self, _query: &str) -> SyncResult<Vec<Lecture>> {
        Ok(Vec::new())
    }
}

fn playlist(count: usize) -> Vec<CatalogItem> {
    (0..count)
        .map(|i| CatalogItem {
            id: format!("v{}", i),
            title: format!("Talk {}", i + 1),
            description: String::new(),
            duration_seconds: 600,
            thumbnail_url: String::new(),
            external_url: format!("https://video.example/{}", i),
            source_index: i,
        })
        .collect()
}

async fn imported_course(store: &Arc<MemoryStore>, items: usize, size: usize) -> ReorderSyncController {
    let fetcher = StaticPlaylist(playlist(items));
    let mut session = assert_ok!(
        OrganizerSession::from_playlist(&fetcher, "https://list", "algo", "Chapter").await
    );
    assert_ok!(session.auto_partition(size));
    let summary = assert_ok!(session.submit(store.as_ref()).await);
    assert_eq!(summary.lectures, items);

    let remote: Arc<dyn RemoteStore> = Arc::clone(store) as Arc<dyn RemoteStore>;
    assert_ok!(ReorderSyncController::load(remote, "algo").await)
}

fn local_titles(model: &lecture_organizer::app::HierarchyModel, chapter_id: &str) -> Vec<String> {
    model
        .chapter(chapter_id)
        .map(|c| c.lectures.iter().map(|l| l.title.clone()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_import_then_reorder_stays_in_sync() {
    let store = Arc::new(MemoryStore::default());
    let controller = imported_course(&store, 6, 3).await;

    let model = controller.model().await;
    assert_eq!(model.chapters().len(), 2);
    assert_eq!(model.staged_lecture_count(), 0);

    assert_ok!(controller.reorder_lecture("algo-ch1", 2, 0).await);
    assert_ok!(controller.move_lecture("algo-ch1", 0, "algo-ch2", 3).await);

    let model = controller.model().await;
    assert_ok!(model.verify_invariants());
    assert_eq!(local_titles(&model, "algo-ch1"), vec!["Talk 1", "Talk 2"]);
    assert_eq!(
        local_titles(&model, "algo-ch2"),
        vec!["Talk 4", "Talk 5", "Talk 6", "Talk 3"]
    );
    assert_eq!(store.titles("algo-ch1"), local_titles(&model, "algo-ch1"));
    assert_eq!(store.titles("algo-ch2"), local_titles(&model, "algo-ch2"));
}

#[tokio::test]
async fn test_rejected_reorder_rolls_back_to_store_state() {
    let store = Arc::new(MemoryStore::default());
    let controller = imported_course(&store, 4, 2).await;
    let before = controller.model().await;

    store.fail_chapter("algo-ch2");
    let err = assert_err!(controller.reorder_lecture("algo-ch2", 0, 1).await);

    assert!(err.is_recoverable());
    assert!(err.user_message().contains("undone"));
    match err {
        AppError::Sync(e) => assert!(matches!(e.root_cause(), SyncError::Status { status: 409 })),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(controller.model().await, before);
    assert_eq!(store.titles("algo-ch2"), vec!["Talk 3", "Talk 4"]);
}

#[tokio::test]
async fn test_confirmed_change_survives_failure_in_other_chapter() {
    let store = Arc::new(MemoryStore::default());
    let controller = imported_course(&store, 4, 2).await;

    store.fail_chapter("algo-ch1");
    let release = store.hold_chapter("algo-ch1");

    let (first, second, _) = futures::join!(
        controller.reorder_lecture("algo-ch1", 0, 1),
        controller.reorder_lecture("algo-ch2", 0, 1),
        async {
            tokio::task::yield_now().await;
            let _ = release.send(());
        }
    );

    // The second operation was confirmed before the first one failed
    assert!(matches!(
        first,
        Err(AppError::Sync(SyncError::RolledBack { operation_id: 1, .. }))
    ));
    let report = assert_ok!(second);
    assert_eq!(report.operation_id, 2);

    let model = controller.model().await;
    assert_eq!(local_titles(&model, "algo-ch1"), vec!["Talk 1", "Talk 2"]);
    assert_eq!(local_titles(&model, "algo-ch2"), vec!["Talk 4", "Talk 3"]);

    let stats = controller.stats().await;
    assert_eq!(stats.confirmed, 1);
    assert_eq!(stats.rolled_back, 1);
    assert_eq!(stats.discarded, 0);
    assert_eq!(controller.in_flight_count().await, 0);
}
