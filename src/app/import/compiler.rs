//! Hierarchy to bulk-create payload

use std::collections::BTreeMap;

use tracing::debug;

use crate::app::hierarchy::HierarchyModel;
use crate::app::models::{CatalogItem, Chapter, ImportPayload, Lecture};
use crate::errors::{StructuralError, StructuralResult};

/// Compiles staged chapters into import records
#[derive(Debug, Clone, Default)]
pub struct BulkImportCompiler;

impl BulkImportCompiler {
    /// Flatten the model into one record per staged lecture
    ///
    /// Chapters are emitted in number order and lectures in position order.
    /// Persisted lectures already exist remotely and are skipped, as are
    /// chapters that end up contributing nothing.
    ///
    /// # Errors
    ///
    /// `EmptyImport` when no chapter holds a staged lecture.
    pub fn compile(model: &HierarchyModel) -> StructuralResult<Vec<ImportPayload>> {
        let mut chapters: Vec<&Chapter> = model.chapters().iter().collect();
        chapters.sort_by_key(|c| c.number);

        let mut payload = Vec::with_capacity(model.staged_lecture_count());
        for chapter in chapters {
            let mut lectures: Vec<&Lecture> = chapter
                .lectures
                .iter()
                .filter(|l| !l.is_persisted())
                .collect();
            lectures.sort_by_key(|l| l.position);

            payload.extend(lectures.into_iter().map(|lecture| ImportPayload {
                title: lecture.title.clone(),
                description: lecture.description.clone(),
                external_url: lecture.external_url.clone(),
                duration_seconds: lecture.duration_seconds,
                chapter_name: chapter.name.clone(),
                chapter_number: chapter.number,
                lecture_number: lecture.position,
            }));
        }

        if payload.is_empty() {
            return Err(StructuralError::EmptyImport);
        }

        debug!("Compiled {} import records", payload.len());
        Ok(payload)
    }
}

impl HierarchyModel {
    /// Rebuild a staged hierarchy from import records
    ///
    /// Records are grouped by chapter number and ordered by lecture number.
    /// Identifiers are generated fresh since they are not part of the payload.
    pub fn from_payload(records: &[ImportPayload]) -> Self {
        let mut grouped: BTreeMap<u32, (String, Vec<&ImportPayload>)> = BTreeMap::new();
        for record in records {
            grouped
                .entry(record.chapter_number)
                .or_insert_with(|| (record.chapter_name.clone(), Vec::new()))
                .1
                .push(record);
        }

        let mut source_index = 0;
        let chapters = grouped
            .into_iter()
            .map(|(number, (name, mut lectures))| {
                lectures.sort_by_key(|r| r.lecture_number);
                let mut chapter = Chapter::new(name);
                chapter.number = number;
                for record in lectures {
                    chapter.lectures.push(Lecture::from_catalog_item(CatalogItem {
                        id: record.external_url.clone(),
                        title: record.title.clone(),
                        description: record.description.clone(),
                        duration_seconds: record.duration_seconds,
                        thumbnail_url: String::new(),
                        external_url: record.external_url.clone(),
                        source_index,
                    }));
                    source_index += 1;
                }
                chapter
            })
            .collect();

        HierarchyModel::from_chapters(chapters)
    }
}
