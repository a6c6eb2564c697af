//! In-memory chapter/lecture tree and unassigned pool
//!
//! The model owns both numbering invariants: chapter numbers are `1..=N` in
//! array order and, inside every chapter, lecture positions are `1..=M` in
//! array order. Both are recomputed from array order after every structural
//! mutation instead of being patched incrementally.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::models::{CatalogItem, Chapter, Lecture};
use crate::constants::organizer;
use crate::errors::{StructuralError, StructuralResult};

/// Chapters plus the pool of catalog items not yet placed in a chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyModel {
    chapters: Vec<Chapter>,
    unassigned_pool: Vec<CatalogItem>,
    chapter_prefix: String,
}

impl Default for HierarchyModel {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchyModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self {
            chapters: Vec::new(),
            unassigned_pool: Vec::new(),
            chapter_prefix: organizer::DEFAULT_CHAPTER_PREFIX.to_string(),
        }
    }

    /// Create a model whose pool holds the given catalog items
    ///
    /// Items are ordered by `source_index`.
    pub fn with_pool(items: Vec<CatalogItem>) -> Self {
        let mut model = Self::new();
        model.unassigned_pool = items;
        model.sort_pool();
        model
    }

    /// Create a model from chapters loaded from the remote store
    ///
    /// Chapters are taken in their `number` order and lectures in their
    /// `position` order, then both are renumbered to be contiguous.
    pub fn from_chapters(mut chapters: Vec<Chapter>) -> Self {
        chapters.sort_by_key(|c| c.number);
        for chapter in &mut chapters {
            chapter.lectures.sort_by_key(|l| l.position);
        }
        let mut model = Self::new();
        model.chapters = chapters;
        model.renumber();
        model
    }

    /// Use a custom prefix for auto-partitioned chapter names
    pub fn with_chapter_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.chapter_prefix = prefix.into();
        self
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn unassigned_pool(&self) -> &[CatalogItem] {
        &self.unassigned_pool
    }

    pub fn chapter_prefix(&self) -> &str {
        &self.chapter_prefix
    }

    /// Look up a chapter by id
    pub fn chapter(&self, chapter_id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == chapter_id)
    }

    /// Index of a chapter in the chapter list
    pub fn chapter_index(&self, chapter_id: &str) -> StructuralResult<usize> {
        self.chapters
            .iter()
            .position(|c| c.id == chapter_id)
            .ok_or_else(|| StructuralError::TargetNotFound {
                chapter_id: chapter_id.to_string(),
            })
    }

    /// Total number of lectures across all chapters
    pub fn lecture_count(&self) -> usize {
        self.chapters.iter().map(|c| c.lectures.len()).sum()
    }

    /// Number of lectures that only exist locally
    pub fn staged_lecture_count(&self) -> usize {
        self.chapters
            .iter()
            .flat_map(|c| c.lectures.iter())
            .filter(|l| !l.is_persisted())
            .count()
    }

    /// Append a new empty chapter numbered after the existing ones
    pub fn add_chapter(&mut self, name: impl Into<String>) -> &Chapter {
        let mut chapter = Chapter::new(name);
        chapter.number = self.chapters.len() as u32 + 1;
        debug!("Adding chapter {} ({})", chapter.number, chapter.name);
        self.chapters.push(chapter);
        &self.chapters[self.chapters.len() - 1]
    }

    /// Delete a chapter, returning its lectures to the pool
    ///
    /// Returns the number of catalog items returned to the pool.
    pub fn remove_chapter(&mut self, chapter_id: &str) -> StructuralResult<usize> {
        let index = self.chapter_index(chapter_id)?;
        let chapter = self.chapters.remove(index);
        let returned = chapter.lectures.len();

        for lecture in chapter.lectures {
            self.return_to_pool(&lecture);
        }
        self.renumber();

        debug!(
            "Removed chapter {} ({}), {} lectures returned to pool",
            chapter.number, chapter.name, returned
        );
        Ok(returned)
    }

    /// Rename a chapter; no ordering effect
    pub fn rename_chapter(&mut self, chapter_id: &str, name: impl Into<String>) -> StructuralResult<()> {
        let index = self.chapter_index(chapter_id)?;
        let name = name.into();
        debug!("Renaming chapter {} to {}", self.chapters[index].number, name);
        self.chapters[index].name = name;
        Ok(())
    }

    /// Add a normalized tag to a lecture, returning true if it was new
    pub fn tag_lecture(
        &mut self,
        chapter_id: &str,
        lecture_index: usize,
        tag: &str,
    ) -> StructuralResult<bool> {
        let ci = self.chapter_index(chapter_id)?;
        self.check_lecture_index(ci, lecture_index)?;
        Ok(self.chapters[ci].lectures[lecture_index].tags.insert(tag))
    }

    /// Check I1 and I2
    pub fn verify_invariants(&self) -> StructuralResult<()> {
        for (index, chapter) in self.chapters.iter().enumerate() {
            let expected = index as u32 + 1;
            if chapter.number != expected {
                return Err(StructuralError::InvariantViolation {
                    reason: format!(
                        "chapter {} has number {}, expected {}",
                        chapter.id, chapter.number, expected
                    ),
                });
            }
            for (li, lecture) in chapter.lectures.iter().enumerate() {
                let expected = li as u32 + 1;
                if lecture.position != expected {
                    return Err(StructuralError::InvariantViolation {
                        reason: format!(
                            "lecture {} in chapter {} has position {}, expected {}",
                            lecture.id, chapter.id, lecture.position, expected
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Recompute chapter numbers and lecture positions from array order
    pub(crate) fn renumber(&mut self) {
        for (index, chapter) in self.chapters.iter_mut().enumerate() {
            chapter.number = index as u32 + 1;
            chapter.renumber_lectures();
        }
    }

    pub(crate) fn chapters_mut(&mut self) -> &mut Vec<Chapter> {
        &mut self.chapters
    }

    pub(crate) fn pool_mut(&mut self) -> &mut Vec<CatalogItem> {
        &mut self.unassigned_pool
    }

    pub(crate) fn check_lecture_index(&self, chapter_index: usize, lecture_index: usize) -> StructuralResult<()> {
        let chapter = &self.chapters[chapter_index];
        if lecture_index >= chapter.lectures.len() {
            return Err(StructuralError::IndexOutOfRange {
                chapter_id: chapter.id.clone(),
                index: lecture_index,
                len: chapter.lectures.len(),
            });
        }
        Ok(())
    }

    /// Turn a lecture back into a catalog item at the end of the pool
    pub(crate) fn return_to_pool(&mut self, lecture: &Lecture) {
        let fallback = self.next_source_index();
        self.unassigned_pool.push(lecture.to_catalog_item(fallback));
    }

    /// Replace one chapter's lecture list wholesale
    pub(crate) fn replace_lectures(
        &mut self,
        chapter_id: &str,
        lectures: Vec<Lecture>,
    ) -> StructuralResult<()> {
        let index = self.chapter_index(chapter_id)?;
        self.chapters[index].lectures = lectures;
        self.chapters[index].renumber_lectures();
        Ok(())
    }

    pub(crate) fn sort_pool(&mut self) {
        self.unassigned_pool.sort_by_key(|item| item.source_index);
    }

    fn next_source_index(&self) -> usize {
        self.unassigned_pool
            .iter()
            .map(|item| item.source_index + 1)
            .max()
            .unwrap_or(0)
    }
}
