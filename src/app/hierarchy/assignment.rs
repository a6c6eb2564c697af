//! Moves between the unassigned pool and chapters
//!
//! Every operation validates all of its inputs before touching the model, so
//! a failed call leaves the model exactly as it was. Every successful call
//! ends with a full renumber of the affected chapters.

use tracing::debug;

use crate::app::models::Lecture;
use crate::errors::{StructuralError, StructuralResult};

use super::model::HierarchyModel;

/// Assignment operations over a borrowed hierarchy
#[derive(Debug)]
pub struct AssignmentEngine<'a> {
    model: &'a mut HierarchyModel,
}

impl<'a> AssignmentEngine<'a> {
    pub fn new(model: &'a mut HierarchyModel) -> Self {
        Self { model }
    }

    /// Move a pool item to the end of a chapter as a staged lecture
    ///
    /// # Errors
    ///
    /// `TargetNotFound` if the chapter does not exist, `ItemNotInPool` if the
    /// item has already been placed or never was in the pool.
    pub fn move_to_chapter(&mut self, item_id: &str, chapter_id: &str) -> StructuralResult<()> {
        let ci = self.model.chapter_index(chapter_id)?;
        let pool_index = self
            .model
            .unassigned_pool()
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| StructuralError::ItemNotInPool {
                item_id: item_id.to_string(),
            })?;

        let item = self.model.pool_mut().remove(pool_index);
        let chapter = &mut self.model.chapters_mut()[ci];
        chapter.lectures.push(Lecture::from_catalog_item(item));
        chapter.renumber_lectures();

        debug!(
            "Moved item {} into chapter {} at position {}",
            item_id,
            chapter.number,
            chapter.lectures.len()
        );
        Ok(())
    }

    /// Remove a lecture from a chapter and return it to the pool
    ///
    /// Empty chapters are kept; only `remove_chapter` deletes chapters.
    pub fn remove_from_chapter(&mut self, chapter_id: &str, lecture_index: usize) -> StructuralResult<()> {
        let ci = self.model.chapter_index(chapter_id)?;
        self.model.check_lecture_index(ci, lecture_index)?;

        let lecture = self.model.chapters_mut()[ci].lectures.remove(lecture_index);
        self.model.chapters_mut()[ci].renumber_lectures();
        self.model.return_to_pool(&lecture);

        debug!(
            "Removed lecture {} from chapter {}, returned to pool",
            lecture.id, chapter_id
        );
        Ok(())
    }

    /// Splice-move a lecture inside one chapter
    pub fn reorder_within_chapter(
        &mut self,
        chapter_id: &str,
        from_index: usize,
        to_index: usize,
    ) -> StructuralResult<()> {
        let ci = self.model.chapter_index(chapter_id)?;
        self.model.check_lecture_index(ci, from_index)?;
        self.model.check_lecture_index(ci, to_index)?;

        if from_index == to_index {
            return Ok(());
        }

        let chapter = &mut self.model.chapters_mut()[ci];
        let lecture = chapter.lectures.remove(from_index);
        chapter.lectures.insert(to_index, lecture);
        chapter.renumber_lectures();

        debug!(
            "Reordered chapter {}: {} -> {}",
            chapter.number,
            from_index + 1,
            to_index + 1
        );
        Ok(())
    }

    /// Move a lecture from one chapter into another at `to_index`
    ///
    /// `to_index` may equal the target length to append. Same-chapter moves
    /// are reorders.
    pub fn move_between_chapters(
        &mut self,
        from_chapter_id: &str,
        lecture_index: usize,
        to_chapter_id: &str,
        to_index: usize,
    ) -> StructuralResult<()> {
        if from_chapter_id == to_chapter_id {
            return self.reorder_within_chapter(from_chapter_id, lecture_index, to_index);
        }

        let from = self.model.chapter_index(from_chapter_id)?;
        let to = self.model.chapter_index(to_chapter_id)?;
        self.model.check_lecture_index(from, lecture_index)?;

        let target_len = self.model.chapters()[to].lectures.len();
        if to_index > target_len {
            return Err(StructuralError::IndexOutOfRange {
                chapter_id: to_chapter_id.to_string(),
                index: to_index,
                len: target_len,
            });
        }

        let chapters = self.model.chapters_mut();
        let lecture = chapters[from].lectures.remove(lecture_index);
        let lecture_id = lecture.id.clone();
        chapters[to].lectures.insert(to_index, lecture);
        chapters[from].renumber_lectures();
        chapters[to].renumber_lectures();

        debug!(
            "Moved lecture {} from chapter {} to chapter {} at position {}",
            lecture_id,
            chapters[from].number,
            chapters[to].number,
            to_index + 1
        );
        Ok(())
    }

    /// Split the pool into new chapters of `target_size` items each
    ///
    /// Items are taken in playlist order; the last chapter may be shorter.
    /// Returns the ids of the chapters created. An empty pool creates
    /// nothing, so repeating the call is harmless.
    pub fn auto_partition(&mut self, target_size: usize) -> StructuralResult<Vec<String>> {
        if target_size == 0 {
            return Err(StructuralError::InvalidPartitionSize);
        }

        self.model.sort_pool();
        let items: Vec<_> = self.model.pool_mut().drain(..).collect();
        let mut created = Vec::with_capacity(items.len().div_ceil(target_size));

        for group in items.chunks(target_size) {
            let number = self.model.chapters().len() + 1;
            let name = format!("{} {}", self.model.chapter_prefix(), number);
            let chapter_id = self.model.add_chapter(name).id.clone();

            let chapter = &mut self.model.chapters_mut()[number - 1];
            chapter
                .lectures
                .extend(group.iter().cloned().map(Lecture::from_catalog_item));
            chapter.renumber_lectures();
            created.push(chapter_id);
        }

        debug!(
            "Auto-partitioned {} items into {} chapters of up to {}",
            items.len(),
            created.len(),
            target_size
        );
        Ok(created)
    }
}

impl HierarchyModel {
    /// Borrow the model for assignment operations
    pub fn assign(&mut self) -> AssignmentEngine<'_> {
        AssignmentEngine::new(self)
    }
}
