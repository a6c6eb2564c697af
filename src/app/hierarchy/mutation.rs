//! Hierarchy operations as values
//!
//! A `Mutation` is an assignment or chapter operation bound to its
//! arguments. The sync controller receives mutations as data so it can pick
//! a snapshot scope and the chapters whose positions must be sent remotely.

use serde::{Deserialize, Serialize};

use crate::errors::StructuralResult;

use super::model::HierarchyModel;

/// An operation on the hierarchy with all of its arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    AddChapter {
        name: String,
    },
    RemoveChapter {
        chapter_id: String,
    },
    RenameChapter {
        chapter_id: String,
        name: String,
    },
    MoveToChapter {
        item_id: String,
        chapter_id: String,
    },
    RemoveFromChapter {
        chapter_id: String,
        lecture_index: usize,
    },
    ReorderWithinChapter {
        chapter_id: String,
        from_index: usize,
        to_index: usize,
    },
    MoveBetweenChapters {
        from_chapter_id: String,
        lecture_index: usize,
        to_chapter_id: String,
        to_index: usize,
    },
    AutoPartition {
        target_size: usize,
    },
}

impl Mutation {
    /// Apply to the model; on error the model is unchanged
    pub fn apply(&self, model: &mut HierarchyModel) -> StructuralResult<()> {
        match self {
            Mutation::AddChapter { name } => {
                model.add_chapter(name.clone());
                Ok(())
            }
            Mutation::RemoveChapter { chapter_id } => model.remove_chapter(chapter_id).map(|_| ()),
            Mutation::RenameChapter { chapter_id, name } => {
                model.rename_chapter(chapter_id, name.clone())
            }
            Mutation::MoveToChapter {
                item_id,
                chapter_id,
            } => model.assign().move_to_chapter(item_id, chapter_id),
            Mutation::RemoveFromChapter {
                chapter_id,
                lecture_index,
            } => model.assign().remove_from_chapter(chapter_id, *lecture_index),
            Mutation::ReorderWithinChapter {
                chapter_id,
                from_index,
                to_index,
            } => model
                .assign()
                .reorder_within_chapter(chapter_id, *from_index, *to_index),
            Mutation::MoveBetweenChapters {
                from_chapter_id,
                lecture_index,
                to_chapter_id,
                to_index,
            } => model.assign().move_between_chapters(
                from_chapter_id,
                *lecture_index,
                to_chapter_id,
                *to_index,
            ),
            Mutation::AutoPartition { target_size } => {
                model.assign().auto_partition(*target_size).map(|_| ())
            }
        }
    }

    /// Chapter touched by this mutation when it is confined to one chapter
    pub fn single_chapter_scope(&self) -> Option<&str> {
        match self {
            Mutation::ReorderWithinChapter { chapter_id, .. } => Some(chapter_id.as_str()),
            Mutation::MoveBetweenChapters {
                from_chapter_id,
                to_chapter_id,
                ..
            } if from_chapter_id == to_chapter_id => Some(from_chapter_id.as_str()),
            _ => None,
        }
    }

    /// Chapters whose lecture order this mutation changes
    pub fn affected_chapters(&self) -> Vec<&str> {
        match self {
            Mutation::MoveToChapter { chapter_id, .. }
            | Mutation::RemoveFromChapter { chapter_id, .. }
            | Mutation::ReorderWithinChapter { chapter_id, .. } => vec![chapter_id.as_str()],
            Mutation::MoveBetweenChapters {
                from_chapter_id,
                to_chapter_id,
                ..
            } => {
                if from_chapter_id == to_chapter_id {
                    vec![from_chapter_id.as_str()]
                } else {
                    vec![from_chapter_id.as_str(), to_chapter_id.as_str()]
                }
            }
            Mutation::AddChapter { .. }
            | Mutation::RemoveChapter { .. }
            | Mutation::RenameChapter { .. }
            | Mutation::AutoPartition { .. } => Vec::new(),
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddChapter { .. } => "add_chapter",
            Mutation::RemoveChapter { .. } => "remove_chapter",
            Mutation::RenameChapter { .. } => "rename_chapter",
            Mutation::MoveToChapter { .. } => "move_to_chapter",
            Mutation::RemoveFromChapter { .. } => "remove_from_chapter",
            Mutation::ReorderWithinChapter { .. } => "reorder_within_chapter",
            Mutation::MoveBetweenChapters { .. } => "move_between_chapters",
            Mutation::AutoPartition { .. } => "auto_partition",
        }
    }
}
