//! Pre-mutation captures used for rollback

use crate::app::hierarchy::{HierarchyModel, Mutation};
use crate::app::models::Lecture;
use crate::errors::StructuralResult;

/// Deep copy of the state a mutation is about to change
///
/// Mutations confined to one chapter only capture that chapter's lecture
/// order; everything else captures the whole model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Model(HierarchyModel),
    Chapter {
        chapter_id: String,
        lectures: Vec<Lecture>,
    },
}

impl Snapshot {
    /// Capture the smallest scope that covers `mutation`
    pub fn capture(model: &HierarchyModel, mutation: &Mutation) -> Self {
        if let Some(chapter) = mutation
            .single_chapter_scope()
            .and_then(|chapter_id| model.chapter(chapter_id))
        {
            return Snapshot::Chapter {
                chapter_id: chapter.id.clone(),
                lectures: chapter.lectures.clone(),
            };
        }
        Snapshot::Model(model.clone())
    }

    /// Put the captured state back into the model
    ///
    /// # Errors
    ///
    /// `TargetNotFound` if a chapter snapshot's chapter no longer exists; the
    /// model is left untouched.
    pub fn restore(self, model: &mut HierarchyModel) -> StructuralResult<()> {
        match self {
            Snapshot::Model(saved) => {
                *model = saved;
                Ok(())
            }
            Snapshot::Chapter {
                chapter_id,
                lectures,
            } => model.replace_lectures(&chapter_id, lectures),
        }
    }

    pub fn is_chapter_scoped(&self) -> bool {
        matches!(self, Snapshot::Chapter { .. })
    }
}
