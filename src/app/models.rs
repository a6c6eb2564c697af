//! Data models for Lecture Organizer
//!
//! This module defines the catalog items fetched from an external playlist,
//! the lectures and chapters that make up the hierarchy, and the wire records
//! exchanged with the remote course store.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::tags::TagSet;
use crate::constants::organizer;

/// A video entry from an external playlist
///
/// Immutable once fetched. `source_index` is the position in the original
/// playlist and drives deterministic auto-partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// External video identifier
    pub id: String,
    /// Video title
    pub title: String,
    /// Video description
    pub description: String,
    /// Duration in seconds
    pub duration_seconds: u64,
    /// Thumbnail image URL
    pub thumbnail_url: String,
    /// Watch URL on the external platform
    pub external_url: String,
    /// Zero-based index in the source playlist
    pub source_index: usize,
}

/// Identifier of a lecture, local or server assigned
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum LectureId {
    /// Locally generated id of a lecture that only exists in the organizer
    Staged(String),
    /// Server-assigned id of a persisted lecture
    Persisted(String),
}

impl LectureId {
    /// Generate a fresh temporary id
    pub fn staged() -> Self {
        LectureId::Staged(format!(
            "{}{}",
            organizer::STAGED_LECTURE_PREFIX,
            Uuid::new_v4()
        ))
    }

    /// Wrap a server-assigned id
    pub fn persisted(id: impl Into<String>) -> Self {
        LectureId::Persisted(id.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            LectureId::Staged(id) | LectureId::Persisted(id) => id,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, LectureId::Persisted(_))
    }
}

impl fmt::Display for LectureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A positioned leaf of the hierarchy
///
/// `position` is 1-based and always equals the lecture's index in its
/// chapter plus one; it is recomputed by the hierarchy after every mutation
/// and never set independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: LectureId,
    pub title: String,
    pub description: String,
    pub external_url: String,
    pub duration_seconds: u64,
    pub position: u32,
    /// Normalized tags attached to this lecture
    #[serde(default)]
    pub tags: TagSet,
    /// Catalog item this staged lecture was created from
    #[serde(default)]
    pub catalog_id: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub source_index: Option<usize>,
}

impl Lecture {
    /// Stage a catalog item as a not-yet-persisted lecture
    pub fn from_catalog_item(item: CatalogItem) -> Self {
        Self {
            id: LectureId::staged(),
            title: item.title,
            description: item.description,
            external_url: item.external_url,
            duration_seconds: item.duration_seconds,
            position: 0,
            tags: TagSet::new(),
            catalog_id: Some(item.id),
            thumbnail_url: Some(item.thumbnail_url),
            source_index: Some(item.source_index),
        }
    }

    /// Build a persisted lecture record as returned by the remote store
    pub fn persisted(
        id: impl Into<String>,
        title: impl Into<String>,
        external_url: impl Into<String>,
        duration_seconds: u64,
    ) -> Self {
        Self {
            id: LectureId::persisted(id),
            title: title.into(),
            description: String::new(),
            external_url: external_url.into(),
            duration_seconds,
            position: 0,
            tags: TagSet::new(),
            catalog_id: None,
            thumbnail_url: None,
            source_index: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_persisted()
    }

    /// Reconstruct the catalog item this lecture stands for
    ///
    /// Lectures that never came from the pool take `fallback_index` as their
    /// source index so they sort after everything already there.
    pub fn to_catalog_item(&self, fallback_index: usize) -> CatalogItem {
        CatalogItem {
            id: self
                .catalog_id
                .clone()
                .unwrap_or_else(|| self.id.as_str().to_string()),
            title: self.title.clone(),
            description: self.description.clone(),
            duration_seconds: self.duration_seconds,
            thumbnail_url: self.thumbnail_url.clone().unwrap_or_default(),
            external_url: self.external_url.clone(),
            source_index: self.source_index.unwrap_or(fallback_index),
        }
    }
}

/// A numbered, ordered container of lectures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub name: String,
    /// 1-based, contiguous across the hierarchy
    pub number: u32,
    pub lectures: Vec<Lecture>,
}

impl Chapter {
    /// Create an empty chapter with a locally generated id
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(
            format!("{}{}", organizer::LOCAL_CHAPTER_PREFIX, Uuid::new_v4()),
            name,
        )
    }

    /// Create an empty chapter with a known id
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            number: 0,
            lectures: Vec::new(),
        }
    }

    /// Recompute every lecture position from array order
    pub fn renumber_lectures(&mut self) {
        for (index, lecture) in self.lectures.iter_mut().enumerate() {
            lecture.position = index as u32 + 1;
        }
    }

    pub fn lecture_positions(&self) -> Vec<u32> {
        self.lectures.iter().map(|l| l.position).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lectures.is_empty()
    }

    pub fn total_duration_seconds(&self) -> u64 {
        self.lectures.iter().map(|l| l.duration_seconds).sum()
    }
}

/// One record of the bulk-create payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPayload {
    pub title: String,
    pub description: String,
    pub external_url: String,
    pub duration_seconds: u64,
    pub chapter_name: String,
    pub chapter_number: u32,
    pub lecture_number: u32,
}

/// Position assignment sent to the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdate {
    pub lecture_id: String,
    pub chapter_id: String,
    pub position: u32,
}

/// Response of the bulk-create endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkImportResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Format seconds as `h:mm:ss` or `m:ss`
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
