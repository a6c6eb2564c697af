//! JSON shapes of the backend endpoints

use serde::{Deserialize, Serialize};

use crate::app::models::{CatalogItem, Chapter, Lecture, LectureId};
use crate::app::tags::TagSet;

/// Body of the playlist lookup endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistResponse {
    pub items: Vec<PlaylistEntry>,
}

/// One video of a playlist as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration_seconds: u64,
    #[serde(default)]
    pub thumbnail_url: String,
    pub external_url: String,
}

impl PlaylistResponse {
    /// Convert to catalog items, numbering them in playlist order
    pub fn into_catalog_items(self) -> Vec<CatalogItem> {
        self.items
            .into_iter()
            .enumerate()
            .map(|(source_index, entry)| CatalogItem {
                id: entry.id,
                title: entry.title,
                description: entry.description,
                duration_seconds: entry.duration_seconds,
                thumbnail_url: entry.thumbnail_url,
                external_url: entry.external_url,
                source_index,
            })
            .collect()
    }
}

/// A persisted chapter with its lectures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteChapter {
    pub id: String,
    pub name: String,
    pub number: u32,
    #[serde(default)]
    pub lectures: Vec<RemoteLecture>,
}

/// A persisted lecture
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteLecture {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub external_url: String,
    #[serde(default)]
    pub duration_seconds: u64,
    pub position: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl From<RemoteLecture> for Lecture {
    fn from(remote: RemoteLecture) -> Self {
        Lecture {
            id: LectureId::persisted(remote.id),
            title: remote.title,
            description: remote.description,
            external_url: remote.external_url,
            duration_seconds: remote.duration_seconds,
            position: remote.position,
            tags: TagSet::from(remote.tags),
            catalog_id: None,
            thumbnail_url: remote.thumbnail_url,
            source_index: None,
        }
    }
}

impl From<RemoteChapter> for Chapter {
    fn from(remote: RemoteChapter) -> Self {
        Chapter {
            id: remote.id,
            name: remote.name,
            number: remote.number,
            lectures: remote.lectures.into_iter().map(Lecture::from).collect(),
        }
    }
}
