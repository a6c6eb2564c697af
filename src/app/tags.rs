//! Tag normalization and search query composition
//!
//! Tags are free-form tokens typed by users. Every token goes through the same
//! normalization (trim, lowercase, drop blanks) before it is stored on a
//! lecture or used to build a search query, so `"JS"`, `" js"` and `"Js "`
//! are one tag. The query separator cannot appear inside a tag, so raw input
//! containing it is split into several tags.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::constants::query;

/// A normalized, de-duplicated, ordered set of tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet {
    tokens: BTreeSet<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize raw input into its tags, splitting on the query separator
    ///
    /// Blank pieces are dropped, so `" , "` yields nothing.
    pub fn normalize(raw: &str) -> Vec<String> {
        raw.split(query::TAG_SEPARATOR)
            .map(|piece| piece.trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .collect()
    }

    /// Insert raw input, returning true if the set changed
    pub fn insert(&mut self, raw: &str) -> bool {
        let mut changed = false;
        for token in Self::normalize(raw) {
            changed |= self.tokens.insert(token);
        }
        changed
    }

    /// Remove raw input, returning true if any of its tags was present
    pub fn remove(&mut self, raw: &str) -> bool {
        let mut changed = false;
        for token in Self::normalize(raw) {
            changed |= self.tokens.remove(&token);
        }
        changed
    }

    /// True if raw input names at least one tag and all of them are present
    pub fn contains(&self, raw: &str) -> bool {
        let tokens = Self::normalize(raw);
        !tokens.is_empty() && tokens.iter().all(|token| self.tokens.contains(token))
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Tags joined with the query separator, in sorted order
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(query::TAG_SEPARATOR)
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for raw in iter {
            set.insert(raw.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for TagSet {
    fn from(raw: Vec<String>) -> Self {
        raw.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(set: TagSet) -> Self {
        set.tokens.into_iter().collect()
    }
}

/// Builds remote search queries from tag tokens and an optional course scope
#[derive(Debug, Clone, Default)]
pub struct TagFilterComposer;

impl TagFilterComposer {
    /// Compose a query string
    ///
    /// Returns an empty string when there are no usable tags and no scope,
    /// which tells the caller to clear filtering instead of searching.
    pub fn compose<S: AsRef<str>>(
        tag_tokens: impl IntoIterator<Item = S>,
        scope_id: Option<&str>,
    ) -> String {
        let tags: TagSet = tag_tokens.into_iter().collect();
        let scope = scope_id.map(str::trim).filter(|s| !s.is_empty());

        if tags.is_empty() && scope.is_none() {
            return String::new();
        }

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if !tags.is_empty() {
            serializer.append_pair(query::TAGS_PARAM, &tags.joined());
        }
        if let Some(scope) = scope {
            serializer.append_pair(query::SCOPE_PARAM, scope);
        }
        serializer.finish()
    }
}
