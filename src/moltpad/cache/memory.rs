use super::{decode, format, BookCache, CacheIndex, CachedText, DEFAULT_STALENESS_DAYS};
use crate::error::Result;
use crate::model::{BookMetadata, CacheEntry, ChapterSummary};
use chrono::{Duration, Utc};
use std::collections::BTreeMap;

/// In-memory cache for tests. Keeps the same text the file cache writes,
/// so index scans behave identically.
pub struct InMemoryCache {
    entries: BTreeMap<String, String>,
    staleness: Duration,
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            staleness: Duration::days(DEFAULT_STALENESS_DAYS),
        }
    }
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_staleness(mut self, staleness: Duration) -> Self {
        self.staleness = staleness;
        self
    }

    /// Stores raw text as-is, bypassing the codec.
    pub fn insert_raw(&mut self, book_id: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(book_id.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BookCache for InMemoryCache {
    fn get(&self, book_id: &str) -> Result<Option<CacheEntry>> {
        Ok(self
            .entries
            .get(book_id)
            .and_then(|text| decode(book_id, text)))
    }

    fn put(&mut self, book: &BookMetadata, chapters: &[ChapterSummary]) -> Result<CacheEntry> {
        let entry = CacheEntry::new(book, chapters, Utc::now());
        self.entries
            .insert(book.id.clone(), format::to_text(&entry));
        Ok(entry)
    }

    fn remove(&mut self, book_id: &str) -> Result<()> {
        self.entries.remove(book_id);
        Ok(())
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.is_fresh_at(Utc::now(), self.staleness)
    }
}

impl CacheIndex for InMemoryCache {
    fn find_referencing(&self, id: &str) -> Result<Option<CachedText>> {
        Ok(self
            .entries
            .iter()
            .find(|(_, text)| text.contains(id))
            .map(|(book_id, text)| CachedText {
                book_id: book_id.clone(),
                text: text.clone(),
            }))
    }
}
