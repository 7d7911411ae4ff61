//! # Book Cache
//!
//! Reading a book produces a summary (metadata plus one preview line per
//! chapter) that is kept locally so repeated reads inside the staleness
//! window never hit the content service.
//!
//! Two capabilities are split out:
//!
//! - [`BookCache`]: keyed get / put / remove of [`CacheEntry`] values, plus
//!   the freshness check.
//! - [`CacheIndex`]: "which cached book mentions this id?", used to recover
//!   from stale chapter ids. The current implementations scan every cached
//!   summary; an actual id index can replace that without touching callers.
//!
//! ## Implementations
//!
//! - [`fs::FileCache`]: one `<book_id>.md` file per book under the cache root
//! - [`memory::InMemoryCache`]: same text format, held in a map, for tests
//!
//! Entries that fail to parse are treated as absent. That is the only
//! error this layer swallows.

use crate::error::Result;
use crate::model::{BookMetadata, CacheEntry, ChapterSummary};
use chrono::Duration;
use std::path::PathBuf;

pub mod format;
pub mod fs;
pub mod memory;

/// Default validity period for a cached summary.
pub const DEFAULT_STALENESS_DAYS: i64 = 7;

/// Explicit cache configuration, handed to each cache at construction.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub root: PathBuf,
    pub staleness: Duration,
}

impl CacheSettings {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            staleness: Duration::days(DEFAULT_STALENESS_DAYS),
        }
    }

    pub fn with_staleness(mut self, staleness: Duration) -> Self {
        self.staleness = staleness;
        self
    }
}

/// Raw cached text for one book, as found by a [`CacheIndex`] lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedText {
    pub book_id: String,
    pub text: String,
}

pub trait BookCache {
    /// The cached entry for `book_id`, or `None` if missing or unreadable.
    fn get(&self, book_id: &str) -> Result<Option<CacheEntry>>;

    /// Build previews for `chapters` and overwrite the entry for `book.id`,
    /// stamped with the current time.
    fn put(&mut self, book: &BookMetadata, chapters: &[ChapterSummary]) -> Result<CacheEntry>;

    /// Drop the entry for `book_id`. Removing a missing entry is not an error.
    fn remove(&mut self, book_id: &str) -> Result<()>;

    /// Whether `entry` is still inside the staleness window.
    fn is_fresh(&self, entry: &CacheEntry) -> bool;

    /// Where the entry lives, for stores that have a location to report.
    fn entry_path(&self, _book_id: &str) -> Option<PathBuf> {
        None
    }
}

pub trait CacheIndex {
    /// First cached book (in book id order) whose summary text contains `id`.
    fn find_referencing(&self, id: &str) -> Result<Option<CachedText>>;
}

/// Parses cached text, logging and discarding anything unreadable.
pub(crate) fn decode(book_id: &str, text: &str) -> Option<CacheEntry> {
    match format::from_text(text) {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::debug!(book_id, error = %e, "ignoring unreadable cache entry");
            None
        }
    }
}
