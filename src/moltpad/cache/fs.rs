use super::{decode, format, BookCache, CacheIndex, CacheSettings, CachedText};
use crate::error::{MoltpadError, Result};
use crate::model::{BookMetadata, CacheEntry, ChapterSummary};
use chrono::Utc;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const ENTRY_EXT: &str = "md";

/// Book summaries stored as `<root>/<book_id>.md`.
pub struct FileCache {
    settings: CacheSettings,
}

impl FileCache {
    pub fn new(settings: CacheSettings) -> Self {
        Self { settings }
    }

    pub fn root(&self) -> &Path {
        &self.settings.root
    }

    /// Path of a book's entry. Ids that could escape the cache root are refused.
    fn path_for(&self, book_id: &str) -> Result<PathBuf> {
        if !is_safe_id(book_id) {
            return Err(MoltpadError::InvalidInput(format!(
                "'{}' is not a valid book id",
                book_id
            )));
        }
        Ok(self
            .settings
            .root
            .join(format!("{}.{}", book_id, ENTRY_EXT)))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.settings.root.exists() {
            fs::create_dir_all(&self.settings.root).map_err(MoltpadError::Io)?;
        }
        Ok(())
    }

    /// Entry text, `None` when missing or not UTF-8.
    fn read_text(&self, path: &Path) -> Result<Option<String>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MoltpadError::Io(e)),
        };
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "cache entry is not UTF-8, ignoring");
                Ok(None)
            }
        }
    }

    /// Cached book ids, sorted so scans are deterministic.
    fn book_ids(&self) -> Result<Vec<String>> {
        if !self.settings.root.exists() {
            return Ok(Vec::new());
        }
        let mut ids: Vec<String> = fs::read_dir(&self.settings.root)
            .map_err(MoltpadError::Io)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXT))
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl BookCache for FileCache {
    fn get(&self, book_id: &str) -> Result<Option<CacheEntry>> {
        let path = self.path_for(book_id)?;
        let Some(text) = self.read_text(&path)? else {
            tracing::debug!(book_id, "cache miss");
            return Ok(None);
        };
        Ok(decode(book_id, &text))
    }

    fn put(&mut self, book: &BookMetadata, chapters: &[ChapterSummary]) -> Result<CacheEntry> {
        self.ensure_dir()?;

        let path = self.path_for(&book.id)?;
        let entry = CacheEntry::new(book, chapters, Utc::now());

        // Atomic write: tmp file then rename
        let tmp = self
            .settings
            .root
            .join(format!(".{}-{}.tmp", book.id, Uuid::new_v4()));
        fs::write(&tmp, format::to_text(&entry)).map_err(MoltpadError::Io)?;
        fs::rename(&tmp, &path).map_err(MoltpadError::Io)?;

        tracing::debug!(book_id = %book.id, path = %path.display(), chapters = chapters.len(), "cache written");
        Ok(entry)
    }

    fn remove(&mut self, book_id: &str) -> Result<()> {
        match fs::remove_file(self.path_for(book_id)?) {
            Ok(()) => {
                tracing::debug!(book_id, "cache entry removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MoltpadError::Io(e)),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.is_fresh_at(Utc::now(), self.settings.staleness)
    }

    fn entry_path(&self, book_id: &str) -> Option<PathBuf> {
        self.path_for(book_id).ok()
    }
}

impl CacheIndex for FileCache {
    fn find_referencing(&self, id: &str) -> Result<Option<CachedText>> {
        for book_id in self.book_ids()? {
            let Some(text) = self.read_text(&self.path_for(&book_id)?)? else {
                continue;
            };
            if text.contains(id) {
                return Ok(Some(CachedText { book_id, text }));
            }
        }
        Ok(None)
    }
}

fn is_safe_id(book_id: &str) -> bool {
    !book_id.is_empty()
        && book_id != "."
        && !book_id.contains("..")
        && !book_id.contains(['/', '\\', '\0'])
}
