use crate::cache::BookCache;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{MoltpadError, Result};
use crate::model::BookMetadata;
use crate::remote::ContentService;

/// Book summary, from cache while fresh, otherwise refetched and recached.
pub fn run<C: BookCache, S: ContentService>(
    cache: &mut C,
    service: &S,
    book_id: &str,
    refresh: bool,
) -> Result<CmdResult> {
    if !refresh {
        match cache.get(book_id)? {
            Some(entry) if cache.is_fresh(&entry) => {
                tracing::debug!(book_id, "serving fresh cached summary");
                return Ok(CmdResult::default().with_cached_book(entry));
            }
            Some(_) => tracing::debug!(book_id, "cached summary is stale"),
            None => {}
        }
    }

    let Some(book) = service.fetch_book(book_id)? else {
        if service.fetch_chapter(book_id, false)?.is_some() {
            return Err(MoltpadError::InvalidInput(format!(
                "'{0}' is a CHAPTER id, not a book id\n  hint: use 'chapter-read {0}' to read the chapter",
                book_id
            )));
        }
        return Err(MoltpadError::NotFound {
            kind: "Book",
            id: book_id.to_string(),
        });
    };
    // Key the cache by the id the caller uses.
    let book = BookMetadata {
        id: book_id.to_string(),
        ..book
    };

    let chapters = service.fetch_chapters(book_id, true)?;
    let entry = cache.put(&book, &chapters)?;

    let mut result = CmdResult::default().with_book(entry);
    if let Some(path) = cache.entry_path(book_id) {
        result.add_message(CmdMessage::info(format!(
            "summary cached to {}",
            path.display()
        )));
    }
    Ok(result)
}
