use crate::cache::{BookCache, CacheIndex};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::remote::ContentService;
use crate::resolver::StaleIdResolver;

/// Full chapter content. An id the service no longer knows goes through
/// stale-id recovery before giving up.
pub fn run<C, S>(cache: &mut C, service: &S, chapter_id: &str) -> Result<CmdResult>
where
    C: BookCache + CacheIndex,
    S: ContentService,
{
    if let Some(chapter) = service.fetch_chapter(chapter_id, true)? {
        return Ok(CmdResult::default().with_chapter(chapter));
    }

    tracing::info!(chapter_id, "chapter id not found, checking for stale cache");
    let resolution = StaleIdResolver::new(cache, service).resolve(chapter_id)?;
    let (book_id, mut chapter) = resolution.into_result(chapter_id)?;
    if chapter.book_id.is_none() {
        chapter.book_id = Some(book_id.clone());
    }

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::warning(format!(
        "Chapter id {} is stale; found it in cached book {}",
        chapter_id, book_id
    )));
    result.add_message(CmdMessage::info(format!(
        "Matched chapter '{}', new chapter id: {}",
        chapter.title, chapter.id
    )));
    Ok(result.with_chapter(chapter))
}
