//! # Stale Chapter Id Recovery
//!
//! Chapter ids can change upstream (a book gets regenerated, chapters are
//! re-created) while the local cache still lists the old ones. When the
//! content service rejects a chapter id, [`StaleIdResolver`] tries to work
//! out which chapter was meant:
//!
//! ```text
//! scan ──no cached book mentions id──▶ Unrecoverable
//!   │
//! extract title hint from the cached chapter line
//!   │
//! invalidate cached entry
//!   │
//! refetch book ──gone──▶ BookDeleted
//!   │
//! refetch chapters ──none──▶ EmptyBook        (cache rebuilt)
//!   │
//! rematch by title ──no hint / no match──▶ Ambiguous   (cache rebuilt)
//!   │
//!   ▼
//! Resolved                                              (cache rebuilt)
//! ```
//!
//! Matching is by exact title (trimmed, case-insensitive). A renamed chapter
//! always ends up `Ambiguous`.

use crate::cache::{format, BookCache, CacheIndex};
use crate::error::{MoltpadError, Result};
use crate::model::{BookMetadata, ChapterSummary};
use crate::remote::ContentService;

/// Terminal state of one resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved {
        book_id: String,
        chapter: ChapterSummary,
    },
    /// No cached book references the id.
    Unrecoverable,
    BookDeleted {
        book_id: String,
    },
    EmptyBook {
        book_id: String,
    },
    /// The caller must pick one of `chapters` explicitly.
    Ambiguous {
        book_id: String,
        title_hint: Option<String>,
        chapters: Vec<ChapterSummary>,
    },
}

impl Resolution {
    /// The replacement chapter id, when resolution succeeded.
    pub fn chapter_id(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { chapter, .. } => Some(&chapter.id),
            _ => None,
        }
    }

    /// Converts every non-success state into its terminal error.
    pub fn into_result(self, stale_id: &str) -> Result<(String, ChapterSummary)> {
        match self {
            Resolution::Resolved { book_id, chapter } => Ok((book_id, chapter)),
            Resolution::Unrecoverable => Err(MoltpadError::StaleChapter(stale_id.to_string())),
            Resolution::BookDeleted { book_id } => Err(MoltpadError::BookDeleted(book_id)),
            Resolution::EmptyBook { book_id } => Err(MoltpadError::EmptyBook(book_id)),
            Resolution::Ambiguous {
                book_id, chapters, ..
            } => Err(MoltpadError::AmbiguousResolution { book_id, chapters }),
        }
    }
}

pub struct StaleIdResolver<'a, C, S> {
    cache: &'a mut C,
    service: &'a S,
}

impl<'a, C, S> StaleIdResolver<'a, C, S>
where
    C: BookCache + CacheIndex,
    S: ContentService,
{
    pub fn new(cache: &'a mut C, service: &'a S) -> Self {
        Self { cache, service }
    }

    pub fn resolve(&mut self, stale_id: &str) -> Result<Resolution> {
        let Some(cached) = self.cache.find_referencing(stale_id)? else {
            tracing::info!(stale_id, "no cached book references chapter id");
            return Ok(Resolution::Unrecoverable);
        };
        let book_id = cached.book_id;
        let title_hint = format::chapter_title_hint(&cached.text, stale_id);
        tracing::info!(stale_id, %book_id, ?title_hint, "found stale id in cached book, refreshing");

        self.cache.remove(&book_id)?;

        let Some(book) = self.service.fetch_book(&book_id)? else {
            tracing::info!(%book_id, "book no longer exists");
            return Ok(Resolution::BookDeleted { book_id });
        };
        let book = BookMetadata {
            id: book_id.clone(),
            ..book
        };
        let chapters = self.service.fetch_chapters(&book_id, true)?;
        self.cache.put(&book, &chapters)?;

        if chapters.is_empty() {
            return Ok(Resolution::EmptyBook { book_id });
        }

        let matched = title_hint.as_deref().and_then(|hint| {
            let target = hint.trim().to_lowercase();
            chapters
                .iter()
                .find(|ch| ch.title.trim().to_lowercase() == target)
                .cloned()
        });

        match matched {
            Some(chapter) => {
                tracing::info!(stale_id, new_id = %chapter.id, "matched chapter by title");
                Ok(Resolution::Resolved { book_id, chapter })
            }
            None => {
                tracing::info!(stale_id, %book_id, "could not match chapter, manual choice needed");
                Ok(Resolution::Ambiguous {
                    book_id,
                    title_hint,
                    chapters,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::InMemoryCache;
    use crate::model::BookMetadata;
    use crate::remote::memory::InMemoryService;

    fn book(id: &str) -> BookMetadata {
        BookMetadata {
            id: id.to_string(),
            title: "The Long Night".into(),
            author: "Ada".into(),
            publisher: "Press".into(),
            ..Default::default()
        }
    }

    /// Cache lists chapter `X` titled "Intro" under book `B`.
    fn cached_fixture() -> InMemoryCache {
        let mut cache = InMemoryCache::new();
        cache
            .put(
                &book("B"),
                &[
                    ChapterSummary::new("X", "Intro", "Once.", 0),
                    ChapterSummary::new("X2", "Second", "Then.", 1),
                ],
            )
            .unwrap();
        cache
    }

    #[test]
    fn rematches_by_title() {
        let mut cache = cached_fixture();
        let service = InMemoryService::new();
        service.add_book(
            book("B"),
            vec![
                ChapterSummary::new("Y", "Intro", "Once, again.", 0),
                ChapterSummary::new("Y2", "Second", "Then.", 1),
            ],
        );

        let resolution = StaleIdResolver::new(&mut cache, &service)
            .resolve("X")
            .unwrap();

        assert_eq!(resolution.chapter_id(), Some("Y"));
        let (book_id, chapter) = resolution.into_result("X").unwrap();
        assert_eq!(book_id, "B");
        assert_eq!(chapter.content, "Once, again.");

        // Cache rebuilt with the current ids.
        let entry = cache.get("B").unwrap().unwrap();
        assert_eq!(entry.chapters[0].id, "Y");
        assert!(cache.find_referencing("X2").unwrap().is_none());
    }

    #[test]
    fn title_match_ignores_case_and_padding() {
        let mut cache = cached_fixture();
        let service = InMemoryService::new();
        service.add_book(book("B"), vec![ChapterSummary::new("Y", "  INTRO ", "", 0)]);

        let resolution = StaleIdResolver::new(&mut cache, &service)
            .resolve("X")
            .unwrap();
        assert_eq!(resolution.chapter_id(), Some("Y"));
    }

    #[test]
    fn renamed_chapter_falls_back_to_manual_choice() {
        let mut cache = cached_fixture();
        let service = InMemoryService::new();
        service.add_book(
            book("B"),
            vec![
                ChapterSummary::new("Y", "Prologue", "", 0),
                ChapterSummary::new("Y2", "Second", "", 1),
            ],
        );

        let resolution = StaleIdResolver::new(&mut cache, &service)
            .resolve("X")
            .unwrap();

        assert_eq!(resolution.chapter_id(), None);
        match &resolution {
            Resolution::Ambiguous {
                book_id,
                title_hint,
                chapters,
            } => {
                assert_eq!(book_id, "B");
                assert_eq!(title_hint.as_deref(), Some("Intro"));
                assert_eq!(chapters.len(), 2);
            }
            other => panic!("expected ambiguous, got {:?}", other),
        }
        // Rebuilt even though nothing matched.
        assert_eq!(cache.get("B").unwrap().unwrap().chapters[0].id, "Y");
        assert!(matches!(
            resolution.into_result("X"),
            Err(MoltpadError::AmbiguousResolution { .. })
        ));
    }

    #[test]
    fn id_outside_any_chapter_line_gives_no_hint() {
        // Matches the header ("Book ID"), not a chapter line.
        let mut cache = cached_fixture();
        let service = InMemoryService::new();
        service.add_book(book("B"), vec![ChapterSummary::new("Y", "Intro", "", 0)]);

        let resolution = StaleIdResolver::new(&mut cache, &service)
            .resolve("B")
            .unwrap();
        assert!(matches!(
            resolution,
            Resolution::Ambiguous { title_hint: None, .. }
        ));
    }

    #[test]
    fn unknown_id_is_unrecoverable_and_touches_nothing() {
        let mut cache = cached_fixture();
        let service = InMemoryService::new();

        let resolution = StaleIdResolver::new(&mut cache, &service)
            .resolve("nowhere")
            .unwrap();

        assert_eq!(resolution, Resolution::Unrecoverable);
        assert_eq!(service.request_count(), 0);
        assert_eq!(cache.len(), 1);
        assert!(matches!(
            resolution.into_result("nowhere"),
            Err(MoltpadError::StaleChapter(id)) if id == "nowhere"
        ));
    }

    #[test]
    fn deleted_book_invalidates_cache() {
        let mut cache = cached_fixture();
        let service = InMemoryService::new();
        service.add_book(book("B"), vec![ChapterSummary::new("Y", "Intro", "", 0)]);
        service.remove_book("B");

        let resolution = StaleIdResolver::new(&mut cache, &service)
            .resolve("X")
            .unwrap();

        assert_eq!(
            resolution,
            Resolution::BookDeleted {
                book_id: "B".into()
            }
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn book_without_chapters() {
        let mut cache = cached_fixture();
        let service = InMemoryService::new();
        service.add_book(book("B"), vec![]);

        let resolution = StaleIdResolver::new(&mut cache, &service)
            .resolve("X")
            .unwrap();
        assert_eq!(
            resolution,
            Resolution::EmptyBook {
                book_id: "B".into()
            }
        );
    }
}
