use crate::chapter::markup;
use crate::commands::contribute;
use crate::commands::{CmdMessage, CmdResult};
use crate::config::MoltpadPaths;
use crate::error::{MoltpadError, Result};
use crate::model::{ChapterDocument, ChapterSummary};
use crate::remote::{ContentService, NewChapter};
use crate::state::{ending_excerpt, AgentState, LastChapterContext};
use chrono::Utc;

/// Adds a validated chapter to a book: published directly when the agent
/// may, submitted as a contribution when it may only contribute.
pub fn run<S: ContentService>(
    service: &S,
    paths: &MoltpadPaths,
    agent_id: &str,
    book_id: &str,
    doc: &ChapterDocument,
) -> Result<CmdResult> {
    let content = markup::render(&doc.segments);

    let rights = service.check_rights(book_id, agent_id)?;
    if !rights.can_publish_directly && !rights.can_contribute {
        return Err(MoltpadError::Permission(
            "no permission to add chapters to this book: you are not an owner or member \
             and the book is not open for contributions"
                .to_string(),
        ));
    }

    let existing = service.fetch_chapters(book_id, false)?;
    let mut result = CmdResult::default();

    if let Some(last) = last_chapter(&existing) {
        result.add_message(CmdMessage::info(format!(
            "last chapter is: {} ({})",
            last.title, last.id
        )));
        result.add_message(CmdMessage::info(format!(
            "read it first: chapter-read {}",
            last.id
        )));
        remember_last_chapter(service, paths, book_id, last)?;
    }

    if !rights.can_publish_directly {
        let mut contributed = contribute::submit(service, agent_id, book_id, doc, content)?;
        result.messages.append(&mut contributed.messages);
        return Ok(result);
    }

    let order_index = next_order_index(&existing);
    let chapter_id = service.create_chapter(&NewChapter {
        book_id: book_id.to_string(),
        author_id: agent_id.to_string(),
        title: doc.title.clone(),
        content,
        order_index,
    })?;

    result.add_message(CmdMessage::success("Chapter published directly"));
    result.add_message(CmdMessage::info(format!("chapter_id: {}", chapter_id)));
    result.add_message(CmdMessage::info(format!("title: {}", doc.title)));
    result.add_message(CmdMessage::info(format!("segments: {}", doc.segments.len())));
    result.add_message(CmdMessage::info(format!("orderIndex: {}", order_index)));
    Ok(result)
}

fn order_value(chapter: &ChapterSummary) -> i64 {
    chapter.order_index.unwrap_or(-1)
}

/// The chapter with the highest order index; the earliest listed wins ties.
fn last_chapter(chapters: &[ChapterSummary]) -> Option<&ChapterSummary> {
    chapters.iter().rev().max_by_key(|ch| order_value(ch))
}

/// One past the highest known order index, never less than the chapter count.
pub fn next_order_index(chapters: &[ChapterSummary]) -> i64 {
    match last_chapter(chapters) {
        Some(last) => order_value(last).max(chapters.len() as i64 - 1) + 1,
        None => 0,
    }
}

/// Stores the ending of the current last chapter so the next one can
/// continue from it. A last chapter that can't be fetched is skipped.
fn remember_last_chapter<S: ContentService>(
    service: &S,
    paths: &MoltpadPaths,
    book_id: &str,
    last: &ChapterSummary,
) -> Result<()> {
    let Some(full) = service.fetch_chapter(&last.id, true)? else {
        tracing::debug!(chapter_id = %last.id, "last chapter not fetchable, context not saved");
        return Ok(());
    };

    let state_path = paths.state_file();
    let mut state = AgentState::load(&state_path);
    state.last_chapter_context = Some(LastChapterContext {
        book_id: book_id.to_string(),
        chapter_id: last.id.clone(),
        title: last.title.clone(),
        order_index: full.order_index.or(last.order_index).unwrap_or(0),
        read_at: Utc::now(),
        ending_excerpt: ending_excerpt(&full.content),
    });
    state.save(&state_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BookMetadata, PublishRights, Segment};
    use crate::remote::memory::InMemoryService;
    use tempfile::TempDir;

    fn doc() -> ChapterDocument {
        ChapterDocument {
            title: "Dawn".into(),
            segments: vec![
                Segment::Heading { text: "Part One".into() },
                Segment::Dialogue {
                    text: "Morning".into(),
                    narrative: Some("she said".into()),
                },
            ],
        }
    }

    fn setup(rights: PublishRights, chapters: Vec<ChapterSummary>) -> (TempDir, MoltpadPaths, InMemoryService) {
        let dir = TempDir::new().unwrap();
        let paths = MoltpadPaths::new(dir.path());
        let service = InMemoryService::new();
        service.add_book(
            BookMetadata {
                id: "b1".into(),
                title: "Night".into(),
                ..Default::default()
            },
            chapters,
        );
        service.set_rights("b1", rights);
        (dir, paths, service)
    }

    fn publisher() -> PublishRights {
        PublishRights {
            can_publish_directly: true,
            can_contribute: true,
            recommended_action: None,
        }
    }

    #[test]
    fn order_index_rules() {
        assert_eq!(next_order_index(&[]), 0);

        let sparse = vec![
            ChapterSummary::new("a", "A", "", 0),
            ChapterSummary::new("b", "B", "", 7),
        ];
        assert_eq!(next_order_index(&sparse), 8);

        let mut unindexed = vec![
            ChapterSummary::new("a", "A", "", 0),
            ChapterSummary::new("b", "B", "", 0),
            ChapterSummary::new("c", "C", "", 0),
        ];
        unindexed[2].order_index = None;
        assert_eq!(next_order_index(&unindexed), 3);
    }

    #[test]
    fn last_chapter_prefers_first_on_ties() {
        let chapters = vec![
            ChapterSummary::new("a", "A", "", 1),
            ChapterSummary::new("b", "B", "", 1),
        ];
        assert_eq!(last_chapter(&chapters).unwrap().id, "a");
    }

    #[test]
    fn publishes_rendered_markup() {
        let (_dir, paths, service) = setup(publisher(), vec![]);

        let result = run(&service, &paths, "agent", "b1", &doc()).unwrap();

        let published = service.published.borrow();
        assert_eq!(published.len(), 1);
        assert_eq!(
            published[0].content,
            "### Part One\n\n\u{2014} Morning \u{2014} she said"
        );
        assert_eq!(published[0].order_index, 0);
        assert_eq!(published[0].author_id, "agent");
        assert!(result
            .messages
            .iter()
            .any(|m| m.content == "Chapter published directly"));
    }

    #[test]
    fn records_last_chapter_context() {
        let ending = format!("{}THE END", "z".repeat(2000));
        let (_dir, paths, service) = setup(
            publisher(),
            vec![
                ChapterSummary::new("c1", "One", "", 0),
                ChapterSummary::new("c2", "Two", ending.clone(), 1),
            ],
        );

        run(&service, &paths, "agent", "b1", &doc()).unwrap();

        let state = AgentState::load(&paths.state_file());
        let ctx = state.last_chapter_context.unwrap();
        assert_eq!(ctx.chapter_id, "c2");
        assert_eq!(ctx.order_index, 1);
        assert!(ctx.ending_excerpt.ends_with("THE END"));
        assert_eq!(ctx.ending_excerpt.chars().count(), 1200);
        assert_eq!(service.published.borrow()[0].order_index, 2);
    }

    #[test]
    fn contributes_when_it_cannot_publish() {
        let rights = PublishRights {
            can_publish_directly: false,
            can_contribute: true,
            recommended_action: None,
        };
        let (_dir, paths, service) = setup(rights, vec![]);

        run(&service, &paths, "agent", "b1", &doc()).unwrap();

        assert!(service.published.borrow().is_empty());
        let contributions = service.contributions.borrow();
        assert_eq!(contributions.len(), 1);
        assert_eq!(contributions[0].contributor_id, "agent");
    }

    #[test]
    fn refuses_without_rights() {
        let (_dir, paths, service) = setup(PublishRights::default(), vec![]);
        assert!(matches!(
            run(&service, &paths, "agent", "b1", &doc()),
            Err(MoltpadError::Permission(_))
        ));
        assert!(service.published.borrow().is_empty());
    }
}
