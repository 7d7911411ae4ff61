use super::{AgentProfile, ContentService, NewChapter, NewContribution};
use crate::error::{MoltpadError, Result};
use crate::model::{BookMetadata, ChapterSummary, PublishRights};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use uuid::Uuid;

/// Scriptable stand-in for the content service. Records writes and counts
/// requests so tests can assert on both.
#[derive(Default)]
pub struct InMemoryService {
    books: RefCell<HashMap<String, BookMetadata>>,
    chapters: RefCell<HashMap<String, Vec<ChapterSummary>>>,
    rights: RefCell<HashMap<String, PublishRights>>,
    pub published: RefCell<Vec<NewChapter>>,
    pub contributions: RefCell<Vec<NewContribution>>,
    requests: Cell<usize>,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_book(&self, book: BookMetadata, chapters: Vec<ChapterSummary>) {
        let chapters = chapters
            .into_iter()
            .map(|mut ch| {
                ch.book_id = Some(book.id.clone());
                ch
            })
            .collect();
        self.chapters.borrow_mut().insert(book.id.clone(), chapters);
        self.books.borrow_mut().insert(book.id.clone(), book);
    }

    pub fn remove_book(&self, book_id: &str) {
        self.books.borrow_mut().remove(book_id);
        self.chapters.borrow_mut().remove(book_id);
    }

    /// Swaps a book's chapter list, as if it had been regenerated upstream.
    pub fn replace_chapters(&self, book_id: &str, chapters: Vec<ChapterSummary>) {
        let chapters = chapters
            .into_iter()
            .map(|mut ch| {
                ch.book_id = Some(book_id.to_string());
                ch
            })
            .collect();
        self.chapters
            .borrow_mut()
            .insert(book_id.to_string(), chapters);
    }

    pub fn set_rights(&self, book_id: &str, rights: PublishRights) {
        self.rights.borrow_mut().insert(book_id.to_string(), rights);
    }

    pub fn request_count(&self) -> usize {
        self.requests.get()
    }

    fn tick(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

impl ContentService for InMemoryService {
    fn fetch_book(&self, book_id: &str) -> Result<Option<BookMetadata>> {
        self.tick();
        Ok(self.books.borrow().get(book_id).cloned())
    }

    fn fetch_chapters(&self, book_id: &str, _for_agent: bool) -> Result<Vec<ChapterSummary>> {
        self.tick();
        self.chapters
            .borrow()
            .get(book_id)
            .cloned()
            .ok_or_else(|| MoltpadError::NotFound {
                kind: "Book",
                id: book_id.to_string(),
            })
    }

    fn fetch_chapter(&self, chapter_id: &str, _for_agent: bool) -> Result<Option<ChapterSummary>> {
        self.tick();
        Ok(self
            .chapters
            .borrow()
            .values()
            .flatten()
            .find(|ch| ch.id == chapter_id)
            .cloned())
    }

    fn create_chapter(&self, chapter: &NewChapter) -> Result<String> {
        self.tick();
        let id = Uuid::new_v4().to_string();
        self.published.borrow_mut().push(chapter.clone());
        if let Some(list) = self.chapters.borrow_mut().get_mut(&chapter.book_id) {
            let mut created = ChapterSummary::new(
                id.clone(),
                chapter.title.clone(),
                chapter.content.clone(),
                chapter.order_index,
            );
            created.book_id = Some(chapter.book_id.clone());
            list.push(created);
        }
        Ok(id)
    }

    fn create_contribution(&self, contribution: &NewContribution) -> Result<String> {
        self.tick();
        self.contributions.borrow_mut().push(contribution.clone());
        Ok(Uuid::new_v4().to_string())
    }

    fn check_rights(&self, book_id: &str, _agent_id: &str) -> Result<PublishRights> {
        self.tick();
        Ok(self
            .rights
            .borrow()
            .get(book_id)
            .cloned()
            .unwrap_or_default())
    }

    fn register_agent(&self, moltbot_id: &str, name: Option<&str>) -> Result<AgentProfile> {
        self.tick();
        Ok(AgentProfile {
            id: format!("agent-{}", moltbot_id),
            name: name.unwrap_or("agent").to_string(),
            is_new: true,
        })
    }
}
