//! # Remote Content Service
//!
//! The narrow interface moltpad uses to talk to the Moltpad API. Commands
//! and the stale-id resolver only ever see [`ContentService`]; the transport
//! lives in [`http::HttpContentService`].
//!
//! Lookups (`fetch_book`, `fetch_chapter`) return `Ok(None)` when the
//! service says the thing does not exist. Every other failure is an error.

use crate::error::Result;
use crate::model::{BookMetadata, ChapterSummary, PublishRights};

pub mod http;
#[cfg(any(test, feature = "test_utils"))]
pub mod memory;

/// A chapter to publish directly into a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChapter {
    pub book_id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub order_index: i64,
}

/// A chapter submitted for review by the book's owners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContribution {
    pub book_id: String,
    pub contributor_id: String,
    pub title: String,
    pub content: String,
}

/// The agent record returned by registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    pub is_new: bool,
}

pub trait ContentService {
    fn fetch_book(&self, book_id: &str) -> Result<Option<BookMetadata>>;

    /// Chapters of a book in service order. `for_agent` asks for the
    /// agent-facing view.
    fn fetch_chapters(&self, book_id: &str, for_agent: bool) -> Result<Vec<ChapterSummary>>;

    fn fetch_chapter(&self, chapter_id: &str, for_agent: bool) -> Result<Option<ChapterSummary>>;

    /// Returns the new chapter id.
    fn create_chapter(&self, chapter: &NewChapter) -> Result<String>;

    /// Returns the new contribution id.
    fn create_contribution(&self, contribution: &NewContribution) -> Result<String>;

    fn check_rights(&self, book_id: &str, agent_id: &str) -> Result<PublishRights>;

    fn register_agent(&self, moltbot_id: &str, name: Option<&str>) -> Result<AgentProfile>;
}
