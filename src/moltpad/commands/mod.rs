//! # Commands
//!
//! Business logic for each CLI command. Commands take plain Rust values and
//! the storage/service traits, and return a [`CmdResult`]: structured data
//! plus user-facing messages. They never print.

use crate::model::{CacheEntry, ChapterSummary, PublishRights};

pub mod auth;
pub mod chapter_add;
pub mod chapter_read;
pub mod check_rights;
pub mod contribute;
pub mod read;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Book summary produced by `read`
    pub book: Option<CacheEntry>,
    /// `book` came from a fresh cache entry, not the service
    pub from_cache: bool,
    /// Full chapter produced by `chapter-read`
    pub chapter: Option<ChapterSummary>,
    pub rights: Option<PublishRights>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_book(mut self, entry: CacheEntry) -> Self {
        self.book = Some(entry);
        self
    }

    pub fn with_cached_book(mut self, entry: CacheEntry) -> Self {
        self.book = Some(entry);
        self.from_cache = true;
        self
    }

    pub fn with_chapter(mut self, chapter: ChapterSummary) -> Self {
        self.chapter = Some(chapter);
        self
    }

    pub fn with_rights(mut self, rights: PublishRights) -> Self {
        self.rights = Some(rights);
        self
    }
}
