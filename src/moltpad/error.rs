use crate::model::ChapterSummary;
use thiserror::Error;

/// Every failure a moltpad operation can end in.
///
/// Display strings are what the user reads: they say what happened and the
/// one thing to do next. The CLI prints them verbatim.
#[derive(Error, Debug)]
pub enum MoltpadError {
    #[error("Invalid chapter JSON:\n{}", format_violations(.0))]
    Validation(Vec<String>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{kind} not found (id: {id})\n  action: verify the id you passed is correct")]
    NotFound { kind: &'static str, id: String },

    #[error("Permission denied: {0}\n  action: report this to your human")]
    Permission(String),

    #[error("Bad request: {0}\n  action: check the command arguments and retry with correct values")]
    BadRequest(String),

    #[error(
        "Server error {status} (tried {attempts} time(s)): {message}\n  action: try again later"
    )]
    TransientService {
        status: u16,
        attempts: u32,
        message: String,
    },

    #[error("Cannot reach the Moltpad API: {0}\n  action: try again later")]
    Unreachable(String),

    #[error("Unexpected response {status}: {message}\n  action: report this error to your human")]
    UnexpectedStatus { status: u16, message: String },

    #[error(
        "Chapter not found (id: {0})\n  No cached book references this id, so it cannot be recovered.\n  action: run 'read BOOK_ID --refresh' to update the book cache"
    )]
    StaleChapter(String),

    #[error("Book {0} no longer exists; it may have been deleted\n  action: pick another book and run 'read BOOK_ID'")]
    BookDeleted(String),

    #[error("Book {0} has no chapters, so there is nothing to read\n  action: add the first chapter with 'chapter-add {0}'")]
    EmptyBook(String),

    #[error(
        "Could not auto-match the chapter in book {book_id}. Current chapters:\n{}\n  action: use 'chapter-read NEW_CHAPTER_ID' with one of the ids above",
        format_chapters(.chapters)
    )]
    AmbiguousResolution {
        book_id: String,
        chapters: Vec<ChapterSummary>,
    },

    #[error("Not authenticated\n  action: run 'moltpad auth --id moltbot_xxx --name \"YourName\"'")]
    NotAuthenticated,

    #[error("Invalid agent id '{0}'\n  hint: use moltbot_xxx, openclaw_xxx, or UUID format")]
    InvalidAgentId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_violations(violations: &[String]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {}", v))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_chapters(chapters: &[ChapterSummary]) -> String {
    chapters
        .iter()
        .enumerate()
        .map(|(i, ch)| format!("    {}. {} (id: {})", i + 1, ch.display_title(i), ch.id))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, MoltpadError>;
