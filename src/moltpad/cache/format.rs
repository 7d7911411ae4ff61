//! Text codec for cached book summaries.
//!
//! ```text
//! # Book Summary: The Long Night
//! **Book ID**: b123
//! **Author**: Ada
//! **Publisher**: Nightfall Press
//! **Category**: Fantasy
//! **Last Read**: 2026-10-01T08:30:00Z
//! **Chapters**: 2
//!
//! ## Description
//! A story about a very long night.
//!
//! ## Chapters
//! - **Dusk** (id: c1): The sun went down…
//! - **Midnight** (id: c2): Nobody slept.
//! ```
//!
//! The file doubles as a human-readable summary, so `read` prints it as is.

use crate::model::{CacheEntry, ChapterPreview};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;

const TITLE_PREFIX: &str = "# Book Summary: ";
const DESCRIPTION_HEADING: &str = "## Description";
const CHAPTERS_HEADING: &str = "## Chapters";
const CHAPTER_PREFIX: &str = "- **";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Accepts RFC 3339 and the bare `Z`-suffixed form this codec writes.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
                .ok()
                .map(|naive| naive.and_utc())
        })
}

pub fn to_text(entry: &CacheEntry) -> String {
    let mut lines = vec![
        format!("{}{}", TITLE_PREFIX, entry.title),
        header("Book ID", &entry.book_id),
        header("Author", &entry.author),
        header("Publisher", &entry.publisher),
    ];
    if let Some(category) = &entry.category {
        lines.push(header("Category", category));
    }
    let last_read = entry
        .last_read_at
        .map(format_timestamp)
        .unwrap_or_default();
    lines.push(header("Last Read", &last_read));
    lines.push(header("Chapters", &entry.chapters.len().to_string()));
    lines.push(String::new());

    if let Some(description) = &entry.description {
        lines.push(DESCRIPTION_HEADING.to_string());
        lines.push(description.clone());
        lines.push(String::new());
    }

    lines.push(CHAPTERS_HEADING.to_string());
    for ch in &entry.chapters {
        lines.push(format!(
            "{}{}** (id: {}): {}",
            CHAPTER_PREFIX, ch.title, ch.id, ch.preview
        ));
    }

    lines.join("\n")
}

fn header(key: &str, value: &str) -> String {
    format!("**{}**: {}", key, value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// First line is not a `# Book Summary:` title
    MissingTitle,
    /// A required `**Key**: value` header is absent
    MissingField(&'static str),
    /// A chapter list line could not be split into title, id and preview
    BadChapterLine(usize),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingTitle => write!(f, "missing '# Book Summary:' title line"),
            ParseError::MissingField(key) => write!(f, "missing '{}' header", key),
            ParseError::BadChapterLine(n) => write!(f, "malformed chapter entry on line {}", n),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(PartialEq)]
enum Section {
    Header,
    Description,
    Chapters,
}

/// Parses a cached summary. A `Last Read` value that isn't a timestamp
/// parses to `None` rather than failing the whole entry.
pub fn from_text(text: &str) -> Result<CacheEntry, ParseError> {
    let mut lines = text.lines();
    let title = lines
        .next()
        .and_then(|l| l.strip_prefix(TITLE_PREFIX))
        .ok_or(ParseError::MissingTitle)?
        .to_string();

    let mut book_id = None;
    let mut author = None;
    let mut publisher = None;
    let mut category = None;
    let mut last_read = None;
    let mut description: Vec<&str> = Vec::new();
    let mut chapters = Vec::new();
    let mut section = Section::Header;

    for (n, line) in lines.enumerate() {
        if line == DESCRIPTION_HEADING {
            section = Section::Description;
            continue;
        }
        if line == CHAPTERS_HEADING {
            section = Section::Chapters;
            continue;
        }

        match section {
            Section::Header => {
                let Some((key, value)) = parse_header(line) else {
                    continue;
                };
                match key {
                    "Book ID" => book_id = Some(value.to_string()),
                    "Author" => author = Some(value.to_string()),
                    "Publisher" => publisher = Some(value.to_string()),
                    "Category" => category = Some(value.to_string()),
                    "Last Read" => last_read = Some(value.to_string()),
                    _ => {}
                }
            }
            Section::Description => description.push(line),
            Section::Chapters => {
                if line.trim().is_empty() {
                    continue;
                }
                // +2: 1-based, and the title line was consumed before enumerate
                let preview = parse_chapter_line(line).ok_or(ParseError::BadChapterLine(n + 2))?;
                chapters.push(preview);
            }
        }
    }

    let description = description.join("\n").trim().to_string();

    Ok(CacheEntry {
        book_id: book_id.ok_or(ParseError::MissingField("Book ID"))?,
        title,
        author: author.ok_or(ParseError::MissingField("Author"))?,
        publisher: publisher.ok_or(ParseError::MissingField("Publisher"))?,
        category: category.filter(|c| !c.is_empty()),
        description: (!description.is_empty()).then_some(description),
        last_read_at: last_read.as_deref().and_then(parse_timestamp),
        chapters,
    })
}

fn parse_header(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("**")?;
    let (key, value) = rest.split_once("**:")?;
    Some((key, value.trim()))
}

fn parse_chapter_line(line: &str) -> Option<ChapterPreview> {
    let rest = line.strip_prefix(CHAPTER_PREFIX)?;
    let (title, rest) = rest.split_once("** (id: ")?;
    let (id, preview) = rest.split_once("):")?;
    Some(ChapterPreview {
        title: title.to_string(),
        id: id.to_string(),
        preview: preview.trim().to_string(),
    })
}

/// Last-known title of chapter `id`, read from the first chapter line in
/// `text` that mentions it.
pub fn chapter_title_hint(text: &str, id: &str) -> Option<String> {
    text.lines()
        .filter(|line| line.starts_with(CHAPTER_PREFIX) && line.contains(id))
        .find_map(|line| line.split("**").nth(1))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_entry() -> CacheEntry {
        CacheEntry {
            book_id: "b123".into(),
            title: "The Long Night".into(),
            author: "Ada".into(),
            publisher: "Nightfall Press".into(),
            category: Some("Fantasy".into()),
            description: Some("A story about\na very long night.".into()),
            last_read_at: Some(Utc.with_ymd_and_hms(2026, 10, 1, 8, 30, 0).unwrap()),
            chapters: vec![
                ChapterPreview {
                    title: "Dusk".into(),
                    id: "c1".into(),
                    preview: "The sun went down…".into(),
                },
                ChapterPreview {
                    title: "Midnight".into(),
                    id: "c2".into(),
                    preview: String::new(),
                },
            ],
        }
    }

    #[test]
    fn writes_documented_layout() {
        let text = to_text(&sample_entry());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# Book Summary: The Long Night");
        assert_eq!(lines[1], "**Book ID**: b123");
        assert_eq!(lines[4], "**Category**: Fantasy");
        assert_eq!(lines[5], "**Last Read**: 2026-10-01T08:30:00Z");
        assert_eq!(lines[6], "**Chapters**: 2");
        assert!(text.contains("## Description\nA story about\na very long night.\n\n## Chapters"));
        assert!(text.ends_with("- **Dusk** (id: c1): The sun went down…\n- **Midnight** (id: c2): "));
    }

    #[test]
    fn reads_back_what_it_writes() {
        let entry = sample_entry();
        assert_eq!(from_text(&to_text(&entry)).unwrap(), entry);
    }

    #[test]
    fn optional_blocks_may_be_absent() {
        let mut entry = sample_entry();
        entry.category = None;
        entry.description = None;
        let text = to_text(&entry);
        assert!(!text.contains("Category"));
        assert!(!text.contains(DESCRIPTION_HEADING));
        assert_eq!(from_text(&text).unwrap(), entry);
    }

    #[test]
    fn garbage_timestamp_parses_as_unknown() {
        let text = to_text(&sample_entry()).replace("2026-10-01T08:30:00Z", "yesterday-ish");
        let entry = from_text(&text).unwrap();
        assert_eq!(entry.last_read_at, None);
    }

    #[test]
    fn accepts_offset_timestamps() {
        let ts = parse_timestamp("2026-10-01T10:30:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 10, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn rejects_files_without_title_or_id() {
        assert_eq!(from_text("hello"), Err(ParseError::MissingTitle));
        assert_eq!(
            from_text("# Book Summary: X\n**Author**: a\n**Publisher**: p"),
            Err(ParseError::MissingField("Book ID"))
        );
    }

    #[test]
    fn rejects_malformed_chapter_lines() {
        let text = "# Book Summary: X\n**Book ID**: b\n**Author**: a\n**Publisher**: p\n\n## Chapters\n- oops";
        assert_eq!(from_text(text), Err(ParseError::BadChapterLine(7)));
    }

    #[test]
    fn title_hint_comes_from_the_line_naming_the_id() {
        let text = to_text(&sample_entry());
        assert_eq!(chapter_title_hint(&text, "c2"), Some("Midnight".to_string()));
        assert_eq!(chapter_title_hint(&text, "c9"), None);
        // The header mentions the book id, but no chapter line does.
        assert_eq!(chapter_title_hint(&text, "b123"), None);
    }
}
