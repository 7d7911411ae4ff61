use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Previews keep at most this many characters of chapter content.
pub const PREVIEW_CHARS: usize = 200;
const PREVIEW_ELLIPSIS: &str = "…";

/// The closed set of segment kinds a chapter may be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SegmentKind {
    Text,
    Dialogue,
    Monolog,
    Whisper,
    Shout,
    Emphasis,
    Center,
    Right,
    SceneBreak,
    Heading,
}

impl SegmentKind {
    pub const ALL: [SegmentKind; 10] = [
        SegmentKind::Text,
        SegmentKind::Dialogue,
        SegmentKind::Monolog,
        SegmentKind::Whisper,
        SegmentKind::Shout,
        SegmentKind::Emphasis,
        SegmentKind::Center,
        SegmentKind::Right,
        SegmentKind::SceneBreak,
        SegmentKind::Heading,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Text => "text",
            SegmentKind::Dialogue => "dialogue",
            SegmentKind::Monolog => "monolog",
            SegmentKind::Whisper => "whisper",
            SegmentKind::Shout => "shout",
            SegmentKind::Emphasis => "emphasis",
            SegmentKind::Center => "center",
            SegmentKind::Right => "right",
            SegmentKind::SceneBreak => "scene_break",
            SegmentKind::Heading => "heading",
        }
    }

    /// Speech kinds may carry a `narrative` attribution.
    pub fn allows_narrative(&self) -> bool {
        matches!(
            self,
            SegmentKind::Dialogue | SegmentKind::Monolog | SegmentKind::Whisper | SegmentKind::Shout
        )
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SegmentKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// One typed unit of chapter content.
///
/// Each variant carries exactly the fields its kind permits, so a value of
/// this type can't hold a narrative on a heading or text on a scene break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text {
        text: String,
    },
    Dialogue {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        narrative: Option<String>,
    },
    Monolog {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        narrative: Option<String>,
    },
    Whisper {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        narrative: Option<String>,
    },
    Shout {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        narrative: Option<String>,
    },
    Emphasis {
        text: String,
    },
    Center {
        text: String,
    },
    Right {
        text: String,
    },
    SceneBreak,
    Heading {
        text: String,
    },
}

/// A validated chapter: a title plus its ordered segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDocument {
    pub title: String,
    pub segments: Vec<Segment>,
}

/// Book-level metadata as returned by the content service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookMetadata {
    pub id: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// A chapter as listed (or fetched) from the content service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSummary {
    pub id: String,
    pub title: String,
    pub content: String,
    pub order_index: Option<i64>,
    pub book_id: Option<String>,
}

impl ChapterSummary {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        order_index: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            order_index: Some(order_index),
            book_id: None,
        }
    }

    /// The title, or "Chapter N" (1-based) for untitled chapters.
    pub fn display_title(&self, position: usize) -> String {
        if self.title.is_empty() {
            format!("Chapter {}", position + 1)
        } else {
            self.title.clone()
        }
    }
}

/// What an agent may do with a book.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublishRights {
    pub can_publish_directly: bool,
    pub can_contribute: bool,
    pub recommended_action: Option<String>,
}

/// Cached single-line view of a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterPreview {
    pub title: String,
    pub id: String,
    pub preview: String,
}

impl ChapterPreview {
    /// Builds a preview from the chapter at `position` in its book.
    pub fn from_chapter(position: usize, chapter: &ChapterSummary) -> Self {
        Self {
            title: chapter.display_title(position),
            id: chapter.id.clone(),
            preview: preview_text(&chapter.content),
        }
    }
}

/// First [`PREVIEW_CHARS`] characters on one line, suffixed with an ellipsis
/// when the content was cut.
pub fn preview_text(content: &str) -> String {
    let head: String = content
        .chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    let mut preview = head.trim().to_string();
    if content.chars().count() > PREVIEW_CHARS {
        preview.push_str(PREVIEW_ELLIPSIS);
    }
    preview
}

/// The locally cached summary of one book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub category: Option<String>,
    pub description: Option<String>,
    /// `None` when the stored timestamp could not be parsed.
    pub last_read_at: Option<DateTime<Utc>>,
    pub chapters: Vec<ChapterPreview>,
}

impl CacheEntry {
    /// `read_at` is kept to whole seconds, the precision the cache file stores.
    pub fn new(book: &BookMetadata, chapters: &[ChapterSummary], read_at: DateTime<Utc>) -> Self {
        Self {
            book_id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            publisher: book.publisher.clone(),
            category: book.category.clone().filter(|c| !c.is_empty()),
            description: book.description.clone().filter(|d| !d.is_empty()),
            last_read_at: Some(read_at.trunc_subsecs(0)),
            chapters: chapters
                .iter()
                .enumerate()
                .map(|(i, ch)| ChapterPreview::from_chapter(i, ch))
                .collect(),
        }
    }

    /// Fresh iff it was read less than `window` before `now`. Entries without
    /// a readable timestamp are never fresh.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match self.last_read_at {
            Some(read_at) => now.signed_duration_since(read_at) < window,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry_read_at(read_at: Option<DateTime<Utc>>) -> CacheEntry {
        CacheEntry {
            book_id: "b1".into(),
            title: "Book".into(),
            author: "A".into(),
            publisher: "P".into(),
            category: None,
            description: None,
            last_read_at: read_at,
            chapters: vec![],
        }
    }

    #[test]
    fn segment_kind_round_trips_through_str() {
        for kind in SegmentKind::ALL {
            assert_eq!(kind.as_str().parse::<SegmentKind>(), Ok(kind));
        }
        assert!("thought".parse::<SegmentKind>().is_err());
    }

    #[test]
    fn narrative_kinds() {
        let allowed: Vec<_> = SegmentKind::ALL
            .iter()
            .filter(|k| k.allows_narrative())
            .map(|k| k.as_str())
            .collect();
        assert_eq!(allowed, vec!["dialogue", "monolog", "whisper", "shout"]);
    }

    #[test]
    fn segments_deserialize_from_tagged_json() {
        let seg: Segment =
            serde_json::from_str(r#"{"type":"dialogue","text":"Hi","narrative":"she said"}"#)
                .unwrap();
        assert_eq!(
            seg,
            Segment::Dialogue {
                text: "Hi".into(),
                narrative: Some("she said".into()),
            }
        );

        let seg: Segment = serde_json::from_str(r#"{"type":"scene_break"}"#).unwrap();
        assert_eq!(seg, Segment::SceneBreak);
    }

    #[test]
    fn preview_collapses_newlines_and_trims() {
        assert_eq!(preview_text("  one\ntwo\n"), "one two");
    }

    #[test]
    fn preview_truncates_long_content_with_ellipsis() {
        let content = "é".repeat(250);
        let preview = preview_text(&content);
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 1);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn preview_keeps_content_of_exactly_the_limit() {
        let content = "x".repeat(PREVIEW_CHARS);
        assert_eq!(preview_text(&content), content);
    }

    #[test]
    fn untitled_chapters_get_positional_title() {
        let ch = ChapterSummary::new("c", "", "body", 0);
        assert_eq!(ChapterPreview::from_chapter(2, &ch).title, "Chapter 3");
    }

    #[test]
    fn freshness_boundaries() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let window = Duration::days(7);

        let stale = entry_read_at(Some(now - Duration::days(7) - Duration::seconds(1)));
        assert!(!stale.is_fresh_at(now, window));

        let fresh = entry_read_at(Some(
            now - Duration::days(6) - Duration::hours(23) - Duration::minutes(59),
        ));
        assert!(fresh.is_fresh_at(now, window));

        let exactly = entry_read_at(Some(now - window));
        assert!(!exactly.is_fresh_at(now, window));
    }

    #[test]
    fn new_entry_drops_subsecond_precision() {
        let read_at = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
            + Duration::nanoseconds(129_053_310);
        let entry = CacheEntry::new(&BookMetadata::default(), &[], read_at);
        assert_eq!(
            entry.last_read_at,
            Some(Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn unreadable_timestamp_is_never_fresh() {
        let now = Utc::now();
        assert!(!entry_read_at(None).is_fresh_at(now, Duration::days(7)));
    }
}
