use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// How much of the previous chapter's ending to keep.
pub const ENDING_EXCERPT_CHARS: usize = 1200;

/// Where the book stood when the agent last added a chapter, so the next
/// chapter can pick up from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastChapterContext {
    pub book_id: String,
    pub chapter_id: String,
    pub title: String,
    pub order_index: i64,
    pub read_at: DateTime<Utc>,
    pub ending_excerpt: String,
}

/// Contents of `state.json`. Keys moltpad doesn't know are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    #[serde(
        rename = "lastChapterContext",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_chapter_context: Option<LastChapterContext>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl AgentState {
    /// Missing or unreadable state starts over empty.
    pub fn load(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| match serde_json::from_str(&content) {
                Ok(state) => Some(state),
                Err(e) => {
                    tracing::debug!(error = %e, "ignoring unreadable state file");
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// The last `ENDING_EXCERPT_CHARS` characters of `content`.
pub fn ending_excerpt(content: &str) -> String {
    let total = content.chars().count();
    content
        .chars()
        .skip(total.saturating_sub(ENDING_EXCERPT_CHARS))
        .collect()
}
