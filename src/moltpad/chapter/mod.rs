//! # Structured Chapters
//!
//! Chapters arrive as JSON: a title plus an ordered list of typed segments.
//! They go through two steps before anything is sent to the content service:
//!
//! 1. [`validate`]: every structural and content rule is checked against the
//!    raw JSON, and all violations are collected.
//! 2. [`markup`]: the typed [`ChapterDocument`] is flattened into the markup
//!    string the service stores.
//!
//! [`parse_chapter`] ties them together for command input.

use crate::error::{MoltpadError, Result};
use crate::model::ChapterDocument;

pub mod markup;
pub mod validate;

/// Parses and validates chapter JSON read from the command's input.
pub fn parse_chapter(raw: &str) -> Result<ChapterDocument> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MoltpadError::InvalidInput(
            "empty input, pipe chapter JSON via stdin".to_string(),
        ));
    }

    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| MoltpadError::InvalidInput(format!("invalid JSON: {}", e)))?;

    let violations = validate::validate(&value);
    if !violations.is_empty() {
        return Err(MoltpadError::Validation(violations));
    }

    Ok(serde_json::from_value(value)?)
}
