//! Structural and content checks for chapter JSON.
//!
//! Validation runs on the raw [`serde_json::Value`] rather than the typed
//! [`ChapterDocument`](crate::model::ChapterDocument): input comes from
//! stdin and may have any shape, and every problem should be reported at
//! once instead of stopping at the first one.

use crate::model::SegmentKind;
use serde_json::{Map, Value};

/// Raw inline tags that have a structured segment equivalent, paired with
/// the segment kind to use instead.
const RAW_TAGS: [(&str, SegmentKind); 6] = [
    ("thought", SegmentKind::Monolog),
    ("whisper", SegmentKind::Whisper),
    ("shout", SegmentKind::Shout),
    ("emphasis", SegmentKind::Emphasis),
    ("center", SegmentKind::Center),
    ("right", SegmentKind::Right),
];

/// Returns every violation found in `doc`, in rule order. Empty means valid.
pub fn validate(doc: &Value) -> Vec<String> {
    let Some(obj) = doc.as_object() else {
        return vec![format!(
            "Input must be a JSON object, not {}",
            json_type_name(doc)
        )];
    };

    let mut violations = Vec::new();

    let title = obj.get("title");
    match title {
        None => violations.push("Missing required field: 'title'".to_string()),
        Some(Value::String(s)) if !s.trim().is_empty() => {}
        Some(_) => violations.push("'title' must be a non-empty string".to_string()),
    }

    let segments = match obj.get("segments") {
        None => {
            violations.push("Missing required field: 'segments'".to_string());
            return violations;
        }
        Some(Value::Array(items)) if items.is_empty() => {
            violations.push("'segments' must not be empty".to_string());
            return violations;
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            violations.push("'segments' must be an array".to_string());
            return violations;
        }
    };

    for (i, seg) in segments.iter().enumerate() {
        check_segment(i, seg, &mut violations);
    }

    if let (Some(Value::String(title)), Some(first)) = (title, segments.first()) {
        if heading_duplicates_title(first, title) {
            violations.push(
                "segments[0]: heading text duplicates the chapter title. \
                 Remove this segment, the title field is displayed automatically."
                    .to_string(),
            );
        }
    }

    violations
}

fn check_segment(index: usize, seg: &Value, violations: &mut Vec<String>) {
    let prefix = format!("segments[{}]", index);

    let Some(seg) = seg.as_object() else {
        violations.push(format!("{}: each segment must be an object", prefix));
        return;
    };

    let kind = match seg.get("type") {
        None => {
            violations.push(format!("{}: missing required field 'type'", prefix));
            return;
        }
        Some(raw) => match raw.as_str().and_then(|s| s.parse::<SegmentKind>().ok()) {
            Some(kind) => kind,
            None => {
                violations.push(format!(
                    "{}: unknown type '{}'. Valid: {}",
                    prefix,
                    raw.as_str().map(str::to_string).unwrap_or_else(|| raw.to_string()),
                    known_kinds()
                ));
                return;
            }
        },
    };

    if kind == SegmentKind::SceneBreak {
        if seg.contains_key("text") {
            violations.push(format!(
                "{}: 'scene_break' must not have a 'text' field",
                prefix
            ));
        }
        if seg.contains_key("narrative") {
            violations.push(format!(
                "{}: 'scene_break' does not support 'narrative' field",
                prefix
            ));
        }
        return;
    }

    let text = seg.get("text");
    match text {
        None => violations.push(format!("{}: '{}' requires a 'text' field", prefix, kind)),
        Some(Value::String(s)) if !s.trim().is_empty() => {}
        Some(_) => violations.push(format!("{}: 'text' must be a non-empty string", prefix)),
    }

    check_narrative(&prefix, kind, seg, violations);

    if let Some(Value::String(text)) = text {
        if let Some(violation) = raw_tag_violation(&prefix, text) {
            violations.push(violation);
        }
        if kind == SegmentKind::Text {
            if let Some(dash) = leading_dialogue_dash(text) {
                violations.push(format!(
                    "{}: text starts with dialogue dash '{}'. \
                     Use {{\"type\": \"dialogue\"}} segment instead.",
                    prefix, dash
                ));
            }
        }
    }
}

fn check_narrative(
    prefix: &str,
    kind: SegmentKind,
    seg: &Map<String, Value>,
    violations: &mut Vec<String>,
) {
    let Some(narrative) = seg.get("narrative") else {
        return;
    };

    if !kind.allows_narrative() {
        let speech: Vec<&str> = SegmentKind::ALL
            .iter()
            .filter(|k| k.allows_narrative())
            .map(|k| k.as_str())
            .collect();
        violations.push(format!(
            "{}: '{}' does not support 'narrative' field. Only {} do.",
            prefix,
            kind,
            speech.join(", ")
        ));
        return;
    }

    match narrative {
        Value::String(s) if !s.trim().is_empty() => {}
        _ => violations.push(format!(
            "{}: 'narrative' must be a non-empty string",
            prefix
        )),
    }
}

/// At most one violation per segment, for the first raw tag found.
fn raw_tag_violation(prefix: &str, text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    RAW_TAGS
        .iter()
        .find(|(tag, _)| {
            lower.contains(&format!("[{}]", tag)) || lower.contains(&format!("[/{}]", tag))
        })
        .map(|(tag, kind)| {
            format!(
                "{}: text contains raw '[{}]' tag. \
                 Use {{\"type\": \"{}\"}} segment instead of putting tags in text.",
                prefix, tag, kind
            )
        })
}

fn leading_dialogue_dash(text: &str) -> Option<char> {
    let trimmed = text.trim();
    if trimmed.starts_with("\u{2014} ") {
        Some('\u{2014}')
    } else if trimmed.starts_with("- ") {
        Some('-')
    } else {
        None
    }
}

/// Permissive by construction: a short title contained anywhere in the
/// first heading counts as a duplicate.
fn heading_duplicates_title(first: &Value, title: &str) -> bool {
    let title = title.trim().to_lowercase();
    if title.is_empty() {
        return false;
    }
    let Some(seg) = first.as_object() else {
        return false;
    };
    if seg.get("type").and_then(Value::as_str) != Some(SegmentKind::Heading.as_str()) {
        return false;
    }
    match seg.get("text").and_then(Value::as_str) {
        Some(text) => {
            let heading = text.trim().to_lowercase();
            heading == title || heading.contains(&title)
        }
        None => false,
    }
}

fn known_kinds() -> String {
    let mut names: Vec<&str> = SegmentKind::ALL.iter().map(|k| k.as_str()).collect();
    names.sort_unstable();
    names.join(", ")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
