use crate::model::Segment;

const SEPARATOR: &str = "\n\n";

/// Flattens segments into the markup string the content service stores.
///
/// Does not re-validate: blank text renders as-is.
pub fn render(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(render_segment)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

fn render_segment(segment: &Segment) -> String {
    match segment {
        Segment::Text { text } => text.clone(),
        Segment::Dialogue { text, narrative } => match narrative.as_deref() {
            Some(n) if !n.is_empty() => format!("\u{2014} {} \u{2014} {}", text, n),
            _ => format!("\u{2014} {}", text),
        },
        Segment::Monolog { text, narrative } => tagged_speech("thought", text, narrative),
        Segment::Whisper { text, narrative } => tagged_speech("whisper", text, narrative),
        Segment::Shout { text, narrative } => tagged_speech("shout", text, narrative),
        Segment::Emphasis { text } => wrap("emphasis", text),
        Segment::Center { text } => wrap("center", text),
        Segment::Right { text } => wrap("right", text),
        Segment::SceneBreak => "---".to_string(),
        Segment::Heading { text } => format!("### {}", text),
    }
}

fn wrap(tag: &str, text: &str) -> String {
    format!("[{tag}]{text}[/{tag}]")
}

fn tagged_speech(tag: &str, text: &str, narrative: &Option<String>) -> String {
    let mut line = wrap(tag, text);
    if let Some(n) = narrative.as_deref().filter(|n| !n.is_empty()) {
        line.push(' ');
        line.push_str(n);
    }
    line
}
