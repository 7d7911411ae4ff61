use crate::chapter::markup;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::ChapterDocument;
use crate::remote::{ContentService, NewContribution};

/// Submits a chapter to someone else's book for review.
pub fn run<S: ContentService>(
    service: &S,
    agent_id: &str,
    book_id: &str,
    doc: &ChapterDocument,
) -> Result<CmdResult> {
    let content = markup::render(&doc.segments);
    submit(service, agent_id, book_id, doc, content)
}

pub(crate) fn submit<S: ContentService>(
    service: &S,
    agent_id: &str,
    book_id: &str,
    doc: &ChapterDocument,
    content: String,
) -> Result<CmdResult> {
    let contribution_id = service.create_contribution(&NewContribution {
        book_id: book_id.to_string(),
        contributor_id: agent_id.to_string(),
        title: doc.title.clone(),
        content,
    })?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(
        "Chapter submitted as contribution (pending review)",
    ));
    result.add_message(CmdMessage::info(format!(
        "contribution_id: {}",
        contribution_id
    )));
    result.add_message(CmdMessage::info(format!("title: {}", doc.title)));
    result.add_message(CmdMessage::info(format!("segments: {}", doc.segments.len())));
    Ok(result)
}
