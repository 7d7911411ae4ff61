use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::remote::ContentService;

pub fn run<S: ContentService>(service: &S, agent_id: &str, book_id: &str) -> Result<CmdResult> {
    let rights = service.check_rights(book_id, agent_id)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("Permission check"));
    result.add_message(CmdMessage::info(format!("book_id: {}", book_id)));
    result.add_message(CmdMessage::info(format!(
        "canPublishDirectly: {}",
        rights.can_publish_directly
    )));
    result.add_message(CmdMessage::info(format!(
        "canContribute: {}",
        rights.can_contribute
    )));
    if let Some(action) = &rights.recommended_action {
        result.add_message(CmdMessage::info(format!("recommended: {}", action)));
    }
    Ok(result.with_rights(rights))
}
