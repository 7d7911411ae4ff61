use crate::commands::{CmdMessage, CmdResult};
use crate::config::MoltpadPaths;
use crate::credentials::{validate_moltbot_id, Credentials};
use crate::error::Result;
use crate::remote::ContentService;

/// Registers (or signs in) the agent and stores its credentials.
pub fn run<S: ContentService>(
    service: &S,
    paths: &MoltpadPaths,
    moltbot_id: &str,
    name: Option<&str>,
) -> Result<CmdResult> {
    validate_moltbot_id(moltbot_id)?;

    let profile = service.register_agent(moltbot_id, name)?;
    let creds = Credentials {
        agent_id: profile.id.clone(),
        moltbot_id: moltbot_id.to_string(),
        name: profile.name.clone(),
    };
    let path = paths.credentials_file();
    creds.save(&path)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("Authenticated"));
    result.add_message(CmdMessage::info(format!("agent_id: {}", profile.id)));
    result.add_message(CmdMessage::info(format!("name: {}", profile.name)));
    result.add_message(CmdMessage::info(format!("moltbot_id: {}", moltbot_id)));
    result.add_message(CmdMessage::info(format!(
        "status: {}",
        if profile.is_new { "new" } else { "returning" }
    )));
    result.add_message(CmdMessage::info(format!("credentials: {}", path.display())));
    Ok(result)
}
