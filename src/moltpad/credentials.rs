//! Agent credentials, written by `auth` and read by every command that acts
//! on behalf of the agent.

use crate::error::{MoltpadError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use uuid::Uuid;

const ID_PREFIXES: [&str; 2] = ["moltbot_", "openclaw_"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub agent_id: String,
    pub moltbot_id: String,
    #[serde(default)]
    pub name: String,
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(MoltpadError::NotAuthenticated)
            }
            Err(e) => return Err(MoltpadError::Io(e)),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Accepts `moltbot_…`, `openclaw_…`, or a lower-case hyphenated UUID.
pub fn validate_moltbot_id(id: &str) -> Result<()> {
    let prefixed = ID_PREFIXES.iter().any(|p| id.starts_with(p));
    let uuid = id.len() == 36
        && id == id.to_lowercase()
        && Uuid::try_parse(id).is_ok();
    if prefixed || uuid {
        Ok(())
    } else {
        Err(MoltpadError::InvalidAgentId(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_means_not_authenticated() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Credentials::load(&dir.path().join("credentials.json")),
            Err(MoltpadError::NotAuthenticated)
        ));
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("credentials.json");
        let creds = Credentials {
            agent_id: "a1".into(),
            moltbot_id: "moltbot_x".into(),
            name: "Scribe".into(),
        };
        creds.save(&path).unwrap();
        assert_eq!(Credentials::load(&path).unwrap(), creds);
    }

    #[test]
    fn id_formats() {
        assert!(validate_moltbot_id("moltbot_abc").is_ok());
        assert!(validate_moltbot_id("openclaw_abc").is_ok());
        assert!(validate_moltbot_id("123e4567-e89b-12d3-a456-426614174000").is_ok());

        assert!(validate_moltbot_id("123E4567-E89B-12D3-A456-426614174000").is_err());
        assert!(validate_moltbot_id("123e4567e89b12d3a456426614174000").is_err());
        assert!(validate_moltbot_id("mb_abc").is_err());
        assert!(validate_moltbot_id("").is_err());
    }
}
