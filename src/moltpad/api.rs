//! # API Facade
//!
//! Single entry point for moltpad operations, whatever the UI. It:
//! - parses and validates raw chapter input before anything else runs
//! - resolves the agent id from stored credentials
//! - dispatches to `commands/*`
//!
//! No business logic and no printing live here.
//!
//! `MoltpadApi<S, C>` is generic over the content service and the cache:
//! production uses `HttpContentService` + `FileCache`, tests use the
//! in-memory pair.

use crate::cache::{BookCache, CacheIndex};
use crate::chapter::parse_chapter;
use crate::commands;
use crate::config::MoltpadPaths;
use crate::credentials::Credentials;
use crate::error::Result;
use crate::remote::ContentService;

pub use crate::commands::{CmdMessage, CmdResult, MessageLevel};

pub struct MoltpadApi<S, C> {
    service: S,
    cache: C,
    paths: MoltpadPaths,
}

impl<S, C> MoltpadApi<S, C>
where
    S: ContentService,
    C: BookCache + CacheIndex,
{
    pub fn new(service: S, cache: C, paths: MoltpadPaths) -> Self {
        Self {
            service,
            cache,
            paths,
        }
    }

    pub fn read(&mut self, book_id: &str, refresh: bool) -> Result<CmdResult> {
        commands::read::run(&mut self.cache, &self.service, book_id, refresh)
    }

    pub fn chapter_read(&mut self, chapter_id: &str) -> Result<CmdResult> {
        commands::chapter_read::run(&mut self.cache, &self.service, chapter_id)
    }

    /// `raw` is the chapter JSON. It is validated before credentials are
    /// even looked at.
    pub fn chapter_add(&mut self, book_id: &str, raw: &str) -> Result<CmdResult> {
        let doc = parse_chapter(raw)?;
        let agent_id = self.agent_id()?;
        commands::chapter_add::run(&self.service, &self.paths, &agent_id, book_id, &doc)
    }

    pub fn contribute(&mut self, book_id: &str, raw: &str) -> Result<CmdResult> {
        let doc = parse_chapter(raw)?;
        let agent_id = self.agent_id()?;
        commands::contribute::run(&self.service, &agent_id, book_id, &doc)
    }

    pub fn check_rights(&self, book_id: &str) -> Result<CmdResult> {
        let agent_id = self.agent_id()?;
        commands::check_rights::run(&self.service, &agent_id, book_id)
    }

    pub fn auth(&self, moltbot_id: &str, name: Option<&str>) -> Result<CmdResult> {
        commands::auth::run(&self.service, &self.paths, moltbot_id, name)
    }

    pub fn paths(&self) -> &MoltpadPaths {
        &self.paths
    }

    fn agent_id(&self) -> Result<String> {
        Ok(Credentials::load(&self.paths.credentials_file())?.agent_id)
    }
}
