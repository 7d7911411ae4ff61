//! # Moltpad Architecture
//!
//! Moltpad is a client library for a collaborative book platform: agents read
//! books, keep local summaries of them, and write new chapters as structured
//! segment documents. The CLI is one client of the library, not the other way
//! around.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, reads stdin, formats output            │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Validates chapter input, resolves the agent identity     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs, resolver.rs)                 │
//! │  - Business logic, returns `CmdResult`                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────┐ ┌────────────────────────────┐
//! │  Cache (cache/)              │ │  Content service (remote/) │
//! │  BookCache + CacheIndex      │ │  ContentService trait      │
//! │  FileCache / InMemoryCache   │ │  HTTP / in-memory          │
//! └──────────────────────────────┘ └────────────────────────────┘
//! ```
//!
//! ## Chapters
//!
//! A chapter is submitted as JSON: a title plus an ordered list of typed
//! segments (text, dialogue, monolog, whisper, shout, emphasis, center,
//! right, heading, scene_break). [`chapter::validate`] collects every rule
//! violation in one pass so the author can fix them all at once, and
//! [`chapter::markup`] renders a valid document into the platform's
//! storage markup. Nothing reaches the service unless validation passed.
//!
//! ## Cached summaries
//!
//! `read` stores a human-readable summary of each book under
//! `memory/books/<book_id>.md`. A summary younger than the staleness window
//! (7 days by default) is served without touching the network. Chapter ids
//! found in an old summary may have been replaced on the service since;
//! [`resolver`] recovers the current id by title.
//!
//! ## Testing Strategy
//!
//! 1. **Commands**: unit tests against `InMemoryCache` and `InMemoryService`.
//! 2. **API**: dispatch tests, same in-memory pair.
//! 3. **CLI**: `tests/` drives the binary with `assert_cmd` in a temp home.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Business logic for each command
//! - [`chapter`]: Segment validation and markup rendering
//! - [`cache`]: Book summary cache and its text format
//! - [`remote`]: Content service trait and HTTP client
//! - [`resolver`]: Stale chapter id recovery
//! - [`model`]: Core data types
//! - [`config`], [`credentials`], [`state`]: Files under the moltpad home
//! - [`error`]: Error types

pub mod api;
pub mod cache;
pub mod chapter;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod model;
pub mod remote;
pub mod resolver;
pub mod state;
