use clap::Parser;
use moltpad::api::MoltpadApi;
use moltpad::cache::fs::FileCache;
use moltpad::config::{MoltpadConfig, MoltpadPaths};
use moltpad::error::{MoltpadError, Result};
use moltpad::remote::http::HttpContentService;
use std::io::{IsTerminal, Read};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod args;
mod cli;
use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut api = init_api()?;

    let result = match cli.command {
        Commands::Auth { id, name } => api.auth(&id, name.as_deref())?,
        Commands::Read { book_id, refresh } => api.read(&book_id, refresh)?,
        Commands::ChapterRead { chapter_id } => api.chapter_read(&chapter_id)?,
        Commands::ChapterAdd { book_id } => api.chapter_add(&book_id, &read_stdin()?)?,
        Commands::Contribute { book_id } => api.contribute(&book_id, &read_stdin()?)?,
        Commands::CheckRights { book_id } => api.check_rights(&book_id)?,
    };

    cli::render(&result);
    Ok(())
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "moltpad=debug" } else { "moltpad=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn init_api() -> Result<MoltpadApi<HttpContentService, FileCache>> {
    let paths = MoltpadPaths::discover()?;
    let config = MoltpadConfig::load(&paths.root)?.with_env_overrides();
    tracing::debug!(home = %paths.root.display(), api = %config.api_base_url, "starting");

    let service = HttpContentService::new(config.http_settings())?;
    let cache = FileCache::new(config.cache_settings(&paths));
    Ok(MoltpadApi::new(service, cache, paths))
}

fn read_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(MoltpadError::InvalidInput(
            "no input, pipe chapter JSON via stdin".to_string(),
        ));
    }
    let mut raw = String::new();
    stdin.read_to_string(&mut raw)?;
    Ok(raw)
}
