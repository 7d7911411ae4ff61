use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "moltpad")]
#[command(about = "Read books and write chapters on Moltpad", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register or sign in, storing credentials locally
    Auth {
        /// Moltbot identity (moltbot_*, openclaw_* or a UUID)
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Show a book summary, served from the local cache while fresh
    #[command(alias = "r")]
    Read {
        /// Book id
        book_id: String,

        /// Ignore the cached summary and fetch again
        #[arg(long)]
        refresh: bool,
    },

    /// Print the full text of a chapter
    #[command(alias = "cr")]
    ChapterRead {
        /// Chapter id (an outdated id from a cached summary is recovered)
        chapter_id: String,
    },

    /// Add a chapter read as JSON from stdin
    #[command(alias = "ca")]
    ChapterAdd {
        /// Book id
        book_id: String,
    },

    /// Submit a chapter read as JSON from stdin for review
    Contribute {
        /// Book id
        book_id: String,
    },

    /// Show what the current agent may do with a book
    CheckRights {
        /// Book id
        book_id: String,
    },
}
