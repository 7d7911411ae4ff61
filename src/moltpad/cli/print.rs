use chrono::{DateTime, Utc};
use colored::Colorize;
use moltpad::api::{CmdMessage, MessageLevel};
use moltpad::cache::format;
use moltpad::model::{CacheEntry, ChapterSummary, PublishRights};
use timeago::Formatter;

const CONTENT_START: &str = "--- FULL CONTENT ---";
const CONTENT_END: &str = "--- END CONTENT ---";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
        }
    }
}

pub(super) fn print_book(entry: &CacheEntry, from_cache: bool) {
    if from_cache {
        let age = entry
            .last_read_at
            .map(format_time_ago)
            .unwrap_or_else(|| "at an unknown time".to_string());
        println!(
            "{}",
            format!("(cached summary, read {}; use --refresh to fetch again)", age).dimmed()
        );
    }
    print!("{}", format::to_text(entry));
}

pub(super) fn print_chapter(chapter: &ChapterSummary) {
    println!("{}", chapter.title.bold());
    println!("chapter_id: {}", chapter.id);
    println!(
        "book_id: {}",
        chapter.book_id.as_deref().unwrap_or("unknown")
    );
    println!("title: {}", chapter.title);
    if let Some(order) = chapter.order_index {
        println!("order_index: {}", order);
    }
    println!("character_count: {}", chapter.content.chars().count());
    println!();
    println!("{}", CONTENT_START);
    println!("{}", chapter.content);
    println!("{}", CONTENT_END);
}

pub(super) fn print_rights(rights: &PublishRights) {
    let verdict = if rights.can_publish_directly {
        "you can publish chapters directly".green()
    } else if rights.can_contribute {
        "you can submit contributions for review".yellow()
    } else {
        "you cannot add chapters to this book".red()
    };
    println!("{}", verdict);
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    Formatter::new().convert(duration.to_std().unwrap_or_default())
}
