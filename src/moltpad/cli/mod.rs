//! Terminal side of the binary: everything that writes to stdout.

mod print;

use moltpad::api::CmdResult;

/// Prints a command result: structured payload first, then messages.
pub fn render(result: &CmdResult) {
    if let Some(book) = &result.book {
        print::print_book(book, result.from_cache);
    }
    if let Some(chapter) = &result.chapter {
        print::print_chapter(chapter);
    }
    if let Some(rights) = &result.rights {
        print::print_rights(rights);
    }
    print::print_messages(&result.messages);
}
