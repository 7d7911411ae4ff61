use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use std::fs;
use std::path::Path;

// Nothing listens on the discard port, so any request fails fast.
const UNREACHABLE_API: &str = "http://127.0.0.1:9";

fn moltpad(home: &Path) -> Command {
    // No retries: a refused connection should fail on the first attempt.
    fs::write(home.join("config.json"), r#"{"retries": 0}"#).unwrap();

    let mut cmd = Command::cargo_bin("moltpad").unwrap();
    cmd.env("MOLTPAD_HOME", home)
        .env("MOLTPAD_API_URL", UNREACHABLE_API)
        .env_remove("RUST_LOG");
    cmd
}

fn write_summary(home: &Path, book_id: &str, read_at: chrono::DateTime<Utc>) {
    let dir = home.join("memory").join("books");
    fs::create_dir_all(&dir).unwrap();
    let text = format!(
        "# Book Summary: The Long Night\n\
         **Book ID**: {book_id}\n\
         **Author**: Ada\n\
         **Publisher**: Nightfall Press\n\
         **Last Read**: {}\n\
         **Chapters**: 1\n\
         \n\
         ## Chapters\n\
         - **Dusk** (id: c1): The sun went down.",
        read_at.format("%Y-%m-%dT%H:%M:%SZ")
    );
    fs::write(dir.join(format!("{}.md", book_id)), text).unwrap();
}

#[test]
fn chapter_add_lists_every_violation() {
    let home = tempfile::tempdir().unwrap();
    let input = r#"{
        "title": "Dawn",
        "segments": [
            {"type": "scene_break", "text": "***"},
            {"type": "heading", "text": "Dawn", "narrative": "oops"},
            {"type": "text", "text": "[whisper]psst[/whisper]"}
        ]
    }"#;

    moltpad(home.path())
        .arg("chapter-add")
        .arg("b1")
        .write_stdin(input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid chapter JSON"))
        .stderr(predicate::str::contains("segments[0]"))
        .stderr(predicate::str::contains("segments[1]"))
        .stderr(predicate::str::contains("segments[2]"));
}

#[test]
fn chapter_add_rejects_malformed_json() {
    let home = tempfile::tempdir().unwrap();

    moltpad(home.path())
        .arg("chapter-add")
        .arg("b1")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn valid_chapter_still_needs_credentials() {
    let home = tempfile::tempdir().unwrap();

    moltpad(home.path())
        .arg("contribute")
        .arg("b1")
        .write_stdin(r#"{"title":"Dawn","segments":[{"type":"text","text":"Light."}]}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not authenticated"));
}

#[test]
fn fresh_summary_is_served_offline() {
    let home = tempfile::tempdir().unwrap();
    write_summary(home.path(), "b1", Utc::now() - Duration::days(2));

    moltpad(home.path())
        .arg("read")
        .arg("b1")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Book Summary: The Long Night"))
        .stdout(predicate::str::contains("(id: c1)"))
        .stdout(predicate::str::contains("cached summary"));
}

#[test]
fn stale_summary_goes_to_the_network() {
    let home = tempfile::tempdir().unwrap();
    write_summary(home.path(), "b1", Utc::now() - Duration::days(8));

    moltpad(home.path())
        .arg("read")
        .arg("b1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot reach the Moltpad API"));
}

#[test]
fn refresh_bypasses_fresh_summary() {
    let home = tempfile::tempdir().unwrap();
    write_summary(home.path(), "b1", Utc::now());

    moltpad(home.path())
        .arg("read")
        .arg("b1")
        .arg("--refresh")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot reach the Moltpad API"));
}

#[test]
fn check_rights_without_credentials() {
    let home = tempfile::tempdir().unwrap();

    moltpad(home.path())
        .arg("check-rights")
        .arg("b1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not authenticated"));
}

#[test]
fn auth_rejects_malformed_id() {
    let home = tempfile::tempdir().unwrap();

    moltpad(home.path())
        .args(["auth", "--id", "somebody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid agent id"));
}
