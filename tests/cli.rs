use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Blog</title>
    <item>
      <title>Third</title>
      <link>https://blog.example.com/3</link>
      <guid>post-3</guid>
      <category>notes</category>
    </item>
    <item>
      <title>Second</title>
      <link>https://blog.example.com/2</link>
      <guid>post-2</guid>
      <category>X</category>
    </item>
    <item>
      <title>First</title>
      <link>https://blog.example.com/1</link>
      <guid>post-1</guid>
      <category>x</category>
    </item>
  </channel>
</rss>"#;

fn write_feed(dir: &Path, xml: &str) -> String {
    let path = dir.join("index.xml");
    std::fs::write(&path, xml).unwrap();
    path.to_string_lossy().into_owned()
}

fn feedsync(feed: &str, state: &Path, extra: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_feedsync"));
    for var in [
        "RSS_FEED_URL",
        "STATE_FILE_PATH",
        "REQUIRED_TAG",
        "TWEET_FORMAT",
        "POST_MAX_LENGTH",
        "X_API_KEY",
        "X_API_SECRET",
        "X_ACCESS_TOKEN",
        "X_ACCESS_TOKEN_SECRET",
        "X_API_ENDPOINT",
    ] {
        cmd.env_remove(var);
    }
    cmd.arg("--feed")
        .arg(feed)
        .arg("--state-file")
        .arg(state)
        .args([
            "--pre-publish-delay",
            "0",
            "--success-delay",
            "0",
            "--duplicate-delay",
            "0",
        ])
        .args(extra)
        .output()
        .expect("run feedsync")
}

fn read_state(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

#[test]
fn malformed_feed_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    let feed = write_feed(dir.path(), "<html><body>not a feed</body></html>");
    let state = dir.path().join("state.txt");

    let output = feedsync(&feed, &state, &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(read_state(&state).is_none());
}

#[test]
fn missing_feed_file_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.txt");

    let output = feedsync(&dir.path().join("absent.xml").to_string_lossy(), &state, &[]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn empty_feed_is_a_successful_no_op() {
    let dir = TempDir::new().unwrap();
    let feed = write_feed(
        dir.path(),
        r#"<rss version="2.0"><channel><title>Empty</title></channel></rss>"#,
    );
    let state = dir.path().join("state.txt");

    let output = feedsync(&feed, &state, &[]);

    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(read_state(&state).is_none());
}

#[test]
fn first_run_without_tagged_entries_marks_feed_head() {
    let dir = TempDir::new().unwrap();
    let feed = write_feed(dir.path(), FEED);
    let state = dir.path().join("state.txt");

    let output = feedsync(&feed, &state, &["--required-tag", "rust"]);

    assert!(output.status.success());
    assert_eq!(read_state(&state).as_deref(), Some("post-3"));
}

#[test]
fn missing_credentials_keep_the_cursor_and_exit_cleanly() {
    let dir = TempDir::new().unwrap();
    let feed = write_feed(dir.path(), FEED);
    let state = dir.path().join("state.txt");
    std::fs::write(&state, "post-1").unwrap();

    let output = feedsync(&feed, &state, &["--required-tag", "X"]);

    assert!(output.status.success());
    assert_eq!(read_state(&state).as_deref(), Some("post-1"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing API credentials"), "stderr={stderr}");
}

#[test]
fn up_to_date_cursor_does_nothing() {
    let dir = TempDir::new().unwrap();
    let feed = write_feed(dir.path(), FEED);
    let state = dir.path().join("state.txt");
    std::fs::write(&state, "post-3").unwrap();

    let output = feedsync(&feed, &state, &["--required-tag", "X"]);

    assert!(output.status.success());
    assert_eq!(read_state(&state).as_deref(), Some("post-3"));
}

#[test]
fn dry_run_never_touches_the_state_file() {
    let dir = TempDir::new().unwrap();
    let feed = write_feed(dir.path(), FEED);
    let state = dir.path().join("state.txt");
    std::fs::write(&state, "post-1").unwrap();

    let output = feedsync(&feed, &state, &["--required-tag", "X", "--dry-run"]);

    assert!(output.status.success());
    assert_eq!(read_state(&state).as_deref(), Some("post-1"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("would publish"), "stderr={stderr}");
    assert!(stderr.contains("Second https://blog.example.com/2"), "stderr={stderr}");
}
