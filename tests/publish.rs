//! End-to-end publishing against a scratch blog tree, with a fake Markdown
//! converter in place of the pandoc subprocess.

use atom_syndication::Feed;
use blogpub::markdown::{self, Render};
use blogpub::post::Overrides;
use blogpub::publish::{publish, Job};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Converter stand-in: wraps the input in a single paragraph.
struct FakeConverter;

impl Render for FakeConverter {
    fn render(&self, markdown: &str) -> markdown::Result<String> {
        Ok(format!("<p>{}</p>\n", markdown.trim()))
    }
}

const INDEX: &str = "<html><body>\n      <ul class=\"post-list\"></ul>\n</body></html>\n";

const FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom"><title>My Blog</title><id>/blog/</id><updated>2020-01-01T00:00:00+00:00</updated></feed>"#;

fn scratch_blog() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), INDEX).unwrap();
    fs::write(dir.path().join("feed.xml"), FEED).unwrap();
    let source = dir.path().join("post.md");
    fs::write(
        &source,
        "---\ntitle: Hello, World!\ndate: 2025-01-02\n---\nSome body text.\n",
    )
    .unwrap();
    (dir, source)
}

fn job<'a>(source: &Path, root: &Path, converter: &'a dyn Render, dry_run: bool) -> Job<'a> {
    Job {
        markdown_path: source.to_owned(),
        overrides: Overrides::default(),
        dry_run,
        blog_root: root.to_owned(),
        converter,
    }
}

#[test]
fn test_publish_writes_page_index_and_feed() {
    let (dir, source) = scratch_blog();
    publish(job(&source, dir.path(), &FakeConverter, false)).unwrap();

    // The post page exists at the derived path and is fully templated.
    let page_path = dir.path().join("2025/01/02/hello-world.html");
    let page = fs::read_to_string(&page_path).unwrap();
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<title>Hello, World! - My Blog</title>"));
    assert!(page.contains(">January 2, 2025</p>"));
    assert!(page.contains("<p>Some body text.</p>"));

    // The index was rebuilt with the new post.
    let index = fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert_eq!(index.matches("<li>").count(), 1);
    assert!(index.contains("href=\"/blog/2025/01/02/hello-world.html\""));

    // The feed gained exactly one entry carrying the post's date.
    let feed =
        Feed::read_from(BufReader::new(fs::File::open(dir.path().join("feed.xml")).unwrap()))
            .unwrap();
    assert_eq!(feed.entries.len(), 1);
    assert_eq!(feed.entries[0].id, "/blog/2025/01/02/hello-world.html");
    assert_eq!(
        feed.entries[0].updated.date_naive(),
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    );
}

#[test]
fn test_dry_run_touches_nothing() {
    let (dir, source) = scratch_blog();
    publish(job(&source, dir.path(), &FakeConverter, true)).unwrap();

    assert!(!dir.path().join("2025").exists());
    assert_eq!(fs::read_to_string(dir.path().join("index.html")).unwrap(), INDEX);
    assert_eq!(fs::read_to_string(dir.path().join("feed.xml")).unwrap(), FEED);
}

#[test]
fn test_publish_without_index_or_feed_still_writes_post() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("post.md");
    fs::write(&source, "# Standalone\n\nbody\n").unwrap();

    let mut j = job(&source, dir.path(), &FakeConverter, false);
    j.overrides.date = Some(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
    publish(j).unwrap();

    assert!(dir.path().join("2025/03/04/standalone.html").exists());
}

#[test]
fn test_insert_strategy_prepends_single_item() {
    let (dir, source) = scratch_blog();
    fs::write(dir.path().join("blog.yaml"), "index_strategy: insert\n").unwrap();

    publish(job(&source, dir.path(), &FakeConverter, false)).unwrap();

    let index = fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert_eq!(index.matches("<li>").count(), 1);
    assert!(index.contains("Hello, World!"));
}

#[test]
fn test_converter_failure_aborts_before_any_write() {
    struct FailingConverter;
    impl Render for FailingConverter {
        fn render(&self, _markdown: &str) -> markdown::Result<String> {
            Err(markdown::Error::Failed {
                status: Some(64),
                stderr: "went sideways".to_owned(),
            })
        }
    }

    let (dir, source) = scratch_blog();
    let err = publish(job(&source, dir.path(), &FailingConverter, false)).unwrap_err();
    assert!(err.to_string().contains("went sideways"));

    assert!(!dir.path().join("2025").exists());
    assert_eq!(fs::read_to_string(dir.path().join("feed.xml")).unwrap(), FEED);
}
