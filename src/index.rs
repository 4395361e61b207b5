//! Keeping the site index's post listing in sync with published posts.
//!
//! Two strategies are supported. `insert_entry` prepends one item to the
//! existing list; `rebuild` rescans every post page under the blog root and
//! regenerates the whole list. Both locate the list container inside
//! `index.html` and leave the file untouched (with a warning) when the
//! container cannot be found.

use crate::config::SiteConfig;
use crate::template::short_date;
use crate::util::{escape_html, unescape_html};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::warn;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

const LIST_OPEN: &str = "<ul class=\"post-list\">";
const LIST_CLOSE: &str = "</ul>";

static CONTAINER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<ul class="post-list">.*?</ul>"#).unwrap());
static TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<title>(.+?)</title>").unwrap());
static POST_META: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<p class="post-meta"[^>]*>([^<]+)</p>"#).unwrap());

/// One row of the index listing.
pub struct IndexEntry {
    pub title: String,
    pub date: NaiveDate,
    pub url: String,
}

/// Inserts a single listing item immediately after the list's opening tag.
///
/// The index is assumed to already be newest-first, so prepending keeps it
/// that way. A missing container is a warning, not an error, and leaves the
/// file unmodified.
pub fn insert_entry(index_path: &Path, entry: &IndexEntry) -> Result<()> {
    let content = fs::read_to_string(index_path)
        .with_context(|| format!("Reading index file `{}`", index_path.display()))?;

    let open_end = match content.find(LIST_OPEN) {
        Some(pos) => pos + LIST_OPEN.len(),
        None => {
            warn!(
                "Could not find post-list in `{}`; index not updated",
                index_path.display()
            );
            return Ok(());
        }
    };

    let mut updated = String::with_capacity(content.len() + 256);
    updated.push_str(&content[..open_end]);
    updated.push_str("\n        ");
    updated.push_str(&render_item(entry));
    updated.push_str(&content[open_end..]);
    fs::write(index_path, updated)
        .with_context(|| format!("Writing index file `{}`", index_path.display()))?;
    Ok(())
}

/// Rebuilds the whole listing from the post pages on disk.
///
/// Returns the number of posts listed. A missing container is a warning and
/// leaves the file unmodified (returning 0).
pub fn rebuild(index_path: &Path, blog_root: &Path, config: &SiteConfig) -> Result<usize> {
    let entries = scan_posts(blog_root, config);
    let content = fs::read_to_string(index_path)
        .with_context(|| format!("Reading index file `{}`", index_path.display()))?;

    let range = match CONTAINER.find(&content) {
        Some(m) => m.range(),
        None => {
            warn!(
                "Could not find post-list in `{}`; index not updated",
                index_path.display()
            );
            return Ok(0);
        }
    };

    let items: Vec<String> = entries.iter().map(render_item).collect();
    // Splice the replacement in by range rather than Regex::replace so that
    // titles containing `$` cannot be misread as capture references.
    let mut updated = String::with_capacity(content.len() + 256 * items.len());
    updated.push_str(&content[..range.start]);
    updated.push_str(LIST_OPEN);
    updated.push_str("\n        ");
    updated.push_str(&items.join("\n        "));
    updated.push_str("\n      ");
    updated.push_str(LIST_CLOSE);
    updated.push_str(&content[range.end..]);
    fs::write(index_path, updated)
        .with_context(|| format!("Writing index file `{}`", index_path.display()))?;
    Ok(entries.len())
}

/// Collects `(title, date, url)` for every post page under the blog root,
/// newest first.
///
/// `index.html`, `404.html`, and anything inside an `about/` directory are
/// not posts. A page that fails title or date extraction is skipped with a
/// warning and never aborts the scan. Traversal is directory-listing order
/// sorted by file name, and the sort below is stable, so posts sharing a
/// date keep that traversal order.
pub fn scan_posts(blog_root: &Path, config: &SiteConfig) -> Vec<IndexEntry> {
    let mut entries = Vec::new();

    let walker = walkdir::WalkDir::new(blog_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|result| match result {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                None
            }
        });

    for dir_entry in walker {
        if !is_post_page(dir_entry.path()) {
            continue;
        }
        match read_entry(dir_entry.path(), blog_root, config) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!("Could not parse `{}`: {}", dir_entry.path().display(), e),
        }
    }

    entries.sort_by(|a, b| b.date.cmp(&a.date));
    entries
}

fn is_post_page(path: &Path) -> bool {
    if path.extension().map_or(true, |ext| ext != "html") {
        return false;
    }
    match path.file_name().and_then(|name| name.to_str()) {
        Some("index.html") | Some("404.html") | None => false,
        Some(_) => path
            .parent()
            .and_then(|dir| dir.file_name())
            .map_or(true, |dir| dir != "about"),
    }
}

fn read_entry(path: &Path, blog_root: &Path, config: &SiteConfig) -> Result<IndexEntry> {
    let content = fs::read_to_string(path)?;

    let title = TITLE
        .captures(&content)
        .map(|caps| strip_site_suffix(&caps[1], &config.site_name))
        .context("no <title> element")?;

    let date_text = POST_META
        .captures(&content)
        .map(|caps| caps[1].trim().to_owned())
        .context("no post-meta date")?;
    let date = parse_meta_date(&date_text)
        .with_context(|| format!("unrecognized date `{}`", date_text))?;

    let rel_path = path.strip_prefix(blog_root).unwrap_or(path);
    Ok(IndexEntry {
        title: unescape_html(&title),
        date,
        url: format!("{}/{}", config.base_url, rel_path.display()),
    })
}

/// Accepts the two date spellings post pages have carried over time,
/// e.g. `December 7, 2025` and `Dec 7, 2025`.
fn parse_meta_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%B %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(text, "%b %d, %Y"))
        .ok()
}

/// Drops a trailing ` - <site name>` from an extracted page title.
fn strip_site_suffix(title: &str, site_name: &str) -> String {
    if let Some(rest) = title.strip_suffix(site_name) {
        if let Some(rest) = rest.trim_end().strip_suffix('-') {
            return rest.trim_end().to_owned();
        }
    }
    title.to_owned()
}

fn render_item(entry: &IndexEntry) -> String {
    format!(
        "<li>\n          <span class=\"post-meta\">{}</span>\n          <h3>\n            \
         <a class=\"post-link\" href=\"{}\">\n              {}\n            </a>\n          \
         </h3>\n        </li>",
        short_date(entry.date),
        entry.url,
        escape_html(&entry.title),
    )
}
