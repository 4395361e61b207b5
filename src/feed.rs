//! Support for adding published posts to the site's persisted Atom feed.
//!
//! Unlike the index, the feed is not regenerated from scratch: `feed.xml` is
//! parsed into an [`atom_syndication::Feed`], a new entry is inserted at the
//! front of the entry list (entries are ordered newest-first), the feed-level
//! `updated` timestamp is refreshed, and the document is serialized back.
//! For a feed with no entries yet, the same insertion makes the new entry the
//! sole element, which lands immediately before the closing feed tag.

use crate::config::SiteConfig;
use crate::post::Post;
use crate::util::escape_html;
use atom_syndication::{Content, Entry, Error as AtomError, Feed, Link, Person, Text};
use chrono::{NaiveDateTime, NaiveTime, SubsecRound, Utc};
use std::fmt;
use std::fs;
use std::io;
use std::io::BufReader;
use std::path::Path;

/// Inserts one entry for `post` into the feed document at `feed_path` and
/// refreshes the feed's `updated` element to the current UTC time.
///
/// The entry's `published`/`updated` timestamps are the post's date at
/// midnight UTC, not the current time; the feed-level timestamp is the only
/// thing stamped with "now".
pub fn add_entry(
    feed_path: &Path,
    post: &Post,
    body_html: &str,
    config: &SiteConfig,
) -> Result<()> {
    let mut feed = Feed::read_from(BufReader::new(fs::File::open(feed_path)?))?;

    // Whole seconds only; the serialized element must read
    // `YYYY-MM-DDTHH:MM:SS+00:00`.
    feed.updated = Utc::now().trunc_subsecs(0).fixed_offset();
    feed.entries.insert(0, entry(post, body_html, config));

    fs::write(feed_path, feed.to_string())?;
    Ok(())
}

fn entry(post: &Post, body_html: &str, config: &SiteConfig) -> Entry {
    let date = NaiveDateTime::new(post.date, NaiveTime::MIN)
        .and_utc()
        .fixed_offset();

    Entry {
        // The title is carried as type="html", so its payload is the
        // HTML-escaped form of the title text.
        title: Text::html(escape_html(&post.title)),
        id: feed_id(&post.url, &config.base_url),
        updated: date,
        published: Some(date),
        authors: vec![Person {
            name: config.author.clone().unwrap_or_default(),
            ..Person::default()
        }],
        links: vec![Link {
            href: post.url.clone(),
            rel: "alternate".to_owned(),
            mime_type: Some("text/html".to_owned()),
            title: Some(post.title.clone()),
            ..Link::default()
        }],
        content: Some(Content {
            value: Some(body_html.to_owned()),
            content_type: Some("html".to_owned()),
            base: Some(post.url.clone()),
            ..Content::default()
        }),
        ..Entry::default()
    }
}

/// Synthesizes the entry identifier: base URL + post URL, except that post
/// URLs already rooted at `/` are used as-is.
fn feed_id(post_url: &str, base_url: &str) -> String {
    if post_url.starts_with('/') {
        post_url.to_owned()
    } else {
        format!("{}{}", base_url, post_url)
    }
}

/// The result of a fallible feed-updating operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem updating the feed. Variants include I/O and Atom
/// parsing/serialization issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when the feed document cannot be parsed or serialized.
    Atom(AtomError),

    /// Returned when the feed file cannot be read or written.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Atom(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Atom(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<AtomError> for Error {
    /// Converts an [`AtomError`] into an [`Error`]. This allows us to use
    /// the `?` operator around feed parsing.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for file I/O.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
