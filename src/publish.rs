//! Exports [`publish`], which stitches together the high-level steps of
//! publishing one post: derive the [`Post`] from the source document
//! ([`crate::post`]), render diagram blocks ([`crate::mermaid`]), convert
//! the Markdown ([`crate::markdown`]), wrap it in the page shell
//! ([`crate::template`]), write the output file, and bring the index
//! ([`crate::index`]) and Atom feed ([`crate::feed`]) up to date.

use crate::config::{IndexStrategy, SiteConfig};
use crate::feed;
use crate::index::{self, IndexEntry};
use crate::markdown::Render;
use crate::mermaid::{self, Mmdc};
use crate::post::{Overrides, Post};
use crate::template::PageTemplate;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// What to publish and how. `converter` is injected so tests can publish
/// without spawning a real pandoc.
pub struct Job<'a> {
    pub markdown_path: PathBuf,
    pub overrides: Overrides,
    pub dry_run: bool,
    pub blog_root: PathBuf,
    pub converter: &'a dyn Render,
}

/// Publishes one post end to end. With `dry_run` the plan is printed and
/// nothing on disk is touched.
///
/// The index and feed steps are each skipped silently when their document is
/// absent; a blog without a `feed.xml` simply has no feed to maintain.
pub fn publish(job: Job<'_>) -> Result<()> {
    let config = SiteConfig::load(&job.blog_root)?;

    let text = fs::read_to_string(&job.markdown_path)
        .with_context(|| format!("Reading `{}`", job.markdown_path.display()))?;
    let (post, body) = Post::from_markdown(&text, job.overrides, &job.blog_root, &config)?;

    println!("Title: {}", post.title);
    println!("Date: {}", post.date.format("%Y-%m-%d"));
    println!("Output: {}", post.file_path.display());
    println!("URL: {}", post.url);

    if job.dry_run {
        println!("\n[Dry run - no files modified]");
        return Ok(());
    }

    let body = if mermaid::has_diagrams(&body) {
        mermaid::render_diagrams(&body, &Mmdc::locate()?)?
    } else {
        body
    };

    let content_html = job.converter.render(&body)?;
    let page = PageTemplate::new(&config).render(&post.title, post.date, &content_html);

    if let Some(parent) = post.file_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Creating `{}`", parent.display()))?;
    }
    fs::write(&post.file_path, page)
        .with_context(|| format!("Writing `{}`", post.file_path.display()))?;
    println!("Created {}", post.file_path.display());

    update_index(&job.blog_root, &post, &config)?;
    update_feed(&job.blog_root, &post, &content_html, &config)?;

    Ok(())
}

fn update_index(blog_root: &Path, post: &Post, config: &SiteConfig) -> Result<()> {
    let index_path = blog_root.join("index.html");
    if !index_path.exists() {
        debug!("No `{}`; skipping index update", index_path.display());
        return Ok(());
    }

    match config.index_strategy {
        IndexStrategy::Rebuild => {
            let count = index::rebuild(&index_path, blog_root, config)?;
            println!("Rebuilt {} with {} posts", index_path.display(), count);
        }
        IndexStrategy::Insert => {
            index::insert_entry(
                &index_path,
                &IndexEntry {
                    title: post.title.clone(),
                    date: post.date,
                    url: post.url.clone(),
                },
            )?;
            println!("Updated {}", index_path.display());
        }
    }
    Ok(())
}

fn update_feed(
    blog_root: &Path,
    post: &Post,
    content_html: &str,
    config: &SiteConfig,
) -> Result<()> {
    let feed_path = blog_root.join("feed.xml");
    if !feed_path.exists() {
        debug!("No `{}`; skipping feed update", feed_path.display());
        return Ok(());
    }

    feed::add_entry(&feed_path, post, content_html, config)
        .with_context(|| format!("Updating feed `{}`", feed_path.display()))?;
    println!("Updated {}", feed_path.display());
    Ok(())
}
