//! Publish a blog post: convert Markdown to HTML, update the index and the
//! Atom feed.
//!
//! ```text
//! blogpub md/my-post.md --title "My Post Title"
//! ```
//!
//! This converts the Markdown to HTML at `<blog-root>/YYYY/MM/DD/<slug>.html`,
//! adds the post to `index.html`, and adds it to `feed.xml`.

use anyhow::Result;
use blogpub::markdown::Pandoc;
use blogpub::post::Overrides;
use blogpub::publish::{publish, Job};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Publish a blog post: convert markdown to HTML, update index and Atom feed")]
struct Args {
    /// Markdown file to publish
    markdown: PathBuf,

    /// Post title (default: from front matter or the first H1 heading)
    #[arg(short, long)]
    title: Option<String>,

    /// Post date YYYY-MM-DD (default: from front matter, or today)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// URL slug (default: derived from title)
    #[arg(short, long)]
    slug: Option<String>,

    /// Show what would be done without writing anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Pandoc input format
    #[arg(long, default_value = "gfm")]
    from_format: String,

    /// Blog root directory (holds index.html and feed.xml)
    #[arg(long, default_value = ".")]
    blog_root: PathBuf,

    /// Path to the pandoc executable
    #[arg(long, default_value = "pandoc")]
    pandoc: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let converter = Pandoc::new(args.pandoc, args.from_format);
    publish(Job {
        markdown_path: args.markdown,
        overrides: Overrides {
            title: args.title,
            date: args.date,
            slug: args.slug,
        },
        dry_run: args.dry_run,
        blog_root: args.blog_root,
        converter: &converter,
    })
}
