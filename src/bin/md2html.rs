//! Convert a Markdown file into a blog-ready HTML fragment.
//!
//! Trims front matter by default (so Jekyll-style posts can be fed in
//! directly) and then calls pandoc to emit simple HTML without a
//! surrounding layout:
//!
//! ```text
//! md2html path/to/post.md -o 2025/01/01/post.html
//! ```
//!
//! Pandoc must be installed and on PATH (or pointed to with `--pandoc`).

use anyhow::{Context, Result};
use blogpub::frontmatter;
use blogpub::markdown::{Pandoc, Render};
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Convert a Markdown file into a blog-ready HTML fragment")]
struct Args {
    /// Markdown file to convert
    markdown: PathBuf,

    /// Destination HTML file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pandoc input format
    #[arg(long, default_value = "gfm")]
    from_format: String,

    /// Do not strip leading front matter
    #[arg(long)]
    keep_front_matter: bool,

    /// Path to the pandoc executable
    #[arg(long, default_value = "pandoc")]
    pandoc: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let text = fs::read_to_string(&args.markdown)
        .with_context(|| format!("Reading `{}`", args.markdown.display()))?;
    let markdown = if args.keep_front_matter {
        text
    } else {
        frontmatter::parse(&text).1
    };

    let html = Pandoc::new(args.pandoc, args.from_format).render(&markdown)?;

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Creating `{}`", parent.display()))?;
            }
            fs::write(&path, html).with_context(|| format!("Writing `{}`", path.display()))?;
        }
        None => std::io::stdout().write_all(html.as_bytes())?,
    }
    Ok(())
}
