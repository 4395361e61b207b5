//! The [`Post`] entity and the title/slug/path derivations that feed it.
//!
//! A `Post` is built exactly once per invocation, from the source file's
//! front matter plus any command-line overrides, and never mutated after
//! construction. Everything downstream (the page template, the index entry,
//! the feed entry) reads from it.

use crate::config::SiteConfig;
use crate::frontmatter;
use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Command-line overrides for the fields otherwise derived from the source
/// document.
#[derive(Default)]
pub struct Overrides {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub slug: Option<String>,
}

/// One publishable post, fully derived and ready to render.
pub struct Post {
    pub title: String,
    pub date: NaiveDate,
    pub slug: String,

    /// Site-relative URL, e.g. `/blog/2025/01/02/my-post.html`.
    pub url: String,

    /// Output location on disk under the blog root.
    pub file_path: PathBuf,
}

impl Post {
    /// Derives a [`Post`] from raw source text. Returns the post together
    /// with the Markdown body (front matter removed).
    ///
    /// Field precedence follows the command line first, then front matter,
    /// then what can be read out of the document itself: the title falls
    /// back to the first `# ` heading, the date to today, the slug to
    /// [`slugify`] of the title. A post without any discoverable title is a
    /// fatal error.
    pub fn from_markdown(
        text: &str,
        overrides: Overrides,
        blog_root: &Path,
        config: &SiteConfig,
    ) -> Result<(Post, String)> {
        let (metadata, body) = frontmatter::parse(text);

        let title = match overrides
            .title
            .or_else(|| metadata.get("title").cloned())
            .or_else(|| title_from_markdown(&body))
        {
            Some(title) => title,
            None => bail!("Could not determine title. Use --title or add an H1 heading."),
        };

        let date = match overrides.date {
            Some(date) => date,
            None => match metadata.get("date") {
                // Front-matter dates may carry a time suffix; only the
                // `YYYY-MM-DD` prefix counts.
                Some(value) => parse_date(value)?,
                None => Local::now().date_naive(),
            },
        };

        let slug = overrides.slug.unwrap_or_else(|| slugify(&title));
        let date_path = date.format("%Y/%m/%d").to_string();

        let post = Post {
            url: format!("{}/{}/{}.html", config.base_url, date_path, slug),
            file_path: blog_root.join(date_path).join(format!("{}.html", slug)),
            title,
            date,
            slug,
        };
        Ok((post, body))
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    let prefix = value.get(..10).unwrap_or(value);
    match NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(e) => bail!("Invalid date `{}`: {}", value, e),
    }
}

/// Extracts a title from the first `# ` heading, if any.
pub fn title_from_markdown(text: &str) -> Option<String> {
    text.lines()
        .find_map(|line| line.strip_prefix("# ").map(|rest| rest.trim().to_owned()))
}

// Underscores survive this pass so the separator pass can hyphenate them.
static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s_-]").unwrap());
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s_]+").unwrap());
static HYPHEN_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

/// Converts a title into a URL-safe slug: lowercase, punctuation stripped,
/// whitespace and underscores collapsed to single hyphens, no leading or
/// trailing hyphens.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let stripped = NON_SLUG.replace_all(&lower, "");
    let hyphenated = SEPARATORS.replace_all(&stripped, "-");
    let collapsed = HYPHEN_RUNS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_owned()
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_slugify_punctuation_stripped() {
        assert_eq!(slugify("My Post: Title!"), "my-post-title");
    }

    #[test]
    fn test_slugify_strips_intra_word_punctuation() {
        assert_eq!(slugify("Don't Panic"), "dont-panic");
    }

    #[test]
    fn test_slugify_underscores_and_whitespace_collapse() {
        assert_eq!(slugify("snake_case_name  with   gaps"), "snake-case-name-with-gaps");
    }

    #[test]
    fn test_slugify_trims_hyphens() {
        assert_eq!(slugify("--Edgy Title--"), "edgy-title");
        assert_eq!(slugify("a -- b"), "a-b");
    }

    #[test]
    fn test_title_from_markdown() {
        assert_eq!(
            title_from_markdown("intro\n\n# The Title \n\nbody"),
            Some("The Title".to_owned())
        );
        assert_eq!(title_from_markdown("## only subheadings\n"), None);
    }

    #[test]
    fn test_from_markdown_derivations() {
        let config = SiteConfig::default();
        let text = "---\ntitle: Hello, World!\ndate: 2025-01-02T10:00:00\n---\nbody\n";
        let (post, body) =
            Post::from_markdown(text, Overrides::default(), Path::new("/tmp/blog"), &config)
                .unwrap();
        assert_eq!(post.title, "Hello, World!");
        assert_eq!(post.date, date(2025, 1, 2));
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.url, "/blog/2025/01/02/hello-world.html");
        assert_eq!(
            post.file_path,
            Path::new("/tmp/blog/2025/01/02/hello-world.html")
        );
        assert_eq!(body, "body\n");
    }

    #[test]
    fn test_from_markdown_overrides_win() {
        let config = SiteConfig::default();
        let text = "---\ntitle: From Front Matter\n---\nbody\n";
        let overrides = Overrides {
            title: Some("From Flag".to_owned()),
            date: Some(date(2024, 12, 31)),
            slug: Some("custom".to_owned()),
        };
        let (post, _) =
            Post::from_markdown(text, overrides, Path::new("/tmp/blog"), &config).unwrap();
        assert_eq!(post.title, "From Flag");
        assert_eq!(post.url, "/blog/2024/12/31/custom.html");
    }

    #[test]
    fn test_from_markdown_title_from_heading() {
        let config = SiteConfig::default();
        let (post, _) = Post::from_markdown(
            "# Heading Title\n\nbody\n",
            Overrides {
                date: Some(date(2025, 6, 1)),
                ..Overrides::default()
            },
            Path::new("/tmp/blog"),
            &config,
        )
        .unwrap();
        assert_eq!(post.title, "Heading Title");
        assert_eq!(post.slug, "heading-title");
    }

    #[test]
    fn test_from_markdown_missing_title_fails() {
        let config = SiteConfig::default();
        let result = Post::from_markdown(
            "no heading at all\n",
            Overrides::default(),
            Path::new("/tmp/blog"),
            &config,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_markdown_bad_date_fails() {
        let config = SiteConfig::default();
        let result = Post::from_markdown(
            "---\ntitle: x\ndate: not-a-date\n---\nbody\n",
            Overrides::default(),
            Path::new("/tmp/blog"),
            &config,
        );
        assert!(result.is_err());
    }
}
