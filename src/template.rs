//! The fixed page shell that wraps a rendered post fragment.
//!
//! This is pure string substitution: an HTML-escaped title, a formatted
//! date, and the body fragment dropped into a fixed skeleton. The site name
//! and base URL come from [`SiteConfig`]; nothing else varies.

use crate::config::SiteConfig;
use crate::util::escape_html;
use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::sync::LazyLock;

const SKELETON: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta http-equiv="X-UA-Compatible" content="IE=edge">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{title}} - {{site_name}}</title>
  <link rel="stylesheet" href="{{base_url}}/assets/blog.css">
  <link rel="alternate" type="application/atom+xml" title="{{site_name}}" href="{{base_url}}/feed.xml">
</head>
<body>

<header class="site-header">
  <div class="wrapper">
    <a class="site-title" href="{{base_url}}/">{{site_name}}</a>
    <nav class="site-nav">
      <a class="page-link" href="{{base_url}}/about/">About</a>
    </nav>
  </div>
</header>

<main class="wrapper">
  <article>
    <p class="post-meta" style="color: var(--color-text-light); margin-bottom: 30px;">{{date}}</p>
{{content}}
  </article>

  <section class="comments">
    <script src="https://utteranc.es/client.js"
        repo="sinelaw/utterances"
        issue-term="pathname"
        theme="github-light"
        crossorigin="anonymous"
        async>
    </script>
  </section>
</main>

<footer class="site-footer">
  <div class="wrapper">
    <a href="{{base_url}}/">&larr; Back to all posts</a>
    <div class="social-links">
      <a href="https://x.com/TheNoamLewis" title="Twitter/X" aria-label="Twitter">
        <img src="{{base_url}}/assets/icon-x.svg" alt="X/Twitter" width="24" height="24">
      </a>
      <a href="https://github.com/sinelaw" title="GitHub" aria-label="GitHub">
        <img src="{{base_url}}/assets/icon-github.svg" alt="GitHub" width="24" height="24">
      </a>
    </div>
  </div>
</footer>

</body>
</html>
"#;

/// Wraps body fragments into complete pages for one site.
pub struct PageTemplate<'a> {
    config: &'a SiteConfig,
}

impl<'a> PageTemplate<'a> {
    pub fn new(config: &'a SiteConfig) -> PageTemplate<'a> {
        PageTemplate { config }
    }

    /// Produces the complete page. Output is fully determined by the three
    /// inputs (plus the site configuration).
    ///
    /// Each placeholder in the skeleton is resolved in one pass, so values
    /// that themselves contain placeholder text are carried through
    /// verbatim and never re-substituted.
    pub fn render(&self, title: &str, date: NaiveDate, body_html: &str) -> String {
        let title = escape_html(title);
        let date = long_date(date);
        PLACEHOLDER
            .replace_all(SKELETON, |caps: &Captures| match &caps[1] {
                "site_name" => self.config.site_name.as_str(),
                "base_url" => self.config.base_url.as_str(),
                "title" => title.as_str(),
                "date" => date.as_str(),
                _ => body_html,
            })
            .into_owned()
    }
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(site_name|base_url|title|date|content)\}\}").unwrap()
});

/// `Month Day, Year` with no leading zero on the day, e.g. `January 5, 2020`.
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Abbreviated variant used in the index listing, e.g. `Jan 5, 2020`.
pub fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
