//! Site-level configuration, read from an optional `blog.yaml` at the blog
//! root. Every field has a default so a bare directory of posts works
//! without any configuration file at all.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const CONFIG_FILE: &str = "blog.yaml";

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Shown in the page header and appended to every `<title>`.
    #[serde(default = "default_site_name")]
    pub site_name: String,

    /// URL prefix for posts, assets, and feed ids. No trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Author name stamped into feed entries. Empty when unset.
    #[serde(default)]
    pub author: Option<String>,

    /// How `index.html` is brought up to date after publishing.
    #[serde(default)]
    pub index_strategy: IndexStrategy,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexStrategy {
    /// Rescan every post under the blog root and regenerate the whole list.
    #[default]
    Rebuild,

    /// Prepend a single entry for the post just published.
    Insert,
}

impl Default for SiteConfig {
    fn default() -> SiteConfig {
        SiteConfig {
            site_name: default_site_name(),
            base_url: default_base_url(),
            author: None,
            index_strategy: IndexStrategy::default(),
        }
    }
}

impl SiteConfig {
    /// Loads the configuration from `<blog_root>/blog.yaml`, falling back to
    /// the defaults when the file does not exist.
    pub fn load(blog_root: &Path) -> Result<SiteConfig> {
        let path = blog_root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(SiteConfig::default());
        }
        serde_yaml::from_reader(crate::util::open(&path, "config")?)
            .with_context(|| format!("Parsing `{}`", path.display()))
    }
}

fn default_site_name() -> String {
    "My Blog".to_owned()
}

fn default_base_url() -> String {
    "/blog".to_owned()
}
