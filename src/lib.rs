//! The library code for the `blogpub` publishing toolchain. Publishing a
//! post can be broken down into three distinct steps:
//!
//! 1. Deriving the post's identity (title, date, slug, output path) from its
//!    source document and command-line overrides ([`crate::post`],
//!    [`crate::frontmatter`])
//! 2. Producing the output page: rendering fenced mermaid blocks to inline
//!    SVG ([`crate::mermaid`]), converting the Markdown through an external
//!    pandoc process ([`crate::markdown`]), and wrapping the fragment in the
//!    fixed page shell ([`crate::template`])
//! 3. Bringing the derived site artifacts up to date: the post listing in
//!    `index.html` ([`crate::index`]) and the Atom feed ([`crate::feed`])
//!
//! [`crate::publish`] sequences the three; the two binaries (`blogpub` and
//! `md2html`) are thin CLI shells over this library. Everything is
//! synchronous and runs once per invocation; the filesystem is the only
//! store.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod config;
pub mod feed;
pub mod frontmatter;
pub mod index;
pub mod markdown;
pub mod mermaid;
pub mod post;
pub mod publish;
pub mod template;
pub mod util;
