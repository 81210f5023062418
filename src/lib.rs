//! # vault2hugo
//!
//! Convert Obsidian-flavoured Markdown vaults to Hugo-compatible content.
//!
//! Obsidian and Hugo speak different Markdown dialects: wikilinks, callout
//! blocks, and attachment-relative image paths all render as noise once the
//! vault lands in a Hugo site. This crate rewrites each document in a
//! single sequential pass and fills in the front matter Hugo expects.
//!
//! ## Pipeline Overview
//!
//! ```text
//! vault/*.md
//!  │
//!  ├─ 1. Split     separate front matter from body
//!  ├─ 2. Derive    complete title/date/draft/categories + content scans
//!  ├─ 3. Rewrite   wikilinks → links, callouts → divs, fences → markers
//!  ├─ 4. Assets    find, place, and relink referenced images
//!  └─ 5. Write     canonical header + body into the content tree
//! ```
//!
//! A sibling path renders a single Markdown file to PDF through
//! `pulldown-cmark` and the external `weasyprint` renderer; see
//! [`pdf::markdown_to_pdf`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vault2hugo::{convert_vault, ConverterConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConverterConfig::builder()
//!         .vault_dir("./obsidian-vault")
//!         .content_dir("./content/posts")
//!         .build()?;
//!     let stats = convert_vault(&config)?;
//!     eprintln!("{}/{} files converted", stats.converted, stats.files_found);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `vault2hugo` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! vault2hugo = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod frontmatter;
pub mod pdf;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConverterConfig, ConverterConfigBuilder};
pub use convert::{convert_file, convert_vault, convert_vault_with_progress, BatchStats};
pub use error::ConvertError;
pub use frontmatter::FrontMatter;
pub use pdf::{markdown_to_pdf, render_html};
pub use pipeline::assets::ProcessedAssets;
pub use progress::{BatchProgress, NoopProgress};
