//! Conversion entry points: one document, or a whole vault.
//!
//! Every file runs the same sequential pipeline: split the front matter,
//! derive the missing header fields, apply the three syntax rewrites,
//! resolve image references, then write the canonical header plus body.
//! Files are independent; the only state carried across them is the
//! [`ProcessedAssets`] set owned by the batch walk.
//!
//! A file that fails (unreadable, malformed front matter) is reported with
//! its path and skipped; one bad document never aborts the batch.

use crate::config::ConverterConfig;
use crate::error::ConvertError;
use crate::frontmatter::{self, FrontMatter};
use crate::pipeline::assets::{self, ProcessedAssets};
use crate::pipeline::{metadata, rewrite};
use crate::progress::BatchProgress;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};
use walkdir::WalkDir;

/// Summary of a vault conversion run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchStats {
    /// Markdown files discovered under the vault.
    pub files_found: usize,
    /// Files converted and written.
    pub converted: usize,
    /// Files that failed and were skipped.
    pub failed: usize,
    /// Distinct images placed into the static directory.
    pub images_processed: usize,
    /// Wall-clock time for the whole batch.
    pub duration_ms: u64,
}

/// Convert a single document from `source` to `dest`.
///
/// `assets` records destination filenames claimed so far; pass a fresh
/// [`ProcessedAssets`] when converting one file in isolation.
pub fn convert_file(
    source: &Path,
    dest: &Path,
    config: &ConverterConfig,
    assets: &mut ProcessedAssets,
) -> Result<(), ConvertError> {
    info!("converting: {} -> {}", source.display(), dest.display());

    let raw = std::fs::read_to_string(source).map_err(|e| ConvertError::ReadFailed {
        path: source.to_path_buf(),
        source: e,
    })?;

    let (header_text, body) = frontmatter::split(&raw);
    let existing = match header_text {
        Some(text) => {
            FrontMatter::parse(text).map_err(|e| ConvertError::MalformedFrontMatter {
                path: source.to_path_buf(),
                detail: e.to_string(),
            })?
        }
        None => FrontMatter::new(),
    };

    let front = metadata::complete(existing, source, body, config);

    let rewritten = rewrite::rewrite_syntax(body);
    let source_dir = source.parent().unwrap_or_else(|| Path::new("."));
    let relinked = assets::rewrite_images(&rewritten, source_dir, config, assets);

    write_document(dest, &front, &relinked)
}

/// Convert every markdown file under `config.vault_dir`.
pub fn convert_vault(config: &ConverterConfig) -> Result<BatchStats, ConvertError> {
    convert_vault_with_progress(config, None)
}

/// [`convert_vault`] with per-file progress events.
pub fn convert_vault_with_progress(
    config: &ConverterConfig,
    progress: Option<&dyn BatchProgress>,
) -> Result<BatchStats, ConvertError> {
    if !config.vault_dir.is_dir() {
        return Err(ConvertError::VaultNotFound {
            path: config.vault_dir.clone(),
        });
    }

    let start = Instant::now();
    let files = collect_markdown_files(&config.vault_dir);
    info!("found {} markdown files to convert", files.len());
    if let Some(cb) = progress {
        cb.on_batch_start(files.len());
    }

    let mut assets = ProcessedAssets::new();
    let mut converted = 0;
    let mut failed = 0;

    for (index, source) in files.iter().enumerate() {
        let dest = destination_for(source, &config.vault_dir, &config.content_dir);
        match convert_file(source, &dest, config, &mut assets) {
            Ok(()) => {
                converted += 1;
                if let Some(cb) = progress {
                    cb.on_file_converted(source, index + 1, files.len());
                }
            }
            Err(e) => {
                failed += 1;
                error!("error processing {}: {e}", source.display());
                if let Some(cb) = progress {
                    cb.on_file_failed(source, index + 1, files.len(), &e.to_string());
                }
            }
        }
    }

    if let Some(cb) = progress {
        cb.on_batch_complete(files.len(), converted);
    }

    let stats = BatchStats {
        files_found: files.len(),
        converted,
        failed,
        images_processed: assets.placed(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "conversion complete: {}/{} files, {} images, {}ms",
        stats.converted, stats.files_found, stats.images_processed, stats.duration_ms
    );
    Ok(stats)
}

/// All `.md` files under the vault, in directory-walk order, with any
/// dot-prefixed directory or file (`.obsidian/`, `.trash/`, …) pruned.
fn collect_markdown_files(vault: &Path) -> Vec<PathBuf> {
    WalkDir::new(vault)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with('.')
        })
        .filter_map(Result::ok)
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
        })
        .map(|entry| entry.into_path())
        .collect()
}

/// Mirror the vault-relative path under the content directory, dropping a
/// leading `posts/` component so `vault/posts/x.md` lands at
/// `content_dir/x.md` rather than `content_dir/posts/x.md`.
fn destination_for(source: &Path, vault: &Path, content_dir: &Path) -> PathBuf {
    let rel = source.strip_prefix(vault).unwrap_or(source);
    let mut components = rel.components();
    if let Some(Component::Normal(first)) = components.clone().next() {
        if first == "posts" {
            components.next();
        }
    }
    content_dir.join(components.as_path())
}

fn write_document(dest: &Path, front: &FrontMatter, body: &str) -> Result<(), ConvertError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConvertError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;
    }
    let output = format!("{}{}", front.to_block(), body.trim_start_matches('\n'));
    std::fs::write(dest, output).map_err(|e| ConvertError::WriteFailed {
        path: dest.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn test_config(root: &Path) -> ConverterConfig {
        ConverterConfig::builder()
            .vault_dir(root.join("vault"))
            .content_dir(root.join("content"))
            .static_dir(root.join("static"))
            .optimize_images(false)
            .build()
            .unwrap()
    }

    #[test]
    fn headerless_file_gains_required_fields() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write(&cfg.vault_dir.join("first_post.md"), "Hello world.\n");

        let stats = convert_vault(&cfg).unwrap();
        assert_eq!((stats.converted, stats.failed), (1, 0));

        let out = fs::read_to_string(cfg.content_dir.join("first_post.md")).unwrap();
        assert!(out.starts_with("---\n"));
        assert!(out.contains("title: \"First Post\""));
        assert!(out.contains("date: \""));
        assert!(out.contains("draft: false"));
        assert!(out.contains("categories: [\"General\"]"));
        assert!(out.contains("Hello world."));
    }

    #[test]
    fn existing_header_fields_are_carried_over() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write(
            &cfg.vault_dir.join("post.md"),
            "---\ntitle: \"Kept\"\ndraft: true\n---\n\nBody.\n",
        );

        convert_vault(&cfg).unwrap();
        let out = fs::read_to_string(cfg.content_dir.join("post.md")).unwrap();
        assert!(out.contains("title: \"Kept\""));
        assert!(out.contains("draft: true"));
        assert!(out.contains("Body."));
    }

    #[test]
    fn malformed_front_matter_fails_only_that_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write(&cfg.vault_dir.join("bad.md"), "---\n: : :\nnot yaml [\n---\nbody\n");
        write(&cfg.vault_dir.join("good.md"), "Fine.\n");

        let stats = convert_vault(&cfg).unwrap();
        assert_eq!(stats.files_found, 2);
        assert_eq!(stats.converted, 1);
        assert_eq!(stats.failed, 1);
        assert!(cfg.content_dir.join("good.md").is_file());
        assert!(!cfg.content_dir.join("bad.md").exists());
    }

    #[test]
    fn posts_prefix_is_flattened() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write(&cfg.vault_dir.join("posts/nested/deep.md"), "x\n");

        convert_vault(&cfg).unwrap();
        assert!(cfg.content_dir.join("nested/deep.md").is_file());
        assert!(!cfg.content_dir.join("posts").exists());
    }

    #[test]
    fn hidden_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write(&cfg.vault_dir.join(".obsidian/workspace.md"), "internal\n");
        write(&cfg.vault_dir.join(".trash/old.md"), "deleted\n");
        write(&cfg.vault_dir.join("real.md"), "kept\n");

        let stats = convert_vault(&cfg).unwrap();
        assert_eq!(stats.files_found, 1);
        assert!(cfg.content_dir.join("real.md").is_file());
    }

    #[test]
    fn missing_vault_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ConverterConfig::builder()
            .vault_dir(dir.path().join("nope"))
            .build()
            .unwrap();
        assert!(matches!(
            convert_vault(&cfg),
            Err(ConvertError::VaultNotFound { .. })
        ));
    }

    #[test]
    fn body_syntax_is_rewritten_on_the_way_through() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write(
            &cfg.vault_dir.join("syntax.md"),
            "See [[Other Page|here]].\n\n```sh\nls\n```\n",
        );

        convert_vault(&cfg).unwrap();
        let out = fs::read_to_string(cfg.content_dir.join("syntax.md")).unwrap();
        assert!(out.contains("[here](/other-page)"));
        assert!(out.contains("<!-- COPY_BUTTON -->"));
    }

    #[test]
    fn images_are_shared_across_documents_in_one_run() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write(&cfg.vault_dir.join("a/attachments/pic.png"), "from-a");
        write(&cfg.vault_dir.join("b/attachments/pic.png"), "from-b");
        write(&cfg.vault_dir.join("a/one.md"), "![p](pic.png)\n");
        write(&cfg.vault_dir.join("b/two.md"), "![p](pic.png)\n");

        let stats = convert_vault(&cfg).unwrap();
        assert_eq!(stats.images_processed, 2);
        let combined = format!(
            "{}{}",
            fs::read_to_string(cfg.content_dir.join("a/one.md")).unwrap(),
            fs::read_to_string(cfg.content_dir.join("b/two.md")).unwrap()
        );
        assert!(combined.contains("(/images/pic.png)"));
        assert!(combined.contains("(/images/pic_1.png)"));
    }
}
