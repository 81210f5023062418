//! Asset resolution: find the file behind each image reference, place it in
//! the flat static directory, and rewrite the link.
//!
//! The only state shared across documents in a batch is [`ProcessedAssets`].
//! It is owned by the batch orchestrator and passed in explicitly, so a
//! single file can be converted in isolation with a fresh set.
//!
//! Placement semantics (one run):
//! * the first time a source file is placed, it claims its own filename;
//! * a *different* source wanting an already-claimed name gets `_1`, `_2`, …
//!   appended before the extension;
//! * a destination that exists on disk but is unclaimed this run is treated
//!   as a previous run's output for the same source: the name is reused and
//!   bytes are re-copied only when the source is newer than the destination.
//!
//! Repeated runs over an unchanged vault therefore produce identical names
//! and copy nothing.

use crate::config::ConverterConfig;
use crate::pipeline::optimize;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

static RE_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());

/// Destination filenames claimed during one batch run.
#[derive(Debug, Default)]
pub struct ProcessedAssets {
    /// Canonical source path → destination filename it claimed.
    by_source: HashMap<PathBuf, String>,
    /// Every destination filename claimed this run.
    claimed: HashSet<String>,
}

impl ProcessedAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct source images placed this run.
    pub fn placed(&self) -> usize {
        self.by_source.len()
    }

    /// Place `source` into the static directory and return the destination
    /// filename it ended up under.
    pub fn place(
        &mut self,
        source: &Path,
        config: &ConverterConfig,
    ) -> std::io::Result<String> {
        let canonical = source
            .canonicalize()
            .unwrap_or_else(|_| source.to_path_buf());
        if let Some(name) = self.by_source.get(&canonical) {
            return Ok(name.clone());
        }

        let candidate = self.claim_name(source);
        self.by_source.insert(canonical, candidate.clone());

        let dest = config.static_dir.join(&candidate);
        if needs_copy(source, &dest) {
            std::fs::create_dir_all(&config.static_dir)?;
            copy_or_reencode(source, &dest, config)?;
            info!(
                "image processed: {} -> {}",
                source.file_name().unwrap_or_default().to_string_lossy(),
                candidate
            );
        } else {
            debug!("image up to date: {}", dest.display());
        }

        Ok(candidate)
    }

    /// First unclaimed name for this source: its own filename, else
    /// `stem_1.ext`, `stem_2.ext`, …
    fn claim_name(&mut self, source: &Path) -> String {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let mut candidate = format!("{stem}{ext}");
        let mut counter = 1;
        while self.claimed.contains(&candidate) {
            candidate = format!("{stem}_{counter}{ext}");
            counter += 1;
        }
        self.claimed.insert(candidate.clone());
        candidate
    }
}

/// Rewrite every resolvable image reference in `content`.
///
/// References that are absolute URLs or root-relative stay untouched. A
/// reference that resolves to no file on disk is warned about and left
/// as-is; the document still converts.
pub fn rewrite_images(
    content: &str,
    source_dir: &Path,
    config: &ConverterConfig,
    assets: &mut ProcessedAssets,
) -> String {
    if !config.auto_copy_images {
        return content.to_string();
    }

    RE_IMAGE
        .replace_all(content, |caps: &Captures<'_>| {
            let alt = &caps[1];
            let link = &caps[2];

            if link.starts_with("http://") || link.starts_with("https://") || link.starts_with('/')
            {
                return caps[0].to_string();
            }

            let Some(found) = resolve_reference(link, source_dir, config) else {
                warn!("image not found: {link}");
                return caps[0].to_string();
            };

            match assets.place(&found, config) {
                Ok(name) => format!("![{alt}]({}/{name})", config.public_image_base),
                Err(e) => {
                    warn!("failed to place image '{link}': {e}");
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Look the reference up next to the document, then inside the attachments
/// folder. A leading `<attachments_folder>/` prefix is stripped first.
fn resolve_reference(link: &str, source_dir: &Path, config: &ConverterConfig) -> Option<PathBuf> {
    let prefix = format!("{}/", config.attachments_folder);
    let rel = link.strip_prefix(&prefix).unwrap_or(link);

    let direct = source_dir.join(rel);
    if direct.is_file() {
        return Some(direct);
    }
    let attached = source_dir.join(&config.attachments_folder).join(rel);
    if attached.is_file() {
        return Some(attached);
    }
    None
}

/// Copy needed unless the destination exists and is at least as new as the
/// source. Unreadable timestamps force a copy.
fn needs_copy(source: &Path, dest: &Path) -> bool {
    if !dest.exists() {
        return true;
    }
    let mtime = |p: &Path| std::fs::metadata(p).and_then(|m| m.modified()).ok();
    match (mtime(source), mtime(dest)) {
        (Some(s), Some(d)) => s > d,
        _ => true,
    }
}

fn copy_or_reencode(
    source: &Path,
    dest: &Path,
    config: &ConverterConfig,
) -> std::io::Result<()> {
    if config.optimize_images && optimize::is_raster(source) {
        match optimize::reencode(source, dest, config.image_max_width, config.image_quality) {
            Ok(()) => return Ok(()),
            Err(e) => {
                warn!(
                    "could not optimize {}: {e}; copying bytes instead",
                    source.display()
                );
            }
        }
    }
    std::fs::copy(source, dest).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime};

    fn config_with(static_dir: &Path) -> ConverterConfig {
        ConverterConfig::builder()
            .static_dir(static_dir)
            .optimize_images(false) // byte copies keep fixtures trivial
            .build()
            .unwrap()
    }

    fn touch(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn set_mtime(path: &Path, when: SystemTime) {
        let f = fs::OpenOptions::new().write(true).open(path).unwrap();
        f.set_modified(when).unwrap();
    }

    #[test]
    fn reference_rewritten_to_public_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let vault = dir.path().join("vault");
        touch(&vault.join("shot.png"), "png-bytes");
        let cfg = config_with(&dir.path().join("static"));

        let mut assets = ProcessedAssets::new();
        let out = rewrite_images("![a shot](shot.png)", &vault, &cfg, &mut assets);
        assert_eq!(out, "![a shot](/images/shot.png)");
        assert!(dir.path().join("static/shot.png").is_file());
    }

    #[test]
    fn absolute_and_rooted_references_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_with(&dir.path().join("static"));
        let mut assets = ProcessedAssets::new();
        let input = "![x](https://host/i.png) ![y](/already/rooted.png)";
        assert_eq!(rewrite_images(input, dir.path(), &cfg, &mut assets), input);
        assert_eq!(assets.placed(), 0);
    }

    #[test]
    fn attachments_prefix_is_stripped_before_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let vault = dir.path().join("vault");
        touch(&vault.join("attachments/diag.png"), "bytes");
        let cfg = config_with(&dir.path().join("static"));

        let mut assets = ProcessedAssets::new();
        let out = rewrite_images("![d](attachments/diag.png)", &vault, &cfg, &mut assets);
        assert_eq!(out, "![d](/images/diag.png)");
    }

    #[test]
    fn missing_image_left_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_with(&dir.path().join("static"));
        let mut assets = ProcessedAssets::new();
        let input = "before ![gone](nope.png) after";
        assert_eq!(rewrite_images(input, dir.path(), &cfg, &mut assets), input);
        assert_eq!(assets.placed(), 0);
    }

    #[test]
    fn distinct_sources_with_same_name_get_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("post-a/diagram.png");
        let b = dir.path().join("post-b/diagram.png");
        let c = dir.path().join("post-c/diagram.png");
        touch(&a, "aaa");
        touch(&b, "bbb");
        touch(&c, "ccc");
        let cfg = config_with(&dir.path().join("static"));

        let mut assets = ProcessedAssets::new();
        assert_eq!(assets.place(&a, &cfg).unwrap(), "diagram.png");
        assert_eq!(assets.place(&b, &cfg).unwrap(), "diagram_1.png");
        assert_eq!(assets.place(&c, &cfg).unwrap(), "diagram_2.png");
        assert_eq!(
            fs::read_to_string(dir.path().join("static/diagram_1.png")).unwrap(),
            "bbb"
        );
    }

    #[test]
    fn same_source_placed_once_keeps_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("vault/shot.png");
        touch(&img, "bytes");
        let cfg = config_with(&dir.path().join("static"));

        let mut assets = ProcessedAssets::new();
        assert_eq!(assets.place(&img, &cfg).unwrap(), "shot.png");
        assert_eq!(assets.place(&img, &cfg).unwrap(), "shot.png");
        assert_eq!(assets.placed(), 1);
    }

    #[test]
    fn stale_destination_from_prior_run_is_reused_not_suffixed() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("vault/shot.png");
        touch(&img, "new bytes");
        let cfg = config_with(&dir.path().join("static"));
        // Simulate a previous run's output, newer than the source.
        touch(&dir.path().join("static/shot.png"), "previous run");
        set_mtime(&img, SystemTime::now() - Duration::from_secs(3600));

        let mut assets = ProcessedAssets::new();
        assert_eq!(assets.place(&img, &cfg).unwrap(), "shot.png");
        // Up to date: not re-copied.
        assert_eq!(
            fs::read_to_string(dir.path().join("static/shot.png")).unwrap(),
            "previous run"
        );
    }

    #[test]
    fn newer_source_overwrites_stale_destination() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("vault/shot.png");
        touch(&img, "edited bytes");
        let cfg = config_with(&dir.path().join("static"));
        let dest = dir.path().join("static/shot.png");
        touch(&dest, "previous run");
        set_mtime(&dest, SystemTime::now() - Duration::from_secs(3600));

        let mut assets = ProcessedAssets::new();
        assert_eq!(assets.place(&img, &cfg).unwrap(), "shot.png");
        assert_eq!(fs::read_to_string(&dest).unwrap(), "edited bytes");
    }

    #[test]
    fn copy_disabled_passes_references_through() {
        let dir = tempfile::tempdir().unwrap();
        let vault = dir.path().join("vault");
        touch(&vault.join("shot.png"), "bytes");
        let cfg = ConverterConfig::builder()
            .static_dir(dir.path().join("static"))
            .auto_copy_images(false)
            .build()
            .unwrap();

        let mut assets = ProcessedAssets::new();
        let input = "![a](shot.png)";
        assert_eq!(rewrite_images(input, &vault, &cfg, &mut assets), input);
        assert_eq!(assets.placed(), 0);
    }
}
