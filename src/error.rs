//! Error types for the vault2hugo library.
//!
//! Only conditions that stop the current unit of work become errors:
//!
//! * A bad config file or missing vault is **fatal**: nothing can run.
//! * Malformed front matter or an unreadable source file fails **that
//!   document only**; the batch walker reports it and moves on.
//!
//! Everything softer (an image reference that resolves nowhere, a raster
//! file the codec cannot decode) is a `tracing` warning plus a documented
//! degradation, never an `Err`. See the asset pipeline for those paths.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the vault2hugo library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The source vault directory does not exist.
    #[error("vault directory not found: '{path}'\nCheck --source or the vault_dir config key.")]
    VaultNotFound { path: PathBuf },

    /// A source document could not be read.
    #[error("failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Document errors ───────────────────────────────────────────────────
    /// The document opens a front-matter block that does not parse as YAML.
    ///
    /// Fails this document only; the batch continues with the next file.
    #[error("malformed front matter in '{path}': {detail}")]
    MalformedFrontMatter { path: PathBuf, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write a converted document.
    #[error("failed to write output file '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// The config file exists but could not be read.
    #[error("failed to read config file '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML (or has wrongly-typed fields).
    #[error("invalid config file '{path}': {detail}")]
    ConfigParse { path: PathBuf, detail: String },

    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── PDF renderer errors ───────────────────────────────────────────────
    /// The external HTML→PDF renderer is not on PATH.
    #[error(
        "PDF renderer '{program}' not found on PATH.\n\
         Install it first, e.g.: pip install weasyprint"
    )]
    RendererMissing { program: String },

    /// The external renderer ran but exited non-zero.
    #[error("PDF renderer '{program}' failed ({status}):\n{stderr}")]
    RendererFailed {
        program: String,
        status: String,
        stderr: String,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_front_matter_display() {
        let e = ConvertError::MalformedFrontMatter {
            path: PathBuf::from("notes/hack.md"),
            detail: "mapping values are not allowed".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("notes/hack.md"), "got: {msg}");
        assert!(msg.contains("mapping values"), "got: {msg}");
    }

    #[test]
    fn renderer_missing_carries_install_hint() {
        let e = ConvertError::RendererMissing {
            program: "weasyprint".into(),
        };
        assert!(e.to_string().contains("pip install weasyprint"));
    }

    #[test]
    fn renderer_failed_display() {
        let e = ConvertError::RendererFailed {
            program: "weasyprint".into(),
            status: "exit status: 1".into(),
            stderr: "ERROR: unsupported CSS".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("weasyprint"));
        assert!(msg.contains("unsupported CSS"));
    }
}
