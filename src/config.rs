//! Configuration types for vault-to-Hugo conversion.
//!
//! All conversion behaviour is controlled through [`ConverterConfig`]: paths,
//! image handling, and the front-matter defaults used when a document has no
//! header of its own. The struct deserializes directly from the YAML config
//! file (every field carries a serde default, so a partial file overrides
//! only the keys it names), and a builder covers programmatic use.
//!
//! Loaded once per run, read-only afterwards.

use crate::error::ConvertError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_vault_dir() -> PathBuf {
    PathBuf::from("./obsidian-vault")
}
fn default_content_dir() -> PathBuf {
    PathBuf::from("./content/posts")
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("./static/images")
}
fn default_true() -> bool {
    true
}
fn default_image_max_width() -> u32 {
    1200
}
fn default_image_quality() -> u8 {
    85
}
fn default_categories() -> Vec<String> {
    vec!["General".to_string()]
}
fn default_attachments_folder() -> String {
    "attachments".to_string()
}
fn default_public_image_base() -> String {
    "/images".to_string()
}

/// Configuration for a vault conversion run.
///
/// Built via [`ConverterConfig::builder()`], [`ConverterConfig::default()`],
/// or loaded from a YAML file with [`ConverterConfig::load`].
///
/// # Example
/// ```rust
/// use vault2hugo::ConverterConfig;
///
/// let config = ConverterConfig::builder()
///     .vault_dir("./vault")
///     .content_dir("./content/posts")
///     .image_quality(90)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConverterConfig {
    /// Root of the Obsidian vault to convert. Default: `./obsidian-vault`.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: PathBuf,

    /// Hugo content directory receiving converted documents.
    /// Default: `./content/posts`.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Flat directory receiving processed images. Default: `./static/images`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Copy referenced images into `static_dir` and rewrite their links.
    /// When off, image references pass through untouched. Default: true.
    #[serde(default = "default_true")]
    pub auto_copy_images: bool,

    /// Re-encode raster images (flatten, downscale, quality) instead of
    /// byte-copying them. Default: true.
    #[serde(default = "default_true")]
    pub optimize_images: bool,

    /// Maximum image width in pixels; wider images are downscaled
    /// proportionally. Default: 1200.
    #[serde(default = "default_image_max_width")]
    pub image_max_width: u32,

    /// JPEG re-encode quality, 1–100. Default: 85.
    #[serde(default = "default_image_quality")]
    pub image_quality: u8,

    /// Synthesize missing front-matter fields. When off, a document that
    /// already has a header keeps it exactly as written. Default: true.
    #[serde(default = "default_true")]
    pub create_missing_frontmatter: bool,

    /// `draft` value for documents without one. Default: false.
    #[serde(default)]
    pub default_draft: bool,

    /// `categories` value for documents without one. Default: `["General"]`.
    #[serde(default = "default_categories")]
    pub default_categories: Vec<String>,

    /// Name of the vault's attachments folder. Image references are looked
    /// up here (after the document's own directory), and a leading
    /// `<attachments_folder>/` path prefix is stripped before lookup.
    /// Default: `attachments`.
    #[serde(default = "default_attachments_folder")]
    pub attachments_folder: String,

    /// Public URL prefix for rewritten image links. Default: `/images`.
    #[serde(default = "default_public_image_base")]
    pub public_image_base: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            content_dir: default_content_dir(),
            static_dir: default_static_dir(),
            auto_copy_images: true,
            optimize_images: true,
            image_max_width: default_image_max_width(),
            image_quality: default_image_quality(),
            create_missing_frontmatter: true,
            default_draft: false,
            default_categories: default_categories(),
            attachments_folder: default_attachments_folder(),
            public_image_base: default_public_image_base(),
        }
    }
}

impl ConverterConfig {
    /// Create a new builder for `ConverterConfig`.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }

    /// Load configuration from a YAML file.
    ///
    /// Keys absent from the file keep their documented defaults. Unknown
    /// keys are rejected so a typo surfaces instead of silently reverting
    /// the intended option to its default.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConvertError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self =
            serde_yaml::from_str(&text).map_err(|e| ConvertError::ConfigParse {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to defaults when
    /// the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConvertError> {
        if self.image_quality == 0 || self.image_quality > 100 {
            return Err(ConvertError::InvalidConfig(format!(
                "image_quality must be 1–100, got {}",
                self.image_quality
            )));
        }
        if self.image_max_width == 0 {
            return Err(ConvertError::InvalidConfig(
                "image_max_width must be ≥ 1".into(),
            ));
        }
        if self.attachments_folder.is_empty() {
            return Err(ConvertError::InvalidConfig(
                "attachments_folder must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn vault_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.vault_dir = dir.into();
        self
    }

    pub fn content_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.content_dir = dir.into();
        self
    }

    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.static_dir = dir.into();
        self
    }

    pub fn auto_copy_images(mut self, v: bool) -> Self {
        self.config.auto_copy_images = v;
        self
    }

    pub fn optimize_images(mut self, v: bool) -> Self {
        self.config.optimize_images = v;
        self
    }

    pub fn image_max_width(mut self, px: u32) -> Self {
        self.config.image_max_width = px.max(1);
        self
    }

    pub fn image_quality(mut self, q: u8) -> Self {
        self.config.image_quality = q.clamp(1, 100);
        self
    }

    pub fn create_missing_frontmatter(mut self, v: bool) -> Self {
        self.config.create_missing_frontmatter = v;
        self
    }

    pub fn default_draft(mut self, v: bool) -> Self {
        self.config.default_draft = v;
        self
    }

    pub fn default_categories(mut self, cats: Vec<String>) -> Self {
        self.config.default_categories = cats;
        self
    }

    pub fn attachments_folder(mut self, name: impl Into<String>) -> Self {
        self.config.attachments_folder = name.into();
        self
    }

    pub fn public_image_base(mut self, prefix: impl Into<String>) -> Self {
        self.config.public_image_base = prefix.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConverterConfig, ConvertError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
