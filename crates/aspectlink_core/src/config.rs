//! Host configuration inputs.
//!
//! # Responsibility
//! - Declare the read-only configuration the host hands to this layer.
//! - Validate path and identifier invariants before the kernel uses them.
//!
//! # Invariants
//! - All configured directories are absolute paths.
//! - `source_extension` carries no leading dot.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

fn default_source_extension() -> String {
    "php".to_string()
}

fn default_original_loader_id() -> String {
    "composer".to_string()
}

/// Read-only configuration sourced from the host framework.
///
/// `compiler_include_path` presence switches file resolution to the flat
/// compiler lookup. `include_paths` is the ordered root list for the
/// namespace-derived lookup; first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Host developer-mode flag; forces weaver debug mode.
    pub developer_mode: bool,
    /// Host "use cache for the aop type" flag.
    pub use_aop_cache: bool,
    /// Host installation base directory.
    pub base_dir: PathBuf,
    /// Directory under which the aop cache subdirectory lives.
    pub cache_base_dir: PathBuf,
    /// Precompiled combined class map root; presence implies compiler mode.
    #[serde(default)]
    pub compiler_include_path: Option<PathBuf>,
    /// Ordered include roots for class file resolution.
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
    /// Source file extension, without leading dot.
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
    /// Chain id of the composer-style loader the rewriter wraps.
    #[serde(default = "default_original_loader_id")]
    pub original_loader_id: String,
    /// Install location of the original loader, excluded from weaving.
    #[serde(default)]
    pub loader_install_dir: Option<PathBuf>,
}

impl HostConfig {
    /// Validates path and identifier invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_dir.is_absolute() {
            return Err(ConfigError::RelativePath("base_dir", self.base_dir.clone()));
        }
        if !self.cache_base_dir.is_absolute() {
            return Err(ConfigError::RelativePath(
                "cache_base_dir",
                self.cache_base_dir.clone(),
            ));
        }
        if let Some(path) = &self.compiler_include_path {
            if !path.is_absolute() {
                return Err(ConfigError::RelativePath("compiler_include_path", path.clone()));
            }
        }
        for path in &self.include_paths {
            if !path.is_absolute() {
                return Err(ConfigError::RelativePath("include_paths", path.clone()));
            }
        }
        if let Some(path) = &self.loader_install_dir {
            if !path.is_absolute() {
                return Err(ConfigError::RelativePath("loader_install_dir", path.clone()));
            }
        }
        let extension = self.source_extension.trim();
        if extension.is_empty() || extension.starts_with('.') {
            return Err(ConfigError::InvalidSourceExtension(
                self.source_extension.clone(),
            ));
        }
        if self.original_loader_id.trim().is_empty() {
            return Err(ConfigError::EmptyLoaderId);
        }
        Ok(())
    }

    /// Returns whether the flat compiler lookup is active.
    pub fn compiler_mode_enabled(&self) -> bool {
        self.compiler_include_path.is_some()
    }
}

/// Host configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    RelativePath(&'static str, PathBuf),
    InvalidSourceExtension(String),
    EmptyLoaderId,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativePath(field, path) => write!(
                f,
                "{field} must be an absolute path, got `{}`",
                path.display()
            ),
            Self::InvalidSourceExtension(value) => write!(
                f,
                "source_extension must be non-empty without a leading dot, got `{value}`"
            ),
            Self::EmptyLoaderId => write!(f, "original_loader_id must not be empty"),
        }
    }
}

impl Error for ConfigError {}
