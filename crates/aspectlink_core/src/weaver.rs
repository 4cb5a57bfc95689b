//! Weaving-engine boundary.
//!
//! # Responsibility
//! - Declare the contract this layer needs from the external AOP weaving
//!   engine: one-time initialization and on-demand source rewriting.
//!
//! # Invariants
//! - Rewrite failures are never caught or masked here; a broken source file
//!   must fail loudly instead of silently serving unrewritten code.

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Configuration bundle handed to the engine initializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaverConfig {
    /// Disables rewrite caching inside the engine.
    pub debug: bool,
    /// Directory the engine stores rewritten files under.
    pub cache_dir: PathBuf,
    /// Directories the engine must never rewrite.
    pub exclude_paths: BTreeSet<PathBuf>,
}

/// External weaving engine contract.
pub trait WeavingEngine: Send + Sync {
    /// Initializes the engine with debug flag, cache directory and
    /// exclusion paths. Called at most once per process.
    fn initialize(&self, config: &WeaverConfig) -> Result<(), WeaverError>;

    /// Rewrites one source file and returns the path to serve in its place.
    /// Blocks the calling class load until it completes or fails.
    fn rewrite(&self, path: &Path) -> Result<PathBuf, WeaverError>;
}

/// Errors surfaced by the weaving engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeaverError {
    Initialize(String),
    Rewrite { path: PathBuf, message: String },
}

impl Display for WeaverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialize(message) => write!(f, "weaver initialization failed: {message}"),
            Self::Rewrite { path, message } => {
                write!(f, "weaver rewrite failed for `{}`: {message}", path.display())
            }
        }
    }
}

impl Error for WeaverError {}
