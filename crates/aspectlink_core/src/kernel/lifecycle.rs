//! Kernel lifecycle manager.
//!
//! # Responsibility
//! - Initialize the weaving engine exactly once with debug flag, cache
//!   directory and exclusion paths.
//! - Trigger the loader-chain rewrite once the kernel is initialized.
//! - Purge the on-disk rewrite cache on matching invalidation events.
//!
//! # Invariants
//! - `initialized` is set only after engine initialization succeeds.
//! - `registered` is set after the rewrite attempt regardless of outcome;
//!   an absent target loader must not cause retries on every class load.
//! - Purge keeps the cache directory itself intact and tolerates trees that
//!   are already empty or concurrently cleared.

use crate::config::{ConfigError, HostConfig};
use crate::container::AspectContainer;
use crate::kernel::state::KernelState;
use crate::loader::chain::{ChainError, LoaderChain};
use crate::loader::rewriter::rewrite_chain;
use crate::weaver::{WeaverConfig, WeaverError};
use log::{error, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Cache subdirectory managed by the weaving engine.
pub const AOP_CACHE_DIR: &str = "aop";
/// Cache type tag this layer reacts to.
pub const AOP_CACHE_TYPE: &str = "aop";

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Cache-invalidation signal from the host. A missing type tag means
/// "purge everything", which includes this cache.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheClearEvent {
    pub cache_type: Option<String>,
}

impl CacheClearEvent {
    pub fn all() -> Self {
        Self { cache_type: None }
    }

    pub fn for_type(cache_type: impl Into<String>) -> Self {
        Self {
            cache_type: Some(cache_type.into()),
        }
    }
}

/// Owns one-time kernel initialization, autoloader registration and cache
/// purge for one process.
pub struct KernelLifecycleManager {
    config: HostConfig,
    container: AspectContainer,
    state: Arc<KernelState>,
}

impl KernelLifecycleManager {
    /// Validates the host configuration and builds the manager with a fresh
    /// lifecycle state.
    pub fn new(config: HostConfig, container: AspectContainer) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            container,
            state: Arc::new(KernelState::new()),
        })
    }

    /// Shared lifecycle state handle; intercepting loaders read it as their
    /// ready gate.
    pub fn state(&self) -> &Arc<KernelState> {
        &self.state
    }

    /// Initializes the weaving engine. Idempotent; a second call is a no-op.
    pub fn initialize_kernel(&self) -> LifecycleResult<()> {
        if self.state.is_initialized() {
            return Ok(());
        }

        let started_at = Instant::now();
        let weaver_config = WeaverConfig {
            debug: self.config.developer_mode || !self.config.use_aop_cache,
            cache_dir: self.cache_dir(),
            exclude_paths: self.exclude_paths(),
        };

        match self.container.weaver().initialize(&weaver_config) {
            Ok(()) => {
                self.state.try_initialize();
                info!(
                    "event=kernel_init module=kernel status=ok debug={} cache_dir={} duration_ms={}",
                    weaver_config.debug,
                    weaver_config.cache_dir.display(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=kernel_init module=kernel status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Rewrites the loader chain once. No-op when already registered or not
    /// yet initialized. Returns whether a loader was wrapped.
    ///
    /// `registered` is set even when the target loader was absent, so a
    /// missing loader never turns into a retry on every class load.
    pub fn register_autoloader(&self, chain: &mut LoaderChain) -> LifecycleResult<bool> {
        if self.state.is_registered() || !self.state.is_initialized() {
            return Ok(false);
        }

        let wrapped = rewrite_chain(chain, &self.container, &self.state, &self.config)?;
        self.state.try_register();
        info!(
            "event=autoloader_register module=kernel status=ok wrapped={wrapped}"
        );
        Ok(wrapped)
    }

    /// Clears the rewrite cache directory when the event targets this cache
    /// type. The directory itself stays in place; missing entries are
    /// tolerated, so concurrent purges and repeat calls succeed.
    pub fn purge_cache(&self, event: &CacheClearEvent) -> LifecycleResult<()> {
        if let Some(cache_type) = &event.cache_type {
            if cache_type != AOP_CACHE_TYPE {
                return Ok(());
            }
        }

        let cache_dir = self.cache_dir();
        let started_at = Instant::now();
        purge_dir_contents(&cache_dir).map_err(|source| LifecycleError::Purge {
            path: cache_dir.clone(),
            source,
        })?;
        info!(
            "event=cache_purge module=kernel status=ok cache_dir={} duration_ms={}",
            cache_dir.display(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn cache_dir(&self) -> PathBuf {
        self.config.cache_base_dir.join(AOP_CACHE_DIR)
    }

    fn exclude_paths(&self) -> BTreeSet<PathBuf> {
        let mut paths = BTreeSet::new();
        if let Some(install_dir) = &self.config.loader_install_dir {
            paths.insert(install_dir.clone());
        }
        // The intercepting loader does the autoloading; the engine must not
        // rewrite host application or library trees on its own.
        paths.insert(self.config.base_dir.join("app"));
        paths.insert(self.config.base_dir.join("lib"));
        paths
    }
}

/// Deletes everything under `dir`, deepest entries first, keeping `dir`.
/// A missing directory or entries deleted by a concurrent purge are not
/// errors.
fn purge_dir_contents(dir: &Path) -> io::Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        };

        if file_type.is_dir() {
            purge_dir_contents(&path)?;
            ignore_not_found(fs::remove_dir(&path))?;
        } else {
            ignore_not_found(fs::remove_file(&path))?;
        }
    }
    Ok(())
}

fn ignore_not_found(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Kernel lifecycle errors.
#[derive(Debug)]
pub enum LifecycleError {
    Weaver(WeaverError),
    Chain(ChainError),
    Purge { path: PathBuf, source: io::Error },
}

impl Display for LifecycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weaver(err) => write!(f, "{err}"),
            Self::Chain(err) => write!(f, "{err}"),
            Self::Purge { path, source } => {
                write!(f, "failed to purge cache dir `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for LifecycleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Weaver(err) => Some(err),
            Self::Chain(err) => Some(err),
            Self::Purge { source, .. } => Some(source),
        }
    }
}

impl From<WeaverError> for LifecycleError {
    fn from(value: WeaverError) -> Self {
        Self::Weaver(value)
    }
}

impl From<ChainError> for LifecycleError {
    fn from(value: ChainError) -> Self {
        Self::Chain(value)
    }
}
