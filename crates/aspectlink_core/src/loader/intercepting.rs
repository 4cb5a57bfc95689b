//! Intercepting loader: class loads routed through the rewrite pipeline.
//!
//! # Responsibility
//! - Resolve class names to candidate files, consult the cache-state
//!   snapshot and trigger on-demand weaving for uncached files.
//! - Stay inert until the kernel is initialized.
//!
//! # Invariants
//! - The cache-state snapshot is fetched once at construction and never
//!   refreshed.
//! - Class names that fail the host naming convention never reach the
//!   filesystem.

use crate::cache_state::CacheState;
use crate::config::HostConfig;
use crate::container::AspectContainer;
use crate::kernel::state::KernelState;
use crate::loader::chain::ClassLoader;
use crate::loader::{LoadResult, SourceIncluder};
use crate::weaver::WeavingEngine;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Classes under this prefix belong to the test harness; the weaving
/// engine's metadata scanning must not touch them.
pub const TEST_CLASS_PREFIX: &str = "Aspectlink_Test_";

static CLASS_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*(_[A-Za-z0-9]+)*$").expect("valid class name regex"));

/// Wrapper substituted for the composer-style loader during chain rewrite.
pub struct InterceptingLoader {
    original: Arc<dyn ClassLoader>,
    cache_state: CacheState,
    compiler_include_path: Option<PathBuf>,
    include_paths: Vec<PathBuf>,
    source_extension: String,
    weaver: Arc<dyn WeavingEngine>,
    includer: Arc<dyn SourceIncluder>,
    state: Arc<KernelState>,
}

impl InterceptingLoader {
    /// Builds the wrapper around the original loader, taking the one-time
    /// cache-state snapshot.
    pub fn new(
        original: Arc<dyn ClassLoader>,
        container: &AspectContainer,
        state: Arc<KernelState>,
        config: &HostConfig,
    ) -> Self {
        let cache_state = container.cache_state_provider().query_cache_state();
        debug!(
            "event=cache_snapshot module=loader status=ok entries={}",
            cache_state.len()
        );

        Self {
            original,
            cache_state,
            compiler_include_path: config.compiler_include_path.clone(),
            include_paths: config.include_paths.clone(),
            source_extension: config.source_extension.clone(),
            weaver: Arc::clone(container.weaver()),
            includer: Arc::clone(container.includer()),
            state,
        }
    }

    /// Handle to the wrapped original loader.
    pub fn original(&self) -> &Arc<dyn ClassLoader> {
        &self.original
    }

    /// Resolves a class name to the file that should define it.
    ///
    /// Returns `Ok(None)` when no candidate file exists; the chain continues
    /// and the host's own class-not-found path takes over. For existing
    /// files the cache snapshot decides:
    /// - record with a cache uri: serve the rewritten file;
    /// - record without one: serve the original, already inspected file;
    /// - no record: rewrite on demand through the weaving engine.
    pub fn find_file(&self, class_name: &str) -> LoadResult<Option<PathBuf>> {
        if !is_valid_class_name(class_name) {
            return Ok(None);
        }

        let Some(class_file) = self.resolve_class_file(class_name) else {
            return Ok(None);
        };

        match self.cache_state.get(&class_file) {
            Some(record) => match &record.cache_uri {
                Some(cache_uri) => Ok(Some(cache_uri.clone())),
                None => Ok(Some(class_file)),
            },
            None => {
                let started_at = Instant::now();
                let rewritten = self.weaver.rewrite(&class_file)?;
                info!(
                    "event=rewrite module=loader status=ok class={} duration_ms={}",
                    class_name,
                    started_at.elapsed().as_millis()
                );
                Ok(Some(rewritten))
            }
        }
    }

    fn resolve_class_file(&self, class_name: &str) -> Option<PathBuf> {
        if let Some(root) = &self.compiler_include_path {
            // Compiler mode: flat lookup against the precompiled class map.
            let candidate = root.join(format!("{class_name}.{}", self.source_extension));
            return candidate.is_file().then_some(candidate);
        }

        let relative = class_name_to_path(class_name, &self.source_extension);
        self.include_paths
            .iter()
            .map(|root| root.join(&relative))
            .find(|candidate| candidate.is_file())
    }
}

impl ClassLoader for InterceptingLoader {
    fn loader_id(&self) -> &str {
        self.original.loader_id()
    }

    fn autoload(&self, class_name: &str) -> LoadResult<()> {
        if !self.state.is_initialized() {
            return Ok(());
        }
        if class_name.starts_with(TEST_CLASS_PREFIX) {
            return Ok(());
        }

        if let Some(file) = self.find_file(class_name)? {
            self.includer.include(&file)?;
        }
        Ok(())
    }

    fn is_class_defined(&self, class_name: &str) -> bool {
        self.original.is_class_defined(class_name)
    }
}

/// Maps `Vendor_module_className` to `Vendor/Module/ClassName.<ext>`.
///
/// Segments are split on `_`, the first letter of each segment is
/// uppercased and segments are rejoined with path separators.
pub fn class_name_to_path(class_name: &str, extension: &str) -> PathBuf {
    let mut relative = class_name
        .split('_')
        .map(capitalize_segment)
        .collect::<Vec<_>>()
        .join("/");
    relative.push('.');
    relative.push_str(extension);
    PathBuf::from(relative)
}

fn capitalize_segment(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_valid_class_name(class_name: &str) -> bool {
    CLASS_NAME_RE.is_match(class_name)
}
