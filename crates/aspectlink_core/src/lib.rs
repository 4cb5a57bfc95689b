//! Core integration layer between an AOP weaving engine and a
//! composer-style class-loading host.
//! This crate owns the loader-chain rewrite and the kernel lifecycle.

pub mod cache_state;
pub mod config;
pub mod container;
pub mod kernel;
pub mod loader;
pub mod logging;
pub mod weaver;

pub use cache_state::{CacheRecord, CacheState, CacheStateProvider};
pub use config::{ConfigError, HostConfig};
pub use container::AspectContainer;
pub use kernel::lifecycle::{CacheClearEvent, KernelLifecycleManager, LifecycleError};
pub use kernel::state::KernelState;
pub use loader::annotations::{AnnotationRegistry, AnnotationResolver, OriginalLoaderResolver};
pub use loader::chain::{ChainError, ClassLoader, LoaderChain};
pub use loader::intercepting::{class_name_to_path, InterceptingLoader};
pub use loader::rewriter::rewrite_chain;
pub use loader::{LoadError, LoadResult, SourceIncluder};
pub use logging::{default_log_level, init_logging};
pub use weaver::{WeaverConfig, WeaverError, WeavingEngine};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
