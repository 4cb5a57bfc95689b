//! One-time loader-chain rewrite.
//!
//! # Responsibility
//! - Substitute the composer-style loader with an intercepting wrapper while
//!   keeping every other entry and the overall chain order untouched.
//! - Register the original loader as the annotation fallback resolver.
//!
//! # Invariants
//! - Chain length and relative order are identical before and after.
//! - Exactly one entry is wrapped per invocation; single invocation is
//!   guaranteed upstream by the `registered` lifecycle guard.

use crate::config::HostConfig;
use crate::container::AspectContainer;
use crate::kernel::state::KernelState;
use crate::loader::annotations::OriginalLoaderResolver;
use crate::loader::chain::{ChainError, ClassLoader, LoaderChain};
use crate::loader::intercepting::InterceptingLoader;
use log::info;
use std::sync::Arc;

/// Rewrites the chain in place and returns whether the target loader was
/// found and wrapped.
///
/// Every entry is unregistered and re-registered in the original order;
/// earlier loaders may intentionally shadow later ones, so order is a
/// correctness requirement. When the target id is absent the chain is
/// restored unchanged and `Ok(false)` is returned; the aspect layer simply
/// never activates.
pub fn rewrite_chain(
    chain: &mut LoaderChain,
    container: &AspectContainer,
    state: &Arc<KernelState>,
    config: &HostConfig,
) -> Result<bool, ChainError> {
    let entries = chain.drain();
    let mut wrapped = false;

    for entry in entries {
        let entry = if !wrapped && entry.loader_id() == config.original_loader_id {
            let original = Arc::clone(&entry);
            container
                .annotations()
                .register_resolver(Arc::new(OriginalLoaderResolver::new(Arc::clone(&original))));

            wrapped = true;
            Arc::new(InterceptingLoader::new(
                original,
                container,
                Arc::clone(state),
                config,
            )) as Arc<dyn ClassLoader>
        } else {
            entry
        };
        chain.register(entry)?;
    }

    info!(
        "event=chain_rewrite module=loader status=ok wrapped={wrapped} target={} chain_len={}",
        config.original_loader_id,
        chain.len()
    );
    Ok(wrapped)
}
