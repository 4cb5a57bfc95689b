//! Typed loader-chain registry.
//!
//! # Responsibility
//! - Own the ordered list of class loaders the host tries in turn.
//! - Preserve registration order; first registered, first tried.
//!
//! # Invariants
//! - Entries are mutated only during the one-time chain rewrite.
//! - Relative order of re-registration equals the order of register calls.

use crate::loader::LoadResult;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// One callback in the host's class-resolution chain.
pub trait ClassLoader: Send + Sync {
    /// Stable identifier used to target specific entries during rewrite.
    fn loader_id(&self) -> &str;

    /// Attempts to load the class. Not finding it is `Ok(())`; the chain
    /// continues with the next loader.
    fn autoload(&self, class_name: &str) -> LoadResult<()>;

    /// Reports whether the class exists without triggering further loading.
    fn is_class_defined(&self, class_name: &str) -> bool;
}

/// Ordered, first-match-wins loader registry.
#[derive(Default)]
pub struct LoaderChain {
    entries: Vec<Arc<dyn ClassLoader>>,
}

impl LoaderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one loader to the chain.
    pub fn register(&mut self, loader: Arc<dyn ClassLoader>) -> Result<(), ChainError> {
        let loader_id = loader.loader_id();
        if loader_id.trim().is_empty() || loader_id != loader_id.trim() {
            return Err(ChainError::InvalidLoaderId(loader_id.to_string()));
        }
        if self.entries.iter().any(|entry| entry.loader_id() == loader_id) {
            return Err(ChainError::DuplicateLoaderId(loader_id.to_string()));
        }
        self.entries.push(loader);
        Ok(())
    }

    /// Removes the loader with the given id, keeping the rest in order.
    pub fn unregister(&mut self, loader_id: &str) -> Option<Arc<dyn ClassLoader>> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.loader_id() == loader_id)?;
        Some(self.entries.remove(index))
    }

    /// Removes and returns every entry in registration order.
    pub fn drain(&mut self) -> Vec<Arc<dyn ClassLoader>> {
        std::mem::take(&mut self.entries)
    }

    /// Order-preserving read of the registered loaders.
    pub fn loaders(&self) -> &[Arc<dyn ClassLoader>] {
        &self.entries
    }

    /// Registered loader ids in chain order.
    pub fn loader_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.loader_id().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walks the chain in order until some loader defines the class.
    ///
    /// Returns whether the class ended up defined. Loader errors abort the
    /// walk and propagate.
    pub fn autoload(&self, class_name: &str) -> LoadResult<bool> {
        for loader in &self.entries {
            loader.autoload(class_name)?;
            if loader.is_class_defined(class_name) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Chain registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    InvalidLoaderId(String),
    DuplicateLoaderId(String),
}

impl Display for ChainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLoaderId(value) => write!(f, "loader id is invalid: `{value}`"),
            Self::DuplicateLoaderId(value) => {
                write!(f, "loader id already registered: `{value}`")
            }
        }
    }
}

impl Error for ChainError {}
