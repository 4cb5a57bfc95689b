//! Kernel lifecycle state.
//!
//! # Responsibility
//! - Hold the process-wide `initialized` and `registered` flags behind
//!   guarded transitions instead of mutable globals.
//!
//! # Invariants
//! - Each flag transitions false to true exactly once.
//! - `registered` can only become true after `initialized`.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shared lifecycle flags for one process.
///
/// One `Arc<KernelState>` handle is shared between the lifecycle manager and
/// every intercepting loader; the loaders read `is_initialized` as their
/// ready gate.
#[derive(Debug, Default)]
pub struct KernelState {
    initialized: AtomicBool,
    registered: AtomicBool,
}

impl KernelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the kernel initialized. Returns whether this call performed
    /// the transition.
    pub fn try_initialize(&self) -> bool {
        self.initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Marks the autoloader registered. Refused while the kernel is not yet
    /// initialized. Returns whether this call performed the transition.
    pub fn try_register(&self) -> bool {
        if !self.is_initialized() {
            return false;
        }
        self.registered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }
}
