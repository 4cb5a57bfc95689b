//! Kernel lifecycle: one-time initialization, autoloader registration and
//! cache purge.

pub mod lifecycle;
pub mod state;
