//! Annotation-loading boundary.
//!
//! The annotation subsystem needs a fallback resolver that loads a class and
//! then reports whether it exists. The resolver is a named adapter around
//! the original loader, constructed with it as an explicit dependency.

use crate::loader::chain::ClassLoader;
use std::sync::Arc;

/// Resolver capability the annotation subsystem consumes.
pub trait AnnotationResolver: Send + Sync {
    /// Attempts to load the class as a side effect, then reports whether it
    /// now exists.
    fn resolve(&self, class_name: &str) -> bool;
}

/// External registration boundary for annotation resolvers.
pub trait AnnotationRegistry: Send + Sync {
    fn register_resolver(&self, resolver: Arc<dyn AnnotationResolver>);
}

/// Adapter exposing the original loader as an annotation resolver.
pub struct OriginalLoaderResolver {
    original: Arc<dyn ClassLoader>,
}

impl OriginalLoaderResolver {
    pub fn new(original: Arc<dyn ClassLoader>) -> Self {
        Self { original }
    }
}

impl AnnotationResolver for OriginalLoaderResolver {
    fn resolve(&self, class_name: &str) -> bool {
        // A failed load leaves the class undefined; that is the signal the
        // annotation subsystem expects, not an error.
        if self.original.autoload(class_name).is_err() {
            return false;
        }
        self.original.is_class_defined(class_name)
    }
}
