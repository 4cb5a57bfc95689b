//! Dependency bundle for the external collaborators the core needs.

use crate::cache_state::CacheStateProvider;
use crate::loader::annotations::AnnotationRegistry;
use crate::loader::SourceIncluder;
use crate::weaver::WeavingEngine;
use std::sync::Arc;

/// Explicit lookup object handed through initialization instead of a global
/// service container.
#[derive(Clone)]
pub struct AspectContainer {
    cache_state: Arc<dyn CacheStateProvider>,
    weaver: Arc<dyn WeavingEngine>,
    annotations: Arc<dyn AnnotationRegistry>,
    includer: Arc<dyn SourceIncluder>,
}

impl AspectContainer {
    pub fn new(
        cache_state: Arc<dyn CacheStateProvider>,
        weaver: Arc<dyn WeavingEngine>,
        annotations: Arc<dyn AnnotationRegistry>,
        includer: Arc<dyn SourceIncluder>,
    ) -> Self {
        Self {
            cache_state,
            weaver,
            annotations,
            includer,
        }
    }

    pub fn cache_state_provider(&self) -> &Arc<dyn CacheStateProvider> {
        &self.cache_state
    }

    pub fn weaver(&self) -> &Arc<dyn WeavingEngine> {
        &self.weaver
    }

    pub fn annotations(&self) -> &Arc<dyn AnnotationRegistry> {
        &self.annotations
    }

    pub fn includer(&self) -> &Arc<dyn SourceIncluder> {
        &self.includer
    }
}
