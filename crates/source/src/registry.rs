//! Explicit plugin registry.

use crate::ContentSource;
use std::collections::HashMap;
use std::sync::Arc;

pub type SourceHandle = Arc<dyn ContentSource>;

/// Content sources, keyed by [`ContentSource::id`].
///
/// The registry is built once by the host application and handed to the
/// [`Gateway`](crate::Gateway); there is no global lookup, so tests can
/// substitute fakes freely.
#[derive(Clone, Default)]
pub struct Registry {
    sources: HashMap<String, SourceHandle>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source, returning the one it replaced (if any).
    pub fn register(&mut self, source: impl ContentSource + 'static) -> Option<SourceHandle> {
        self.register_handle(Arc::new(source))
    }

    /// Register an already shared source.
    pub fn register_handle(&mut self, source: SourceHandle) -> Option<SourceHandle> {
        let id = source.id().to_string();
        let previous = self.sources.insert(id.clone(), source);
        if previous.is_some() {
            tracing::warn!(source = %id, "replaced previously registered source");
        }
        previous
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, source: impl ContentSource + 'static) -> Self {
        self.register(source);
        self
    }

    pub fn get(&self, id: &str) -> Option<&SourceHandle> {
        self.sources.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.sources.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
