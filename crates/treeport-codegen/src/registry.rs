//! Registry for code generation backends.

use crate::output::go::GoBackend;
use crate::traits::Backend;

/// A set of backends, looked up by name.
pub struct Registry {
    backends: Vec<Box<dyn Backend>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// A registry holding every built-in backend with default options.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(GoBackend::default()));
        registry
    }

    /// Add a backend, replacing any registered under the same name.
    pub fn register(&mut self, backend: Box<dyn Backend>) {
        match self.backends.iter().position(|b| b.name() == backend.name()) {
            Some(i) => self.backends[i] = backend,
            None => self.backends.push(backend),
        }
    }

    /// Get a backend by name.
    pub fn get(&self, name: &str) -> Option<&dyn Backend> {
        self.backends
            .iter()
            .find(|b| b.name() == name)
            .map(|b| b.as_ref())
    }

    /// List all registered backend names.
    pub fn names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
