//! Typed candidate registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::Candidate;

/// Registration faults.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("symbol already registered: {0}")]
    Duplicate(String),
}

/// Name → candidate map. Registration happens while the host assembles its
/// symbol table; resolution during a run is read-only.
#[derive(Default)]
pub struct Registry {
    entries: RwLock<BTreeMap<String, Arc<dyn Candidate>>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a candidate under `symbol`. Duplicate symbols are rejected
    /// rather than silently replaced.
    pub fn register(
        &self,
        symbol: impl Into<String>,
        candidate: Arc<dyn Candidate>,
    ) -> Result<(), RegistryError> {
        let symbol = symbol.into();
        let mut entries = self.entries.write();
        if entries.contains_key(&symbol) {
            return Err(RegistryError::Duplicate(symbol));
        }
        entries.insert(symbol, candidate);
        Ok(())
    }

    /// Look up a candidate by symbol.
    #[must_use]
    pub fn resolve(&self, symbol: &str) -> Option<Arc<dyn Candidate>> {
        self.entries.read().get(symbol).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
