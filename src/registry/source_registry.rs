// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Source Registry
 * Every known passive source, built once at startup and passed by reference
 * © 2026 Bountyy Oy
 */

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::sources::{builtin_sources, Source};

/// Which sources take part in a run
#[derive(Debug, Clone, Default)]
pub struct SourceSelection {
    /// Explicit include list; empty means "use the defaults"
    pub sources: Vec<String>,
    pub exclude_sources: Vec<String>,
    pub use_all: bool,
    pub recursive_only: bool,
}

/// Source Registry
#[derive(Default)]
pub struct SourceRegistry {
    sources: HashMap<String, Arc<dyn Source>>,
}

impl SourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in provider
    pub fn with_builtin_sources() -> Self {
        let mut registry = Self::new();
        for source in builtin_sources() {
            registry.register(source);
        }
        registry
    }

    /// Register a source, replacing any source with the same name
    pub fn register(&mut self, source: Arc<dyn Source>) {
        self.sources.insert(source.name().to_string(), source);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Source>> {
        self.sources.get(&name.to_lowercase())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.sources.values().map(|s| s.name()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Hand configured API keys to the sources that take them
    pub fn provision_keys(&self, config: &ProviderConfig) {
        for source in self.sources.values().filter(|s| s.needs_key()) {
            let keys = config.keys_for(source.name());
            if !keys.is_empty() {
                debug!("Loaded {} API key(s) for {}", keys.len(), source.name());
                source.add_api_keys(keys.to_vec());
            }
        }
    }

    /// Resolve the active set for a run, sorted by name.
    ///
    /// Order: all or explicit list or defaults, then excludes, then the
    /// recursive-only restriction.
    pub fn select(&self, selection: &SourceSelection) -> Vec<Arc<dyn Source>> {
        let mut active: HashMap<&str, &Arc<dyn Source>> = if selection.use_all {
            self.sources.iter().map(|(name, s)| (name.as_str(), s)).collect()
        } else if !selection.sources.is_empty() {
            let mut picked = HashMap::new();
            for name in &selection.sources {
                let name = name.trim().to_lowercase();
                match self.sources.get_key_value(&name) {
                    Some((key, source)) => {
                        picked.insert(key.as_str(), source);
                    }
                    None => warn!("There is no source with the name: {}", name),
                }
            }
            picked
        } else {
            self.sources
                .iter()
                .filter(|(_, s)| s.is_default())
                .map(|(name, s)| (name.as_str(), s))
                .collect()
        };

        for name in &selection.exclude_sources {
            active.remove(name.trim().to_lowercase().as_str());
        }

        if selection.recursive_only {
            active.retain(|_, s| s.has_recursive_support());
        }

        let mut selected: Vec<Arc<dyn Source>> = active.into_values().map(Arc::clone).collect();
        selected.sort_by_key(|s| s.name());
        debug!(
            "Selected sources: {}",
            selected.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
        );
        selected
    }
}
