//! Provider registry

use super::Generator;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Name and description advertised for a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDescriptor {
    pub name: String,
    pub description: String,
}

/// Name → generator mapping.
///
/// Filled once at startup, then shared behind an `Arc` and only read.
/// Lookups are exact string matches.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Generator>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a generator under its own name, replacing any previous entry
    pub fn register(&mut self, generator: Arc<dyn Generator>) {
        let name = generator.name().to_string();
        if self.providers.insert(name.clone(), generator).is_some() {
            tracing::warn!(provider = %name, "Replaced previously registered provider");
        }
    }

    /// Get a generator by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Generator>> {
        self.providers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Descriptors for every provider, sorted by name
    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        self.names()
            .into_iter()
            .filter_map(|name| self.providers.get(name))
            .map(|generator| {
                let description = match generator.description() {
                    "" => generator.name(),
                    d => d,
                };
                ProviderDescriptor {
                    name: generator.name().to_string(),
                    description: description.to_string(),
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::StubGenerator;

    #[test]
    fn test_registry_new() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(StubGenerator::ok("alpha", "A")));

        assert!(registry.contains("alpha"));
        assert_eq!(registry.get("alpha").unwrap().name(), "alpha");
        assert!(registry.get("beta").is_none());
    }

    #[test]
    fn test_lookup_is_exact() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(StubGenerator::ok("gemini", "x")));

        assert!(registry.get("Gemini").is_none());
        assert!(registry.get(" gemini").is_none());
        assert!(registry.get("gem").is_none());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(StubGenerator::ok("alpha", "first")));
        registry.register(Arc::new(StubGenerator::ok("alpha", "second")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_descriptors_sorted() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(StubGenerator::ok("zeta", "z")));
        registry.register(Arc::new(StubGenerator::ok("alpha", "a")));

        let names: Vec<String> = registry.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_empty_description_falls_back_to_name() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(StubGenerator::ok("bare", "x").with_description("")));

        let descriptors = registry.descriptors();
        assert_eq!(descriptors[0].description, "bare");
    }
}
