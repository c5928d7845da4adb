//! Static model catalog with stable enumeration order.

/// A model available for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// Registry key stored in accounts.
    pub key: String,
    /// Name shown in the `models` listing.
    pub display_name: String,
    /// Provider-side model identifier.
    pub provider_model_id: String,
    /// Whether use of this model is metered.
    pub premium: bool,
}

impl ModelSpec {
    /// Create a spec.
    pub fn new(
        key: impl Into<String>,
        display_name: impl Into<String>,
        provider_model_id: impl Into<String>,
        premium: bool,
    ) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            provider_model_id: provider_model_id.into(),
            premium,
        }
    }
}

/// The fixed catalog of models, read-only after startup.
///
/// Selection is by 1-based index into the same order used for display,
/// so the order must never change at runtime.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelSpec>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(vec![
            ModelSpec::new(
                "llama-3-8b",
                "Llama 3 8B Instruct",
                "meta-llama/Meta-Llama-3-8B-Instruct",
                false,
            ),
            ModelSpec::new(
                "mistral-7b",
                "Mistral 7B Instruct",
                "mistralai/Mistral-7B-Instruct-v0.3",
                false,
            ),
            ModelSpec::new(
                "llama-3-70b",
                "Llama 3 70B Instruct",
                "meta-llama/Meta-Llama-3-70B-Instruct",
                true,
            ),
        ])
    }
}

impl ModelRegistry {
    /// Create a registry from a catalog. The catalog must be non-empty.
    pub fn new(models: Vec<ModelSpec>) -> Self {
        assert!(!models.is_empty(), "model registry must not be empty");
        Self { models }
    }

    /// Key of the default model for new accounts: the first free entry,
    /// or the first entry if everything is premium.
    pub fn default_key(&self) -> &str {
        self.models
            .iter()
            .find(|m| !m.premium)
            .unwrap_or(&self.models[0])
            .key
            .as_str()
    }

    /// Look up a model by key.
    pub fn get(&self, key: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.key == key)
    }

    /// Resolve a stored key, falling back to the default model when the
    /// key no longer exists. Stored rows outlive catalog changes.
    pub fn resolve_or_default(&self, key: &str) -> &ModelSpec {
        self.get(key).unwrap_or_else(|| {
            self.models
                .iter()
                .find(|m| !m.premium)
                .unwrap_or(&self.models[0])
        })
    }

    /// Look up a model by 1-based display index.
    pub fn by_index(&self, index: usize) -> Option<&ModelSpec> {
        if index == 0 {
            return None;
        }
        self.models.get(index - 1)
    }

    /// Number of models in the catalog.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the catalog is empty (never true by construction).
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Iterate the catalog in display order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let registry = ModelRegistry::default();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.default_key(), "llama-3-8b");
        assert!(registry.get("llama-3-70b").unwrap().premium);
        assert!(!registry.get("mistral-7b").unwrap().premium);
    }

    #[test]
    fn test_by_index_is_one_based() {
        let registry = ModelRegistry::default();
        assert_eq!(registry.by_index(1).unwrap().key, "llama-3-8b");
        assert_eq!(registry.by_index(3).unwrap().key, "llama-3-70b");
        assert!(registry.by_index(0).is_none());
        assert!(registry.by_index(4).is_none());
    }

    #[test]
    fn test_resolve_or_default_falls_back() {
        let registry = ModelRegistry::default();
        assert_eq!(registry.resolve_or_default("mistral-7b").key, "mistral-7b");
        assert_eq!(registry.resolve_or_default("retired-model").key, "llama-3-8b");
    }

    #[test]
    fn test_default_key_all_premium() {
        let registry = ModelRegistry::new(vec![ModelSpec::new(
            "only", "Only", "provider/only", true,
        )]);
        assert_eq!(registry.default_key(), "only");
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn test_empty_catalog_panics() {
        ModelRegistry::new(vec![]);
    }
}
