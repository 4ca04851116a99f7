use std::collections::HashMap;

use modelstack_common::{Api, ModelId, ProviderId, ToolGroupId};
use modelstack_config::{DistributionConfig, ModelEntry, ProviderSpec, ToolGroupEntry};
use tracing::debug;

/// Per-API index over a distribution's provider bindings.
pub struct ProviderRegistry<'a> {
    by_api: HashMap<Api, Vec<&'a ProviderSpec>>,
}

impl<'a> ProviderRegistry<'a> {
    pub fn from_config(config: &'a DistributionConfig) -> Self {
        let mut by_api: HashMap<Api, Vec<&ProviderSpec>> = HashMap::new();
        for (api, specs) in &config.providers {
            by_api.entry(*api).or_default().extend(specs.iter());
        }
        debug!("indexed providers for {} api(s)", by_api.len());
        Self { by_api }
    }

    pub fn providers_for(&self, api: Api) -> &[&'a ProviderSpec] {
        self.by_api.get(&api).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, api: Api, provider_id: &ProviderId) -> Option<&'a ProviderSpec> {
        self.providers_for(api)
            .iter()
            .find(|spec| &spec.provider_id == provider_id)
            .copied()
    }

    /// APIs that have at least one binding, in documentation order.
    pub fn apis(&self) -> Vec<Api> {
        Api::ALL
            .into_iter()
            .filter(|api| self.by_api.contains_key(api))
            .collect()
    }
}

/// Model alias lookup over a distribution's registry entries. Declaration
/// order is preserved for listings; aliases resolve to their entry but do
/// not appear as entries of their own.
pub struct ModelRegistry<'a> {
    entries: Vec<&'a ModelEntry>,
    by_id: HashMap<&'a ModelId, &'a ModelEntry>,
}

impl<'a> ModelRegistry<'a> {
    pub fn from_config(config: &'a DistributionConfig) -> Self {
        let entries: Vec<&ModelEntry> = config.models.iter().collect();
        let mut by_id = HashMap::new();
        for entry in &entries {
            by_id.insert(&entry.model_id, *entry);
            for alias in &entry.aliases {
                by_id.insert(alias, *entry);
            }
        }
        debug!("indexed {} model(s)", entries.len());
        Self { entries, by_id }
    }

    /// Look up an entry by its public id or any of its aliases.
    pub fn resolve(&self, model_id: &ModelId) -> Option<&'a ModelEntry> {
        self.by_id.get(model_id).copied()
    }

    /// The provider-native identifier for a public model id, applying the
    /// fallback rule for entries without an explicit native id.
    pub fn native_model_id(&self, model_id: &ModelId) -> Option<&'a str> {
        self.resolve(model_id).map(ModelEntry::native_model_id)
    }

    pub fn list(&self) -> &[&'a ModelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tool group lookup by identifier.
pub struct ToolGroupRegistry<'a> {
    entries: Vec<&'a ToolGroupEntry>,
}

impl<'a> ToolGroupRegistry<'a> {
    pub fn from_config(config: &'a DistributionConfig) -> Self {
        Self {
            entries: config.tool_groups.iter().collect(),
        }
    }

    pub fn get(&self, toolgroup_id: &ToolGroupId) -> Option<&'a ToolGroupEntry> {
        self.entries
            .iter()
            .find(|entry| &entry.toolgroup_id == toolgroup_id)
            .copied()
    }

    pub fn list(&self) -> &[&'a ToolGroupEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DistributionConfig {
        serde_yaml::from_str(
            r#"
image_name: starter
apis:
- inference
- tool_runtime
providers:
  inference:
  - provider_id: ollama
    provider_type: remote::ollama
  - provider_id: vllm
    provider_type: remote::vllm
  tool_runtime:
  - provider_id: websearch
    provider_type: remote::tavily
models:
- model_id: my-model
  aliases:
  - llama
  - llama-latest
  provider_id: ollama
  provider_model_id: llama3.2:3b
- model_id: raw-model
  provider_id: vllm
tool_groups:
- toolgroup_id: builtin::websearch
  provider_id: websearch
"#,
        )
        .expect("test config should deserialize")
    }

    #[test]
    fn provider_registry_finds_by_api_and_id() {
        let config = config();
        let providers = ProviderRegistry::from_config(&config);

        assert_eq!(providers.providers_for(Api::Inference).len(), 2);
        assert_eq!(providers.apis(), vec![Api::Inference, Api::ToolRuntime]);

        let vllm = providers
            .find(Api::Inference, &ProviderId::from("vllm"))
            .expect("vllm should be indexed");
        assert_eq!(vllm.provider_type.to_string(), "remote::vllm");

        assert!(providers.find(Api::Safety, &ProviderId::from("guard")).is_none());
    }

    #[test]
    fn model_registry_resolves_aliases_with_fallback() {
        let config = config();
        let models = ModelRegistry::from_config(&config);

        assert_eq!(models.len(), 2);
        assert_eq!(
            models.native_model_id(&ModelId::from("my-model")),
            Some("llama3.2:3b")
        );
        assert_eq!(
            models.native_model_id(&ModelId::from("raw-model")),
            Some("raw-model")
        );
        assert!(models.resolve(&ModelId::from("absent")).is_none());
    }

    #[test]
    fn model_registry_resolves_aliases_to_their_entry() {
        let config = config();
        let models = ModelRegistry::from_config(&config);

        for alias in ["llama", "llama-latest"] {
            let entry = models
                .resolve(&ModelId::from(alias))
                .expect("alias should resolve");
            assert_eq!(entry.model_id.as_str(), "my-model");
        }
        // Aliases resolve but are not listed as entries.
        assert_eq!(models.len(), 2);
    }

    #[test]
    fn model_registry_preserves_declaration_order() {
        let config = config();
        let models = ModelRegistry::from_config(&config);
        let ids: Vec<_> = models.list().iter().map(|m| m.model_id.as_str()).collect();
        assert_eq!(ids, vec!["my-model", "raw-model"]);
    }

    #[test]
    fn tool_group_registry_resolves_ids() {
        let config = config();
        let groups = ToolGroupRegistry::from_config(&config);

        let group = groups
            .get(&ToolGroupId::from("builtin::websearch"))
            .expect("group should resolve");
        assert_eq!(group.provider_id.as_str(), "websearch");
        assert!(groups.get(&ToolGroupId::from("builtin::rag")).is_none());
    }
}
