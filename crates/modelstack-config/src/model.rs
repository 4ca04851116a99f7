use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use url::Url;

use modelstack_common::{Api, ModelId, ProviderId, ProviderType, ShieldId, ToolGroupId};

/// A fully parsed distribution file: one deployable instance of a
/// model-serving stack, loaded at startup and read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    pub image_name: String,

    #[serde(default)]
    pub apis: Vec<Api>,

    #[serde(default)]
    pub providers: HashMap<Api, Vec<ProviderSpec>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_store: Option<StoreReference>,

    #[serde(default)]
    pub models: Vec<ModelEntry>,

    #[serde(default)]
    pub shields: Vec<ShieldEntry>,

    #[serde(default)]
    pub tool_groups: Vec<ToolGroupEntry>,

    #[serde(default)]
    pub server: ServerConfig,
}

impl DistributionConfig {
    /// Providers bound to one API, or an empty slice if none are declared.
    pub fn providers_for(&self, api: Api) -> &[ProviderSpec] {
        self.providers.get(&api).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn default_version() -> u32 {
    2
}

/// One (provider_id, provider_type, config) binding under an API section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSpec {
    pub provider_id: ProviderId,
    pub provider_type: ProviderType,

    /// Provider-specific settings: credentials, endpoints, storage paths,
    /// numeric limits. Shape is opaque to the distribution layer.
    #[serde(default)]
    pub config: HashMap<String, serde_yaml::Value>,
}

/// A typed pointer to a persistence backend. The distribution layer never
/// opens these; it only carries them for the consuming runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreReference {
    Sqlite {
        db_path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
    },
    Postgres {
        host: String,
        #[serde(default = "default_postgres_port")]
        port: u16,
        db: String,
        user: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },
    Redis {
        host: String,
        port: u16,
    },
}

fn default_postgres_port() -> u16 {
    5432
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    #[default]
    Llm,
    Embedding,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Llm => "llm",
            ModelType::Embedding => "embedding",
        }
    }
}

/// Maps a public model identifier (and any aliases) to a provider and its
/// native model id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub model_id: ModelId,

    /// Alternative public identifiers resolving to this same entry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<ModelId>,

    pub provider_id: ProviderId,

    /// The provider's own name for the model. Absent means the public id is
    /// already the native one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_model_id: Option<String>,

    #[serde(default)]
    pub model_type: ModelType,

    #[serde(default)]
    pub metadata: HashMap<String, serde_yaml::Value>,
}

impl ModelEntry {
    /// The identifier to hand to the provider, falling back to the public id.
    pub fn native_model_id(&self) -> &str {
        self.provider_model_id
            .as_deref()
            .unwrap_or_else(|| self.model_id.as_str())
    }
}

/// A safety shield registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldEntry {
    pub shield_id: ShieldId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<ProviderId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_shield_id: Option<String>,
}

/// Maps a tool group to the tool_runtime provider implementing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolGroupEntry {
    pub toolgroup_id: ToolGroupId,
    pub provider_id: ProviderId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_endpoint: Option<Url>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8321
}
