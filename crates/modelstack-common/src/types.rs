use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Identifier of a provider binding within a distribution (e.g. "ollama").
#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

/// Public identifier of a model registry entry, including aliases.
#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

/// Identifier of a safety shield registration.
#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShieldId(String);

/// Identifier of a tool group (e.g. "builtin::websearch").
#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolGroupId(String);

macro_rules! impl_id_type {
    ($t:ty) => {
        impl $t {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $t {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $t {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

impl_id_type!(ProviderId);
impl_id_type!(ModelId);
impl_id_type!(ShieldId);
impl_id_type!(ToolGroupId);

/// The capability surfaces a distribution can expose.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Api {
    Inference,
    Safety,
    Agents,
    VectorIo,
    Datasetio,
    Scoring,
    Eval,
    ToolRuntime,
    Telemetry,
}

impl Api {
    /// All capabilities, in the order documentation lists them.
    pub const ALL: [Api; 9] = [
        Api::Inference,
        Api::Safety,
        Api::Agents,
        Api::VectorIo,
        Api::Datasetio,
        Api::Scoring,
        Api::Eval,
        Api::ToolRuntime,
        Api::Telemetry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Api::Inference => "inference",
            Api::Safety => "safety",
            Api::Agents => "agents",
            Api::VectorIo => "vector_io",
            Api::Datasetio => "datasetio",
            Api::Scoring => "scoring",
            Api::Eval => "eval",
            Api::ToolRuntime => "tool_runtime",
            Api::Telemetry => "telemetry",
        }
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Api {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Api::ALL
            .into_iter()
            .find(|api| api.as_str() == s)
            .ok_or_else(|| Error::Config(format!("unknown api '{s}'")))
    }
}

/// Whether a provider runs in-process or against a remote service.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum ProviderScope {
    Inline,
    Remote,
}

impl ProviderScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderScope::Inline => "inline",
            ProviderScope::Remote => "remote",
        }
    }
}

/// A provider implementation type, written `inline::faiss` or `remote::ollama`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderType {
    scope: ProviderScope,
    name: String,
}

impl ProviderType {
    pub fn new(scope: ProviderScope, name: impl Into<String>) -> Self {
        Self {
            scope,
            name: name.into(),
        }
    }

    pub fn scope(&self) -> ProviderScope {
        self.scope
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.scope.as_str(), self.name)
    }
}

impl FromStr for ProviderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scope, name) = s
            .split_once("::")
            .ok_or_else(|| Error::Config(format!("invalid provider type '{s}': expected 'inline::<name>' or 'remote::<name>'")))?;

        let scope = match scope {
            "inline" => ProviderScope::Inline,
            "remote" => ProviderScope::Remote,
            other => {
                return Err(Error::Config(format!(
                    "invalid provider type '{s}': unknown scope '{other}'"
                )));
            }
        };

        if name.is_empty() {
            return Err(Error::Config(format!(
                "invalid provider type '{s}': empty implementation name"
            )));
        }

        Ok(ProviderType {
            scope,
            name: name.to_string(),
        })
    }
}

impl TryFrom<String> for ProviderType {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ProviderType> for String {
    fn from(t: ProviderType) -> String {
        t.to_string()
    }
}
