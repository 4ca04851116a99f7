use std::path::{Path, PathBuf};

use modelstack_common::{Error, Result};
use tracing::info;

use crate::env::{self, EnvResolver};
use crate::model::DistributionConfig;

/// Loads distribution files from disk: read, interpolate environment
/// placeholders, then deserialize into the typed model.
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_dir: Self::default_config_dir(),
        }
    }

    /// `$MODELSTACK_HOME` when set, `~/.modelstack` otherwise.
    pub fn default_config_dir() -> PathBuf {
        if let Ok(home) = std::env::var("MODELSTACK_HOME") {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .map(|h| h.join(".modelstack"))
            .unwrap_or_else(|| PathBuf::from(".modelstack"))
    }

    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// An existing filesystem path is used as-is; anything else is treated as
    /// a distribution name under `<config_dir>/distributions/<name>/run.yaml`.
    pub fn resolve_path(&self, spec: &str) -> Result<PathBuf> {
        let direct = PathBuf::from(spec);
        if direct.exists() {
            return Ok(direct);
        }

        let named = self
            .config_dir
            .join("distributions")
            .join(spec)
            .join("run.yaml");
        if named.exists() {
            return Ok(named);
        }

        Err(Error::NotFound(format!(
            "no config file at '{spec}' and no distribution named '{spec}' under {}",
            self.config_dir.join("distributions").display()
        )))
    }

    /// Load a distribution file, interpolating placeholders with `resolver`.
    pub fn load_file(&self, path: &Path, resolver: &EnvResolver) -> Result<DistributionConfig> {
        info!("loading distribution config from {}", path.display());
        let raw = self.read_raw(path)?;

        let doc: serde_yaml::Value = serde_yaml::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: failed to parse YAML: {e}", path.display())))?;

        let doc = env::substitute_value(doc, resolver)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;

        serde_yaml::from_value(doc)
            .map_err(|e| Error::Config(format!("{}: invalid distribution config: {e}", path.display())))
    }

    /// Raw file contents, without interpolation. Placeholder scanning works
    /// on this so unset required variables do not abort a listing.
    pub fn read_raw(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
