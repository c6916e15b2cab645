//! # Hatch Resolver Policy
//!
//! Host-side policy for plugin validation, kept in a configuration file next
//! to the host rather than in code. A [`ResolverPolicy`] is applied to a
//! [`ResolverConfig`](crate::plugin_system::ResolverConfig) with
//! [`ResolverConfig::policy`](crate::plugin_system::ResolverConfig::policy).
//!
//! JSON is always available; YAML and TOML depend on the `yaml-config` and
//! `toml-config` features (both on by default).
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
#[cfg(feature = "yaml-config")]
use serde_yaml;
#[cfg(feature = "toml-config")]
use toml;

/// Supported policy file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl PolicyFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            PolicyFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            PolicyFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            PolicyFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(PolicyFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(PolicyFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(PolicyFormat::Toml),
                _ => None,
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read policy file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown or unsupported policy format for path: {path}")]
    UnsupportedFormat {
        path: PathBuf,
    },

    #[error("Failed to deserialize policy from {format}: {message}")]
    Deserialize {
        format: &'static str,
        message: String,
    },
}

/// Validation policy a host applies to every plugin it resolves
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverPolicy {
    /// Keyword every plugin must declare
    pub keyword: Option<String>,
    /// Prefix every plugin name must start with
    pub name_prefix: Option<String>,
    /// Platform identifier to validate against instead of the detected one
    pub platform: Option<String>,
    /// Peer dependency versions the host provides
    pub environment_versions: BTreeMap<String, String>,
    /// Extra runtime component versions checked against `engines`
    pub runtime_versions: BTreeMap<String, String>,
}

impl ResolverPolicy {
    /// Parse a policy from a string in `format`
    pub fn parse(data: &str, format: PolicyFormat) -> Result<Self, ConfigError> {
        match format {
            PolicyFormat::Json => serde_json::from_str(data).map_err(|e| ConfigError::Deserialize {
                format: "JSON",
                message: e.to_string(),
            }),
            #[cfg(feature = "yaml-config")]
            PolicyFormat::Yaml => serde_yaml::from_str(data).map_err(|e| ConfigError::Deserialize {
                format: "YAML",
                message: e.to_string(),
            }),
            #[cfg(feature = "toml-config")]
            PolicyFormat::Toml => toml::from_str(data).map_err(|e| ConfigError::Deserialize {
                format: "TOML",
                message: e.to_string(),
            }),
        }
    }

    /// Load a policy file, choosing the format from its extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = PolicyFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let policy = Self::parse(&data, format)?;
        log::debug!("Loaded resolver policy from {}", path.display());
        Ok(policy)
    }
}
