use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::plugin_system::error::{LoaderError, PluginError};

/// File name of the manifest inside a plugin directory
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Metadata a plugin declares about itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginMetadata {
    /// Raw plugin name, before prefix stripping
    pub name: String,

    /// Plugin version (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Plugin description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Entry library, relative to the plugin directory (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// Keywords the plugin advertises
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Supported platforms; empty means every platform
    #[serde(default, alias = "os")]
    pub platforms: Vec<String>,

    /// Runtime component -> required version range
    #[serde(default)]
    pub engines: BTreeMap<String, String>,

    /// Peer dependency -> required version range
    #[serde(default)]
    pub peer_dependencies: BTreeMap<String, String>,
}

// --- Intermediate struct for deserialization ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawPackageManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    main: Option<String>,
    #[serde(default)]
    keywords: Option<Vec<String>>,
    #[serde(default, alias = "os")]
    platforms: Option<Vec<String>>,
    #[serde(default)]
    engines: Option<BTreeMap<String, String>>,
    #[serde(default)]
    peer_dependencies: Option<BTreeMap<String, String>>,
}

// --- End Intermediate struct ---

impl PluginMetadata {
    /// Create metadata with only a name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: None,
            description: None,
            main: None,
            keywords: Vec::new(),
            platforms: Vec::new(),
            engines: BTreeMap::new(),
            peer_dependencies: BTreeMap::new(),
        }
    }

    /// Build metadata from a parsed manifest, defaulting absent collections.
    ///
    /// Fails if `name` is missing or empty, or a field has the wrong type.
    pub fn from_json(value: Value) -> Result<Self, PluginError> {
        let raw: RawPackageManifest = serde_json::from_value(value)
            .map_err(|e| PluginError::configuration(format!("Invalid plugin manifest: {}", e)))?;

        let name = raw.name.unwrap_or_default();
        if name.is_empty() {
            return Err(PluginError::configuration("Plugin manifest is missing the required \"name\" field"));
        }

        Ok(Self {
            name,
            version: raw.version,
            description: raw.description,
            main: raw.main,
            keywords: raw.keywords.unwrap_or_default(),
            platforms: raw.platforms.unwrap_or_default(),
            engines: raw.engines.unwrap_or_default(),
            peer_dependencies: raw.peer_dependencies.unwrap_or_default(),
        })
    }

    /// Whether the plugin advertises `keyword`
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    /// Whether the plugin runs on `platform`; an empty list allows all
    pub fn supports_platform(&self, platform: &str) -> bool {
        self.platforms.is_empty() || self.platforms.iter().any(|p| p == platform)
    }
}

/// Builder for creating plugin metadata
pub struct MetadataBuilder {
    metadata: PluginMetadata,
}

impl MetadataBuilder {
    /// Create a new metadata builder
    pub fn new(name: &str) -> Self {
        Self {
            metadata: PluginMetadata::new(name),
        }
    }

    /// Set the plugin version
    pub fn version(mut self, version: &str) -> Self {
        self.metadata.version = Some(version.to_string());
        self
    }

    /// Set the plugin description
    pub fn description(mut self, description: &str) -> Self {
        self.metadata.description = Some(description.to_string());
        self
    }

    /// Set the entry library
    pub fn main(mut self, main: &str) -> Self {
        self.metadata.main = Some(main.to_string());
        self
    }

    /// Add a keyword
    pub fn keyword(mut self, keyword: &str) -> Self {
        self.metadata.keywords.push(keyword.to_string());
        self
    }

    /// Add a supported platform
    pub fn platform(mut self, platform: &str) -> Self {
        self.metadata.platforms.push(platform.to_string());
        self
    }

    /// Require a runtime component version range
    pub fn engine(mut self, component: &str, range: &str) -> Self {
        self.metadata.engines.insert(component.to_string(), range.to_string());
        self
    }

    /// Require a peer dependency version range
    pub fn peer_dependency(mut self, dependency: &str, range: &str) -> Self {
        self.metadata.peer_dependencies.insert(dependency.to_string(), range.to_string());
        self
    }

    /// Build the metadata
    pub fn build(self) -> PluginMetadata {
        self.metadata
    }
}

/// Reads the parsed manifest of a plugin directory.
pub trait ManifestLoader: Send + Sync {
    fn load(&self, dir: &Path) -> Result<Value, LoaderError>;
}

/// Reads `package.json` from the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsManifestLoader;

impl ManifestLoader for FsManifestLoader {
    fn load(&self, dir: &Path) -> Result<Value, LoaderError> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let content = fs::read_to_string(&path).map_err(|source| LoaderError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| LoaderError::Json { path, source })
    }
}

/// Obtain the plugin's metadata from the explicit value or the manifest at `location`.
pub fn acquire_metadata(
    explicit: Option<PluginMetadata>,
    location: Option<&Path>,
    loader: &dyn ManifestLoader,
) -> Result<PluginMetadata, PluginError> {
    let metadata = match (explicit, location) {
        (Some(metadata), _) => metadata,
        (None, Some(dir)) => PluginMetadata::from_json(loader.load(dir)?)?,
        (None, None) => {
            return Err(PluginError::configuration(
                "Plugin metadata must be supplied directly or through a plugin location",
            ));
        }
    };

    if metadata.name.is_empty() {
        return Err(PluginError::configuration("Plugin metadata is missing the required \"name\" field"));
    }
    Ok(metadata)
}
