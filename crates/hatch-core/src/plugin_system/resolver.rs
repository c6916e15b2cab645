//! # Plugin Resolver
//!
//! [`PluginResolver`] ties the pipeline together. Construction acquires the
//! plugin's metadata, derives its canonical name, resolves its class and
//! validates compatibility, in that order; it either returns a ready resolver
//! or the first stage's error. [`PluginResolver::create`] then builds as many
//! independent instances as the caller needs.
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::Level;
use serde_json::Value;

use crate::config::ResolverPolicy;
use crate::plugin_system::compat::{Compatibility, Environment};
use crate::plugin_system::error::{panic_message, BoxError, IdentityMismatch, PluginError, PluginPanic};
use crate::plugin_system::loader::{DylibLoader, ModuleLoader};
use crate::plugin_system::logger::Logger;
use crate::plugin_system::manifest::{acquire_metadata, FsManifestLoader, ManifestLoader, PluginMetadata};
use crate::plugin_system::name::derive_name;
use crate::plugin_system::resolution::resolve_class;
use crate::plugin_system::shape::{NamedClassShape, ShapeTest};
use crate::plugin_system::traits::{BaseType, PluginClass, PluginExport, PluginInstance};
use crate::plugin_system::version::{RangeCheck, SemverRanges};

/// Everything a [`PluginResolver`] is built from.
pub struct ResolverConfig {
    base: BaseType,
    keyword: Option<String>,
    name_prefix: Option<String>,
    environment_versions: BTreeMap<String, String>,
    location: Option<PathBuf>,
    metadata: Option<PluginMetadata>,
    implementation: Option<PluginExport>,
    logger: Logger,
    manifest_loader: Arc<dyn ManifestLoader>,
    module_loader: Arc<dyn ModuleLoader>,
    ranges: Arc<dyn RangeCheck>,
    shape: Arc<dyn ShapeTest>,
    environment: Environment,
}

impl ResolverConfig {
    /// Start a configuration for plugins of `base`
    pub fn new(base: BaseType) -> Self {
        Self {
            base,
            keyword: None,
            name_prefix: None,
            environment_versions: BTreeMap::new(),
            location: None,
            metadata: None,
            implementation: None,
            logger: Logger::facade(),
            manifest_loader: Arc::new(FsManifestLoader),
            module_loader: Arc::new(DylibLoader::new()),
            ranges: Arc::new(SemverRanges),
            shape: Arc::new(NamedClassShape),
            environment: Environment::current(),
        }
    }

    /// Require plugins to declare `keyword`
    pub fn keyword(mut self, keyword: &str) -> Self {
        self.keyword = Some(keyword.to_string());
        self
    }

    /// Require plugin names to start with `prefix`, which is stripped
    pub fn name_prefix(mut self, prefix: &str) -> Self {
        self.name_prefix = Some(prefix.to_string());
        self
    }

    /// Report the available version of a peer dependency
    pub fn environment_version(mut self, dependency: &str, version: &str) -> Self {
        self.environment_versions.insert(dependency.to_string(), version.to_string());
        self
    }

    /// Report several peer dependency versions at once
    pub fn environment_versions<I, K, V>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environment_versions
            .extend(versions.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Directory (or library) the plugin lives in
    pub fn location<P: AsRef<Path>>(mut self, location: P) -> Self {
        self.location = Some(location.as_ref().to_path_buf());
        self
    }

    /// Use this metadata instead of reading the manifest
    pub fn metadata(mut self, metadata: PluginMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Use this export instead of loading the plugin module
    pub fn implementation(mut self, export: PluginExport) -> Self {
        self.implementation = Some(export);
        self
    }

    /// Send resolver events to `callback` instead of the `log` facade
    pub fn logger<F>(mut self, callback: F) -> Self
    where
        F: Fn(Level, &str) + Send + Sync + 'static,
    {
        self.logger = Logger::from_fn(callback);
        self
    }

    pub fn manifest_loader<L: ManifestLoader + 'static>(mut self, loader: L) -> Self {
        self.manifest_loader = Arc::new(loader);
        self
    }

    pub fn module_loader<L: ModuleLoader + 'static>(mut self, loader: L) -> Self {
        self.module_loader = Arc::new(loader);
        self
    }

    pub fn range_check<R: RangeCheck + 'static>(mut self, ranges: R) -> Self {
        self.ranges = Arc::new(ranges);
        self
    }

    pub fn shape_test<S: ShapeTest + 'static>(mut self, shape: S) -> Self {
        self.shape = Arc::new(shape);
        self
    }

    /// Replace the detected platform and runtime versions
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Apply a host policy, typically loaded from a config file.
    ///
    /// Values present in the policy override earlier settings; version maps
    /// are merged.
    pub fn policy(mut self, policy: &ResolverPolicy) -> Self {
        if let Some(keyword) = &policy.keyword {
            self.keyword = Some(keyword.clone());
        }
        if let Some(prefix) = &policy.name_prefix {
            self.name_prefix = Some(prefix.clone());
        }
        if let Some(platform) = &policy.platform {
            self.environment = self.environment.with_platform(platform);
        }
        for (component, version) in &policy.runtime_versions {
            self.environment = self.environment.with_runtime_version(component, version);
        }
        self.environment_versions.extend(
            policy
                .environment_versions
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self
    }
}

impl fmt::Debug for ResolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverConfig")
            .field("base", &self.base)
            .field("keyword", &self.keyword)
            .field("name_prefix", &self.name_prefix)
            .field("environment_versions", &self.environment_versions)
            .field("location", &self.location)
            .field("metadata", &self.metadata)
            .field("implementation", &self.implementation)
            .field("logger", &self.logger)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

/// A resolved, validated plugin ready to be instantiated.
pub struct PluginResolver {
    name: String,
    label: String,
    location: Option<PathBuf>,
    metadata: PluginMetadata,
    base: BaseType,
    class: Arc<dyn PluginClass>,
    logger: Logger,
}

impl PluginResolver {
    /// Resolve and validate a plugin.
    pub fn new(config: ResolverConfig) -> Result<Self, PluginError> {
        let ResolverConfig {
            base,
            keyword,
            name_prefix,
            environment_versions,
            location,
            metadata,
            implementation,
            logger,
            manifest_loader,
            module_loader,
            ranges,
            shape,
            environment,
        } = config;

        let location = location.filter(|path| !path.as_os_str().is_empty());
        let metadata = acquire_metadata(metadata, location.as_deref(), manifest_loader.as_ref())?;
        let label = match &location {
            Some(path) => path.display().to_string(),
            None => metadata.name.clone(),
        };

        let name = derive_name(&metadata.name, name_prefix.as_deref())?;

        let candidate = match (implementation, &location) {
            (Some(export), _) => export,
            (None, Some(path)) => module_loader.load(path)?,
            (None, None) => {
                return Err(PluginError::configuration(format!(
                    "Plugin {} has neither an implementation nor a location to load one from",
                    label
                )));
            }
        };
        let class = resolve_class(candidate, &base, shape.as_ref(), &logger, &label)?;

        let compatibility = Compatibility {
            keyword: keyword.as_deref(),
            environment: &environment,
            environment_versions: &environment_versions,
            ranges: ranges.as_ref(),
        };
        compatibility
            .check(&metadata)
            .map_err(|source| PluginError::Unsupported {
                plugin: label.clone(),
                source,
            })?;

        logger.debug(&format!("Plugin {} is supported as \"{}\"", label, name));
        Ok(Self {
            name,
            label,
            location,
            metadata,
            base,
            class,
            logger,
        })
    }

    /// Construct a new plugin instance.
    ///
    /// Arguments are passed to the class unchanged. An instance that reports a
    /// name must report the derived plugin name.
    pub fn create(&self, args: &[Value]) -> Result<Box<dyn PluginInstance>, PluginError> {
        let instance = self
            .instantiate(args)
            .map_err(|source| PluginError::Instantiation {
                plugin: self.label.clone(),
                source,
            })?;
        self.logger.debug(&format!("Created an instance of plugin {}", self.name));
        Ok(instance)
    }

    fn instantiate(&self, args: &[Value]) -> Result<Box<dyn PluginInstance>, BoxError> {
        let class = &self.class;
        let instance = panic::catch_unwind(AssertUnwindSafe(|| class.construct(args)))
            .map_err(|payload| PluginPanic {
                operation: "construction".to_string(),
                message: panic_message(payload),
            })??;

        match instance.plugin_name() {
            Some(reported) if !reported.is_empty() && reported != self.name => Err(IdentityMismatch {
                reported: reported.to_string(),
                expected: self.name.clone(),
            }
            .into()),
            _ => Ok(instance),
        }
    }

    /// The derived plugin name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The plugin location, or its raw name when it has none
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    pub fn base(&self) -> &BaseType {
        &self.base
    }

    /// The resolved implementation
    pub fn class(&self) -> &Arc<dyn PluginClass> {
        &self.class
    }
}

impl fmt::Debug for PluginResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginResolver")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("base", &self.base)
            .field("class", &self.class.class_name())
            .finish_non_exhaustive()
    }
}
