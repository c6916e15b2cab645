//! # Compatibility Validation
//!
//! Checks a plugin's declared metadata against the host: the required keyword,
//! the current platform, the runtime's own component versions (`engines`) and
//! the versions of sibling components the host provides (`peerDependencies`).
//!
//! Every policy runs; violations are collected and aggregated into one
//! [`ValidationError`] so a caller sees all problems at once.
use std::collections::BTreeMap;

use crate::plugin_system::error::{ValidationError, Violation};
use crate::plugin_system::manifest::PluginMetadata;
use crate::plugin_system::version::{RangeCheck, strip_prerelease};

/// Runtime component name under which the host reports this crate's version
pub const RUNTIME_COMPONENT: &str = "hatch";

/// Facts about the running host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    platform: String,
    runtime_versions: BTreeMap<String, String>,
}

impl Environment {
    /// An environment for `platform` with no runtime components
    pub fn new(platform: &str) -> Self {
        Self {
            platform: platform.to_string(),
            runtime_versions: BTreeMap::new(),
        }
    }

    /// The process's platform and this crate's version
    pub fn current() -> Self {
        Self::new(std::env::consts::OS)
            .with_runtime_version(RUNTIME_COMPONENT, env!("CARGO_PKG_VERSION"))
    }

    /// Add or replace a runtime component version
    pub fn with_runtime_version(mut self, component: &str, version: &str) -> Self {
        self.runtime_versions.insert(component.to_string(), version.to_string());
        self
    }

    /// Override the platform identifier
    pub fn with_platform(mut self, platform: &str) -> Self {
        self.platform = platform.to_string();
        self
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn runtime_versions(&self) -> &BTreeMap<String, String> {
        &self.runtime_versions
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::current()
    }
}

/// The constraints one plugin is validated against
pub struct Compatibility<'a> {
    pub keyword: Option<&'a str>,
    pub environment: &'a Environment,
    pub environment_versions: &'a BTreeMap<String, String>,
    pub ranges: &'a dyn RangeCheck,
}

impl Compatibility<'_> {
    /// Run every policy and aggregate the violations.
    pub fn check(&self, metadata: &PluginMetadata) -> Result<(), ValidationError> {
        match ValidationError::aggregate(self.violations(metadata)) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Every violated policy, in check order: keyword, platform, engines, peers.
    pub fn violations(&self, metadata: &PluginMetadata) -> Vec<Violation> {
        let mut violations = Vec::new();

        if let Some(keyword) = self.keyword {
            if !metadata.has_keyword(keyword) {
                violations.push(Violation::Keyword {
                    required: keyword.to_string(),
                    declared: metadata.keywords.clone(),
                });
            }
        }

        let platform = self.environment.platform();
        if !metadata.supports_platform(platform) {
            violations.push(Violation::Platform {
                platform: platform.to_string(),
                supported: metadata.platforms.clone(),
            });
        }

        for (component, range, actual) in self.unsatisfied(self.environment.runtime_versions(), &metadata.engines) {
            violations.push(Violation::Engine { component, range, actual });
        }

        for (dependency, range, actual) in self.unsatisfied(self.environment_versions, &metadata.peer_dependencies) {
            violations.push(Violation::PeerDependency { dependency, range, actual });
        }

        violations
    }

    /// Entries of `available` whose declared range in `required` is not met.
    ///
    /// Components the plugin does not mention are unconstrained. Pre-release
    /// suffixes of the available version are ignored.
    fn unsatisfied(
        &self,
        available: &BTreeMap<String, String>,
        required: &BTreeMap<String, String>,
    ) -> Vec<(String, String, String)> {
        available
            .iter()
            .filter_map(|(component, actual)| {
                let range = required.get(component)?;
                if self.ranges.satisfies(strip_prerelease(actual), range) {
                    None
                } else {
                    Some((component.clone(), range.clone(), actual.clone()))
                }
            })
            .collect()
    }
}
