// crates/hatch-core/src/plugin_system/tests/common.rs
#![cfg(test)]

use std::any::Any;
use std::sync::{Arc, Mutex};

use log::Level;
use semver::Version;
use serde_json::Value;

use crate::plugin_system::compat::Environment;
use crate::plugin_system::manifest::PluginMetadata;
use crate::plugin_system::resolver::ResolverConfig;
use crate::plugin_system::traits::{BaseType, FnClass, PluginExport, PluginInstance};

/// Instance type built by the test classes
#[derive(Debug)]
pub struct TestPlugin {
    pub name: Option<String>,
    pub args: Vec<Value>,
}

impl PluginInstance for TestPlugin {
    fn plugin_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn base() -> BaseType {
    BaseType::new("widget", Version::new(1, 0, 0))
}

/// Fixed environment so platform and engine checks are deterministic
pub fn linux_env() -> Environment {
    Environment::new("linux").with_runtime_version("hatch", "1.2.3")
}

/// A class named `class` whose instances report `identity`
pub fn reporting_class(class: &str, identity: Option<&str>) -> PluginExport {
    let identity = identity.map(str::to_string);
    PluginExport::class(FnClass::named(class, move |args: &[Value]| {
        Ok(Box::new(TestPlugin {
            name: identity.clone(),
            args: args.to_vec(),
        }) as Box<dyn PluginInstance>)
    }))
}

/// An anonymous class whose instances report `identity`
pub fn anonymous_class(identity: Option<&str>) -> PluginExport {
    let identity = identity.map(str::to_string);
    PluginExport::class(FnClass::anonymous(move |args: &[Value]| {
        Ok(Box::new(TestPlugin {
            name: identity.clone(),
            args: args.to_vec(),
        }) as Box<dyn PluginInstance>)
    }))
}

/// Configuration with explicit metadata and implementation and a fixed environment
pub fn config_for(metadata: PluginMetadata, implementation: PluginExport) -> ResolverConfig {
    ResolverConfig::new(base())
        .metadata(metadata)
        .implementation(implementation)
        .environment(linux_env())
}

/// Collects resolver log events
#[derive(Clone, Default)]
pub struct LogRecorder {
    entries: Arc<Mutex<Vec<(Level, String)>>>,
}

impl LogRecorder {
    pub fn sink(&self) -> impl Fn(Level, &str) + Send + Sync + 'static {
        let entries = Arc::clone(&self.entries);
        move |level: Level, message: &str| {
            entries.lock().unwrap().push((level, message.to_string()));
        }
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }
}
