use std::any::Any;

use hatch_core::plugin_system::error::BoxError;
use hatch_core::{PluginClass, PluginExport, PluginInstance};
use serde_json::Value;

/// Name every instance reports; matches the manifest name minus `my-`
pub const PLUGIN_NAME: &str = "manualplugin";

const DEFAULT_GREETING: &str = "hello";

/// A widget that repeats a greeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualPlugin {
    greeting: String,
}

impl ManualPlugin {
    pub fn greet(&self, target: &str) -> String {
        format!("{}, {}", self.greeting, target)
    }
}

impl PluginInstance for ManualPlugin {
    fn plugin_name(&self) -> Option<&str> {
        Some(PLUGIN_NAME)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Builds [`ManualPlugin`]s. Accepts an optional greeting string.
pub struct ManualPluginClass;

impl PluginClass for ManualPluginClass {
    fn class_name(&self) -> Option<&str> {
        Some("ManualPlugin")
    }

    fn construct(&self, args: &[Value]) -> Result<Box<dyn PluginInstance>, BoxError> {
        let greeting = match args.first() {
            None => DEFAULT_GREETING.to_string(),
            Some(Value::String(greeting)) => greeting.clone(),
            Some(other) => return Err(format!("greeting must be a string, got {}", other).into()),
        };
        Ok(Box::new(ManualPlugin { greeting }))
    }
}

hatch_core::declare_plugin!(PluginExport::class(ManualPluginClass));

#[cfg(test)]
mod tests;
