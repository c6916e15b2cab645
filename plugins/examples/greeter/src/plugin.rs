//! A factory-style plugin: the host's base type decides which greeter class
//! gets built.
use std::any::Any;

use hatch_core::plugin_system::error::BoxError;
use hatch_core::{BaseType, FnClass, InvokeError, PluginExport, PluginInstance};
use semver::VersionReq;
use serde_json::Value;

pub const PLUGIN_NAME: &str = "greeter";

/// Base type versions this plugin can build against
const SUPPORTED_BASE: &str = "^1.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeter {
    base: String,
    target: String,
}

impl Greeter {
    pub fn greeting(&self) -> String {
        format!("Hello {} from a {} plugin", self.target, self.base)
    }
}

impl PluginInstance for Greeter {
    fn plugin_name(&self) -> Option<&str> {
        Some(PLUGIN_NAME)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Build the greeter class for `base`.
pub fn greeter_for(base: &BaseType) -> Result<PluginExport, InvokeError> {
    let supported = VersionReq::parse(SUPPORTED_BASE).map_err(InvokeError::failed)?;
    if !supported.matches(base.version()) {
        return Err(InvokeError::failed(format!(
            "greeter supports base {} but the host provides {}",
            SUPPORTED_BASE, base
        )));
    }

    let base_name = base.name().to_string();
    let class_name = format!("{}Greeter", base_name);
    let class = FnClass::named(&class_name, move |args: &[Value]| -> Result<Box<dyn PluginInstance>, BoxError> {
        let target = args.first().and_then(Value::as_str).unwrap_or("world").to_string();
        Ok(Box::new(Greeter {
            base: base_name.clone(),
            target,
        }))
    });
    Ok(PluginExport::class(class))
}

hatch_core::declare_plugin!(PluginExport::factory(greeter_for));

#[cfg(test)]
mod tests;
