//! # Hatch Core
//!
//! Loads a plugin for a host extension point, checks that its declared
//! metadata fits the host, and builds instances of it.
//!
//! ```ignore
//! use hatch_core::{BaseType, PluginResolver, ResolverConfig};
//!
//! let resolver = PluginResolver::new(
//!     ResolverConfig::new(BaseType::new("formatter", semver::Version::new(1, 0, 0)))
//!         .location("plugins/my-markdown")
//!         .name_prefix("my-")
//!         .keyword("formatter-plugin"),
//! )?;
//! let formatter = resolver.create(&[])?;
//! ```
pub mod config;
pub mod plugin_system;

// Re-export key public types for hosts and plugins
pub use config::ResolverPolicy;
pub use plugin_system::{
    BaseType, Environment, FnClass, InvokeError, PluginClass, PluginError, PluginExport, PluginFactory,
    PluginInstance, PluginMetadata, PluginResolver, ResolverConfig,
};
