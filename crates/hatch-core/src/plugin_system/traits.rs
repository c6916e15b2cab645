//! # Plugin Contracts
//!
//! The types a plugin author implements and the host hands to the resolver.
//!
//! A plugin module exports a [`PluginExport`], which takes one of two shapes:
//!
//! - a **class** ([`PluginClass`]) that constructs plugin instances directly, or
//! - a **factory** ([`PluginFactory`]) that receives the host's [`BaseType`] and
//!   returns another export, usually a class derived from that base.
//!
//! Factories let a plugin build its implementation against the base type the
//! host actually runs, rather than the one the plugin was compiled next to.
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use semver::Version;
use serde_json::Value;

use crate::plugin_system::error::BoxError;

/// The extension point every resolved plugin class implements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseType {
    name: String,
    version: Version,
}

impl BaseType {
    /// Create a base type descriptor
    pub fn new(name: &str, version: Version) -> Self {
        Self {
            name: name.to_string(),
            version,
        }
    }

    /// Name of the extension point
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version of the extension point contract
    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A constructed plugin.
pub trait PluginInstance: Any + Send + Sync {
    /// The name this instance reports for itself.
    ///
    /// When present and non-empty it must equal the plugin's derived name.
    fn plugin_name(&self) -> Option<&str> {
        None
    }

    /// Access the concrete instance for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl dyn PluginInstance {
    /// Downcast to a concrete instance type
    pub fn downcast_ref<T: PluginInstance>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for dyn PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("plugin_name", &self.plugin_name())
            .finish_non_exhaustive()
    }
}

/// A constructible plugin implementation.
pub trait PluginClass: Send + Sync {
    /// The class name, or `None` for an anonymous class.
    fn class_name(&self) -> Option<&str>;

    /// Construct a new instance, receiving the caller's arguments verbatim.
    fn construct(&self, args: &[Value]) -> Result<Box<dyn PluginInstance>, BoxError>;
}

impl fmt::Debug for dyn PluginClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginClass")
            .field("class_name", &self.class_name())
            .finish_non_exhaustive()
    }
}

/// A [`PluginClass`] backed by a constructor closure.
pub struct FnClass<F> {
    name: Option<String>,
    constructor: F,
}

impl<F> FnClass<F>
where
    F: Fn(&[Value]) -> Result<Box<dyn PluginInstance>, BoxError> + Send + Sync,
{
    /// A named class
    pub fn named(name: &str, constructor: F) -> Self {
        Self {
            name: Some(name.to_string()),
            constructor,
        }
    }

    /// A class with no name
    pub fn anonymous(constructor: F) -> Self {
        Self {
            name: None,
            constructor,
        }
    }
}

impl<F> PluginClass for FnClass<F>
where
    F: Fn(&[Value]) -> Result<Box<dyn PluginInstance>, BoxError> + Send + Sync,
{
    fn class_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn construct(&self, args: &[Value]) -> Result<Box<dyn PluginInstance>, BoxError> {
        (self.constructor)(args)
    }
}

/// Error raised when an export is invoked as a factory.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// The export is a class and cannot be called as a function.
    #[error("Class constructor {0} cannot be invoked without being constructed")]
    ClassNotConstructed(String),

    /// The factory ran and failed.
    #[error(transparent)]
    Failed(BoxError),
}

impl InvokeError {
    /// Wrap any error raised by a factory body
    pub fn failed(err: impl Into<BoxError>) -> Self {
        InvokeError::Failed(err.into())
    }
}

/// A function that derives a plugin implementation from the host base type.
pub trait PluginFactory: Send + Sync {
    /// Produce the plugin's export for `base`.
    fn resolve(&self, base: &BaseType) -> Result<PluginExport, InvokeError>;
}

impl<F> PluginFactory for F
where
    F: Fn(&BaseType) -> Result<PluginExport, InvokeError> + Send + Sync,
{
    fn resolve(&self, base: &BaseType) -> Result<PluginExport, InvokeError> {
        self(base)
    }
}

/// The value a plugin module exports.
#[derive(Clone)]
pub enum PluginExport {
    /// Direct export of the implementation.
    Class(Arc<dyn PluginClass>),
    /// A function from the base type to an implementation.
    Factory(Arc<dyn PluginFactory>),
}

impl PluginExport {
    /// Export a class
    pub fn class<C: PluginClass + 'static>(class: C) -> Self {
        PluginExport::Class(Arc::new(class))
    }

    /// Export a factory
    pub fn factory<F: PluginFactory + 'static>(factory: F) -> Self {
        PluginExport::Factory(Arc::new(factory))
    }

    /// Call this export as a factory with `base`.
    ///
    /// Classes refuse the call with [`InvokeError::ClassNotConstructed`].
    pub fn invoke(&self, base: &BaseType) -> Result<PluginExport, InvokeError> {
        match self {
            PluginExport::Class(_) => Err(InvokeError::ClassNotConstructed(self.to_string())),
            PluginExport::Factory(factory) => factory.resolve(base),
        }
    }

    /// The class behind this export, if it is one.
    pub fn as_class(&self) -> Option<&Arc<dyn PluginClass>> {
        match self {
            PluginExport::Class(class) => Some(class),
            PluginExport::Factory(_) => None,
        }
    }
}

impl fmt::Display for PluginExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginExport::Class(class) => match class.class_name() {
                Some(name) => write!(f, "class {}", name),
                None => write!(f, "class <anonymous>"),
            },
            PluginExport::Factory(_) => write!(f, "factory"),
        }
    }
}

impl fmt::Debug for PluginExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PluginExport({})", self)
    }
}
