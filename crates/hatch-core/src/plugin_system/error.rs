//! # Hatch Plugin System Errors
//!
//! Defines error types specific to plugin resolution.
//!
//! [`PluginError`] is returned by resolver construction and instantiation. Its
//! variants follow the pipeline stages: configuration, name derivation, class
//! resolution, compatibility validation and instantiation. Every message names
//! the plugin location or name and carries its cause's text, so a single
//! `to_string()` reads as the full chain.
//!
//! Compatibility failures are collected as [`Violation`]s and aggregated into a
//! [`ValidationError`]. Manifest and module loading failures are [`LoaderError`]s
//! and pass through unchanged.
use std::any::Any;
use std::path::PathBuf;

/// Boxed error used for causes raised by plugin code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin configuration error: {message}")]
    Configuration {
        message: String,
    },

    #[error("Invalid plugin name: {message}")]
    Name {
        message: String,
    },

    #[error("Plugin {plugin} could not be resolved: {message}")]
    Resolution {
        plugin: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Plugin {plugin} is unsupported: {source}")]
    Unsupported {
        plugin: String,
        #[source]
        source: ValidationError,
    },

    #[error("Failed to instantiate plugin {plugin}: {source}")]
    Instantiation {
        plugin: String,
        #[source]
        source: BoxError,
    },

    #[error("Plugin loader error: {0}")]
    Loader(#[from] LoaderError),
}

impl PluginError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        PluginError::Configuration { message: message.into() }
    }

    pub(crate) fn name(message: impl Into<String>) -> Self {
        PluginError::Name { message: message.into() }
    }

    pub(crate) fn resolution(plugin: &str, message: impl Into<String>, source: Option<BoxError>) -> Self {
        PluginError::Resolution {
            plugin: plugin.to_string(),
            message: message.into(),
            source,
        }
    }
}

/// A single compatibility policy violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("plugin does not declare the required keyword \"{required}\" (declared keywords: [{}])", .declared.join(", "))]
    Keyword {
        required: String,
        declared: Vec<String>,
    },

    #[error("plugin does not support platform \"{platform}\" (supported platforms: [{}])", .supported.join(", "))]
    Platform {
        platform: String,
        supported: Vec<String>,
    },

    #[error("plugin requires {component} version \"{range}\" but the runtime provides \"{actual}\"")]
    Engine {
        component: String,
        range: String,
        actual: String,
    },

    #[error("plugin requires peer dependency {dependency} version \"{range}\" but the environment provides \"{actual}\"")]
    PeerDependency {
        dependency: String,
        range: String,
        actual: String,
    },
}

/// One or more compatibility violations reported as a single failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(transparent)]
    Single(Violation),

    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
    Multiple(Vec<Violation>),
}

impl ValidationError {
    /// Collapse collected violations; `None` when there are none.
    pub fn aggregate(mut violations: Vec<Violation>) -> Option<Self> {
        match violations.len() {
            0 => None,
            1 => violations.pop().map(ValidationError::Single),
            _ => Some(ValidationError::Multiple(violations)),
        }
    }

    /// Every violation, in the order the policies were checked.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationError::Single(violation) => std::slice::from_ref(violation),
            ValidationError::Multiple(violations) => violations,
        }
    }
}

/// The identity an instance reports disagrees with the plugin's derived name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Plugin instance name \"{reported}\" must match the specified name of \"{expected}\"")]
pub struct IdentityMismatch {
    pub reported: String,
    pub expected: String,
}

/// Plugin code panicked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("panic during {operation}: {message}")]
pub struct PluginPanic {
    pub operation: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to open plugin library '{path}': {source}")]
    Library {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("Plugin library '{path}' does not export '{symbol}': {source}")]
    MissingSymbol {
        path: PathBuf,
        symbol: String,
        #[source]
        source: libloading::Error,
    },

    #[error("Plugin library '{path}' was built against '{found}' but the host is '{expected}'")]
    AbiMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("Plugin library '{path}' panicked: {source}")]
    Panicked {
        path: PathBuf,
        #[source]
        source: PluginPanic,
    },

    #[error("Plugin library '{path}' returned a null export")]
    NullExport {
        path: PathBuf,
    },

    #[error("Cannot locate the plugin library in '{path}': {message}")]
    EntryPoint {
        path: PathBuf,
        message: String,
    },

    #[error("No plugin module registered for '{path}'")]
    UnknownModule {
        path: PathBuf,
    },
}

/// Extract a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s_ref) = payload.downcast_ref::<&'static str>() {
        (*s_ref).to_string()
    } else if let Some(s_obj) = payload.downcast_ref::<String>() {
        s_obj.clone()
    } else {
        "Unknown panic reason".to_string()
    }
}
