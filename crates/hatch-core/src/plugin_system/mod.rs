//! # Hatch Plugin System
//!
//! Resolves a plugin against a host extension point, validates it, and
//! instantiates it.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`compat`]**: Keyword, platform, engine and peer-dependency checks with
//!   aggregated reporting.
//! - **[`error`]**: Error types ([`PluginError`], [`LoaderError`],
//!   [`ValidationError`]) raised along the pipeline.
//! - **[`loader`]**: The [`ModuleLoader`] seam, with a dynamic-library loader
//!   and an in-process table of statically linked plugins.
//! - **[`logger`]**: Where resolver events are reported.
//! - **[`manifest`]**: Plugin metadata ([`PluginMetadata`]) and manifest reading.
//! - **[`name`]**: Canonical name derivation.
//! - **[`resolution`]**: Turning an export into a constructible class.
//! - **[`resolver`]**: The [`PluginResolver`] that composes all of the above.
//! - **[`shape`]**: Pluggable class-shape detection.
//! - **[`traits`]**: The contracts plugins implement ([`PluginClass`],
//!   [`PluginFactory`], [`PluginInstance`]).
//! - **[`version`]**: Version parsing and range satisfaction.
pub mod compat;
pub mod error;
pub mod loader;
pub mod logger;
pub mod manifest;
pub mod name;
pub mod resolution;
pub mod resolver;
pub mod shape;
pub mod traits;
pub mod version;

pub use compat::Environment;
pub use error::{LoaderError, PluginError, ValidationError, Violation};
pub use loader::{DylibLoader, ModuleLoader, StaticModules};
pub use manifest::{FsManifestLoader, ManifestLoader, MetadataBuilder, PluginMetadata};
pub use resolver::{PluginResolver, ResolverConfig};
pub use shape::{ExportKindShape, NamedClassShape, ShapeTest};
pub use traits::{BaseType, FnClass, InvokeError, PluginClass, PluginExport, PluginFactory, PluginInstance};
pub use version::{RangeCheck, SemverRanges, VersionRange};

// Test module declaration
#[cfg(test)]
mod tests;
