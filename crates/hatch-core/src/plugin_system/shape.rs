//! # Export Shape Detection
//!
//! Decides whether an export is a constructible class or should be invoked as a
//! factory. The resolver only consults a [`ShapeTest`], so detection strategies
//! can be swapped without touching resolution.
use crate::plugin_system::traits::PluginExport;

/// Answers "is this export a constructible class?".
pub trait ShapeTest: Send + Sync {
    fn is_class(&self, export: &PluginExport) -> bool;
}

impl<F> ShapeTest for F
where
    F: Fn(&PluginExport) -> bool + Send + Sync,
{
    fn is_class(&self, export: &PluginExport) -> bool {
        self(export)
    }
}

/// Default detector: recognizes classes by their declared name.
///
/// Anonymous classes are reported as non-classes. This false negative is
/// known; the resolver recovers from it when invoking the export as a factory
/// fails with [`InvokeError::ClassNotConstructed`](crate::plugin_system::traits::InvokeError::ClassNotConstructed).
#[derive(Debug, Clone, Copy, Default)]
pub struct NamedClassShape;

impl ShapeTest for NamedClassShape {
    fn is_class(&self, export: &PluginExport) -> bool {
        export
            .as_class()
            .and_then(|class| class.class_name())
            .is_some_and(|name| !name.is_empty())
    }
}

/// Detector that trusts the export variant; never wrong for in-process exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportKindShape;

impl ShapeTest for ExportKindShape {
    fn is_class(&self, export: &PluginExport) -> bool {
        matches!(export, PluginExport::Class(_))
    }
}
