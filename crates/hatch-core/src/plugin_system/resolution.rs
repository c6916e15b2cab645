use std::sync::Arc;

use crate::plugin_system::error::PluginError;
use crate::plugin_system::logger::Logger;
use crate::plugin_system::shape::ShapeTest;
use crate::plugin_system::traits::{BaseType, InvokeError, PluginClass, PluginExport};

/// Determine the constructible class behind a plugin export.
///
/// First match wins:
/// 1. the export passes `shape` and is used directly;
/// 2. otherwise it is invoked as a factory with `base` and the result must
///    pass `shape`.
///
/// If the invocation is refused because the export is in fact a class, the
/// shape test gave a false negative and the original export is used.
pub fn resolve_class(
    candidate: PluginExport,
    base: &BaseType,
    shape: &dyn ShapeTest,
    logger: &Logger,
    plugin: &str,
) -> Result<Arc<dyn PluginClass>, PluginError> {
    if shape.is_class(&candidate) {
        return match candidate {
            PluginExport::Class(class) => {
                logger.debug(&format!("Plugin {} resolved directly", plugin));
                Ok(class)
            }
            other => Err(PluginError::resolution(
                plugin,
                format!("{} was detected as a class but cannot be constructed", other),
                None,
            )),
        };
    }

    let resolved = match candidate.invoke(base) {
        Ok(resolved) => resolved,
        Err(err @ InvokeError::ClassNotConstructed(_)) => {
            logger.warn(&format!(
                "Class detection reported {} as not a class, but invoking it failed with \"{}\"; treating it as a class",
                candidate, err
            ));
            return match candidate {
                PluginExport::Class(class) => {
                    logger.debug(&format!("Plugin {} resolved via false-negative fallback", plugin));
                    Ok(class)
                }
                other => Err(PluginError::resolution(
                    plugin,
                    format!("{} raised a class invocation error but is not a class", other),
                    None,
                )),
            };
        }
        Err(InvokeError::Failed(err)) => {
            return Err(PluginError::resolution(
                plugin,
                format!("indirect resolution failed: {}", err),
                Some(err),
            ));
        }
    };

    let detected = shape.is_class(&resolved);
    match resolved {
        PluginExport::Class(class) if detected => {
            logger.debug(&format!("Plugin {} resolved indirectly through {}", plugin, base));
            Ok(class)
        }
        other => Err(PluginError::resolution(
            plugin,
            format!("resolved value {} is not detectable as a class", other),
            None,
        )),
    }
}
