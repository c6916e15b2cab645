// crates/hatch-core/src/plugin_system/tests/resolution_tests.rs
#![cfg(test)]

use std::io;

use log::Level;

use crate::plugin_system::error::PluginError;
use crate::plugin_system::logger::Logger;
use crate::plugin_system::resolution::resolve_class;
use crate::plugin_system::shape::{ExportKindShape, NamedClassShape};
use crate::plugin_system::tests::common::{anonymous_class, base, reporting_class, LogRecorder};
use crate::plugin_system::traits::{BaseType, InvokeError, PluginExport};

fn recording_logger() -> (LogRecorder, Logger) {
    let recorder = LogRecorder::default();
    let logger = Logger::from_fn(recorder.sink());
    (recorder, logger)
}

#[test]
fn test_direct_resolution() {
    let (recorder, logger) = recording_logger();
    let class = resolve_class(reporting_class("ManualPlugin", None), &base(), &NamedClassShape, &logger, "manual")
        .expect("direct class should resolve");

    assert_eq!(class.class_name(), Some("ManualPlugin"));
    assert!(recorder.contains(Level::Debug, "Plugin manual resolved directly"));
}

#[test]
fn test_indirect_resolution_receives_base() {
    let (recorder, logger) = recording_logger();
    let factory = PluginExport::factory(|base: &BaseType| -> Result<PluginExport, InvokeError> {
        assert_eq!(base.name(), "widget");
        Ok(reporting_class("WidgetGreeter", None))
    });

    let class = resolve_class(factory, &base(), &NamedClassShape, &logger, "greeter").expect("factory should resolve");

    assert_eq!(class.class_name(), Some("WidgetGreeter"));
    assert!(recorder.contains(Level::Debug, "resolved indirectly through widget@1.0.0"));
}

#[test]
fn test_false_negative_fallback() {
    let (recorder, logger) = recording_logger();
    let class = resolve_class(anonymous_class(None), &base(), &NamedClassShape, &logger, "anon")
        .expect("anonymous class should fall back to direct use");

    assert!(class.class_name().is_none());
    assert!(recorder.contains(Level::Warn, "class <anonymous>"));
    assert!(recorder.contains(Level::Warn, "cannot be invoked without being constructed"));
    assert!(recorder.contains(Level::Debug, "Plugin anon resolved via false-negative fallback"));
}

#[test]
fn test_accurate_shape_skips_fallback() {
    let (recorder, logger) = recording_logger();
    resolve_class(anonymous_class(None), &base(), &ExportKindShape, &logger, "anon").unwrap();

    assert!(recorder.contains(Level::Debug, "resolved directly"));
    assert!(!recorder.entries().iter().any(|(level, _)| *level == Level::Warn));
}

#[test]
fn test_factory_failure() {
    let (_recorder, logger) = recording_logger();
    let factory = PluginExport::factory(|_: &BaseType| -> Result<PluginExport, InvokeError> {
        Err(InvokeError::failed(io::Error::other("widget kit unavailable")))
    });

    let err = resolve_class(factory, &base(), &NamedClassShape, &logger, "broken").unwrap_err();
    match &err {
        PluginError::Resolution { plugin, source, .. } => {
            assert_eq!(plugin, "broken");
            assert!(source.is_some());
        }
        other => panic!("Expected Resolution error, got {:?}", other),
    }
    let message = err.to_string();
    assert!(message.contains("indirect resolution failed"));
    assert!(message.contains("widget kit unavailable"));
}

#[test]
fn test_factory_returning_factory() {
    let (_recorder, logger) = recording_logger();
    let factory = PluginExport::factory(|_: &BaseType| -> Result<PluginExport, InvokeError> {
        Ok(PluginExport::factory(|_: &BaseType| -> Result<PluginExport, InvokeError> {
            Ok(reporting_class("TooDeep", None))
        }))
    });

    let err = resolve_class(factory, &base(), &NamedClassShape, &logger, "nested").unwrap_err();
    assert!(matches!(err, PluginError::Resolution { .. }));
    assert!(err.to_string().contains("not detectable as a class"));
}

#[test]
fn test_factory_returning_undetectable_class() {
    let (_recorder, logger) = recording_logger();
    let factory = PluginExport::factory(|_: &BaseType| -> Result<PluginExport, InvokeError> { Ok(anonymous_class(None)) });

    let err = resolve_class(factory, &base(), &NamedClassShape, &logger, "hidden").unwrap_err();
    assert!(err.to_string().contains("resolved value class <anonymous> is not detectable as a class"));
}

#[test]
fn test_factory_raising_class_error_is_not_a_class() {
    let (_recorder, logger) = recording_logger();
    let factory = PluginExport::factory(|_: &BaseType| -> Result<PluginExport, InvokeError> {
        Err(InvokeError::ClassNotConstructed("Inner".to_string()))
    });

    let err = resolve_class(factory, &base(), &NamedClassShape, &logger, "liar").unwrap_err();
    assert!(matches!(err, PluginError::Resolution { .. }));
    assert!(err.to_string().contains("is not a class"));
}

#[test]
fn test_shape_claiming_factory_is_class() {
    let (_recorder, logger) = recording_logger();
    let factory = PluginExport::factory(|_: &BaseType| -> Result<PluginExport, InvokeError> { Ok(reporting_class("X", None)) });

    let err = resolve_class(factory, &base(), &|_: &PluginExport| true, &logger, "odd").unwrap_err();
    assert!(err.to_string().contains("cannot be constructed"));
}

#[test]
fn test_resolved_class_debug() {
    let (_recorder, logger) = recording_logger();
    let class = resolve_class(reporting_class("ManualPlugin", None), &base(), &NamedClassShape, &logger, "manual").unwrap();
    let rendered = format!("{:?}", class);
    assert!(rendered.contains("PluginClass"));
    assert!(rendered.contains("ManualPlugin"));
}

#[test]
fn test_fallback_warning_names_candidate_and_error() {
    let (recorder, logger) = recording_logger();
    resolve_class(anonymous_class(None), &base(), &NamedClassShape, &logger, "anon").unwrap();

    let warnings: Vec<String> = recorder
        .entries()
        .into_iter()
        .filter(|(level, _)| *level == Level::Warn)
        .map(|(_, message)| message)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(
        warnings[0].contains("\"Class constructor class <anonymous> cannot be invoked without being constructed\""),
        "{}",
        warnings[0]
    );
}
