use super::*;

use std::path::Path;

use hatch_core::plugin_system::{ShapeTest, NamedClassShape, StaticModules};
use hatch_core::{PluginError, PluginResolver, ResolverConfig};
use semver::Version;
use serde_json::json;

fn plugin_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

fn config(base_version: Version) -> ResolverConfig {
    ResolverConfig::new(BaseType::new("widget", base_version))
        .location(plugin_dir())
        .name_prefix("hatch-plugin-")
        .keyword("widget-plugin")
        .environment_version("widget-kit", "2.3.0")
        .module_loader(StaticModules::new().with(plugin_dir(), PluginExport::factory(greeter_for)))
}

#[test]
fn exported_symbol_yields_factory() {
    let export = unsafe { Box::from_raw(_hatch_plugin_export()) };
    assert_eq!(export.to_string(), "factory");
    assert!(!NamedClassShape.is_class(&export));
}

#[test]
fn factory_builds_class_for_base() {
    let export = greeter_for(&BaseType::new("widget", Version::new(1, 4, 0))).unwrap();
    assert_eq!(export.to_string(), "class widgetGreeter");
}

#[test]
fn factory_rejects_unsupported_base() {
    let err = greeter_for(&BaseType::new("widget", Version::new(2, 0, 0))).unwrap_err();
    assert!(err.to_string().contains("widget@2.0.0"));
}

#[test]
fn resolves_and_greets() {
    let resolver = PluginResolver::new(config(Version::new(1, 0, 0))).expect("greeter should resolve");
    assert_eq!(resolver.name(), PLUGIN_NAME);

    let instance = resolver.create(&[json!("Ada")]).unwrap();
    let greeter = instance.downcast_ref::<Greeter>().unwrap();
    assert_eq!(greeter.greeting(), "Hello Ada from a widget plugin");
}

#[test]
fn missing_peer_dependency_version_is_unconstrained() {
    let config = ResolverConfig::new(BaseType::new("widget", Version::new(1, 0, 0)))
        .location(plugin_dir())
        .name_prefix("hatch-plugin-")
        .module_loader(StaticModules::new().with(plugin_dir(), PluginExport::factory(greeter_for)));
    assert!(PluginResolver::new(config).is_ok());
}

#[test]
fn old_peer_dependency_is_rejected() {
    let err = PluginResolver::new(config(Version::new(1, 0, 0)).environment_version("widget-kit", "1.9.0")).unwrap_err();
    assert!(matches!(err, PluginError::Unsupported { .. }));
}

#[test]
fn unsupported_base_fails_resolution() {
    let err = PluginResolver::new(config(Version::new(2, 0, 0))).unwrap_err();
    assert!(matches!(err, PluginError::Resolution { .. }));
}
