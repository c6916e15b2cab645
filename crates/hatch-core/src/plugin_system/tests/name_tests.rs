// crates/hatch-core/src/plugin_system/tests/name_tests.rs
#![cfg(test)]

use crate::plugin_system::error::PluginError;
use crate::plugin_system::name::derive_name;

#[test]
fn test_prefix_is_stripped() {
    assert_eq!(derive_name("my-manualplugin", Some("my-")).unwrap(), "manualplugin");
    assert_eq!(derive_name("hatch-plugin-csv2", Some("hatch-plugin-")).unwrap(), "csv2");
}

#[test]
fn test_no_prefix_keeps_name() {
    assert_eq!(derive_name("manualplugin", None).unwrap(), "manualplugin");
    // An empty prefix is the same as none
    assert_eq!(derive_name("manualplugin", Some("")).unwrap(), "manualplugin");
}

#[test]
fn test_prefix_mismatch_cites_both_values() {
    let err = derive_name("my-manualplugin", Some("our-")).unwrap_err();
    assert!(matches!(err, PluginError::Name { .. }), "Expected Name error, got {:?}", err);
    let msg = err.to_string();
    assert!(msg.contains("our-"), "Message should mention the prefix: {}", msg);
    assert!(msg.contains("my-manualplugin"), "Message should mention the raw name: {}", msg);
}

#[test]
fn test_prefix_match_is_case_sensitive() {
    assert!(derive_name("My-plugin", Some("my-")).is_err());
}

#[test]
fn test_non_alphanumeric_names_are_rejected() {
    for raw in ["manual-plugin", "Manualplugin", "manual_plugin", "plugin!", "ünicode", " plugin"] {
        let err = derive_name(raw, None).unwrap_err();
        assert!(matches!(err, PluginError::Name { .. }), "'{}' should be rejected", raw);
        assert!(err.to_string().contains(raw), "Message should cite '{}': {}", raw, err);
    }
}

#[test]
fn test_remainder_is_checked_after_stripping() {
    let err = derive_name("my-Manual", Some("my-")).unwrap_err();
    assert!(err.to_string().contains("\"Manual\""));
}

#[test]
fn test_empty_remainder_is_rejected() {
    assert!(derive_name("my-", Some("my-")).is_err());
}

#[test]
fn test_digits_are_allowed() {
    assert_eq!(derive_name("plugin42", None).unwrap(), "plugin42");
    assert_eq!(derive_name("x-2024", Some("x-")).unwrap(), "2024");
}
