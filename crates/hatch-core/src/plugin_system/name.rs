use crate::plugin_system::error::PluginError;

/// Derive the canonical plugin name from its raw manifest name.
///
/// A non-empty `prefix` must lead `raw` byte for byte and is stripped. What
/// remains must be lowercase ASCII letters and digits only; no case folding is
/// applied.
pub fn derive_name(raw: &str, prefix: Option<&str>) -> Result<String, PluginError> {
    let stripped = match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => raw.strip_prefix(prefix).ok_or_else(|| {
            PluginError::name(format!(
                "plugin name \"{}\" does not start with the required prefix \"{}\"",
                raw, prefix
            ))
        })?,
        None => raw,
    };

    if !is_lower_alphanumeric(stripped) {
        return Err(PluginError::name(format!(
            "\"{}\" must contain only lowercase letters and digits",
            stripped
        )));
    }
    Ok(stripped.to_string())
}

fn is_lower_alphanumeric(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}
