//! A plugin library reporting an ABI tag no host accepts. It exports no plugin.
use std::os::raw::c_char;

/// Tag this library reports
pub const STALE_ABI_TAG: &str = "hatch-core/0.0.0";

#[unsafe(no_mangle)]
pub extern "C-unwind" fn _hatch_plugin_abi() -> *const c_char {
    c"hatch-core/0.0.0".as_ptr()
}
