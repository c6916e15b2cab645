use std::collections::HashMap;
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use serde_json::Value;

use crate::plugin_system::error::{panic_message, LoaderError, PluginPanic};
use crate::plugin_system::manifest::{FsManifestLoader, ManifestLoader};
use crate::plugin_system::traits::PluginExport;

/// Symbol returning the plugin's boxed [`PluginExport`]
pub const EXPORT_SYMBOL: &str = "_hatch_plugin_export";
/// Symbol returning the ABI tag the plugin was built against
pub const ABI_SYMBOL: &str = "_hatch_plugin_abi";
/// Host ABI tag, NUL-terminated; plugins must report the same one
pub const ABI_TAG: &str = concat!("hatch-core/", env!("CARGO_PKG_VERSION"), "\0");

type ExportFn = unsafe extern "C-unwind" fn() -> *mut PluginExport;
type AbiFn = unsafe extern "C-unwind" fn() -> *const c_char;

/// Emit the symbols [`DylibLoader`] looks for.
///
/// ```ignore
/// hatch_core::declare_plugin!(hatch_core::PluginExport::class(MyClass));
/// ```
#[macro_export]
macro_rules! declare_plugin {
    ($export:expr) => {
        #[unsafe(no_mangle)]
        pub extern "C-unwind" fn _hatch_plugin_abi() -> *const ::std::os::raw::c_char {
            $crate::plugin_system::loader::ABI_TAG.as_ptr() as *const ::std::os::raw::c_char
        }

        #[unsafe(no_mangle)]
        #[allow(improper_ctypes_definitions)]
        pub extern "C-unwind" fn _hatch_plugin_export() -> *mut $crate::plugin_system::traits::PluginExport {
            let export: $crate::plugin_system::traits::PluginExport = $export;
            ::std::boxed::Box::into_raw(::std::boxed::Box::new(export))
        }
    };
}

/// Loads the value a plugin module exports.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, location: &Path) -> Result<PluginExport, LoaderError>;
}

/// In-process table of statically linked plugin modules
#[derive(Clone, Default)]
pub struct StaticModules {
    modules: HashMap<PathBuf, PluginExport>,
}

impl StaticModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `export` under `location`
    pub fn register<P: AsRef<Path>>(&mut self, location: P, export: PluginExport) -> &mut Self {
        self.modules.insert(normalize(location.as_ref()), export);
        self
    }

    /// Builder-style [`register`](Self::register)
    pub fn with<P: AsRef<Path>>(mut self, location: P, export: PluginExport) -> Self {
        self.register(location, export);
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleLoader for StaticModules {
    fn load(&self, location: &Path) -> Result<PluginExport, LoaderError> {
        self.modules
            .get(&normalize(location))
            .cloned()
            .ok_or_else(|| LoaderError::UnknownModule {
                path: location.to_path_buf(),
            })
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

/// Loads plugin exports from dynamic libraries.
///
/// A directory location is resolved through its manifest: `main` names the
/// library relative to the directory, otherwise the platform library name is
/// derived from `name`. Opened libraries stay mapped for the rest of the
/// process, since exports and the instances they build run library code.
#[derive(Clone, Default)]
pub struct DylibLoader<M = FsManifestLoader> {
    manifests: M,
}

impl DylibLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: ManifestLoader> DylibLoader<M> {
    /// Use a custom manifest reader for directory locations
    pub fn with_manifest_loader(manifests: M) -> Self {
        Self { manifests }
    }

    /// The library file a location refers to
    pub fn library_path(&self, location: &Path) -> Result<PathBuf, LoaderError> {
        if !location.is_dir() {
            return Ok(location.to_path_buf());
        }

        let manifest = self.manifests.load(location)?;
        if let Some(main) = manifest.get("main").and_then(Value::as_str) {
            if main.contains("..") || Path::new(main).is_absolute() {
                return Err(LoaderError::EntryPoint {
                    path: location.to_path_buf(),
                    message: format!("entry '{}' must be relative and not traverse upwards", main),
                });
            }
            return Ok(location.join(main));
        }

        let name = manifest
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| LoaderError::EntryPoint {
                path: location.to_path_buf(),
                message: "manifest declares neither \"main\" nor \"name\"".to_string(),
            })?;
        Ok(location.join(library_file_name(name)))
    }

    fn open(&self, path: &Path) -> Result<PluginExport, LoaderError> {
        let library = unsafe { Library::new(path) }.map_err(|source| LoaderError::Library {
            path: path.to_path_buf(),
            source,
        })?;

        let abi_fn: AbiFn = {
            let symbol: Symbol<AbiFn> = unsafe { library.get(ABI_SYMBOL.as_bytes()) }
                .map_err(|source| missing_symbol(path, ABI_SYMBOL, source))?;
            *symbol
        };
        let found = panic::catch_unwind(|| unsafe { abi_fn() })
            .map_err(|payload| panicked(path, "reading the ABI tag", payload))?;
        let found = if found.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(found) }.to_string_lossy().into_owned()
        };
        let expected = ABI_TAG.trim_end_matches('\0');
        if found != expected {
            return Err(LoaderError::AbiMismatch {
                path: path.to_path_buf(),
                expected: expected.to_string(),
                found,
            });
        }

        let export_fn: ExportFn = {
            let symbol: Symbol<ExportFn> = unsafe { library.get(EXPORT_SYMBOL.as_bytes()) }
                .map_err(|source| missing_symbol(path, EXPORT_SYMBOL, source))?;
            *symbol
        };
        let export_ptr = panic::catch_unwind(|| unsafe { export_fn() })
            .map_err(|payload| panicked(path, "producing its export", payload))?;
        if export_ptr.is_null() {
            return Err(LoaderError::NullExport {
                path: path.to_path_buf(),
            });
        }
        let export = unsafe { *Box::from_raw(export_ptr) };

        log::debug!("Loaded plugin library {}", path.display());
        std::mem::forget(library);
        Ok(export)
    }
}

impl<M: ManifestLoader> ModuleLoader for DylibLoader<M> {
    fn load(&self, location: &Path) -> Result<PluginExport, LoaderError> {
        let path = self.library_path(location)?;
        self.open(&path)
    }
}

/// Platform library file name for a manifest name, e.g. `libmy_plugin.so`.
pub fn library_file_name(name: &str) -> String {
    // Scoped names ("@scope/plugin") keep only the last segment
    let stem = name.rsplit('/').next().unwrap_or(name).replace('-', "_");
    format!("{}{}{}", DLL_PREFIX, stem, DLL_SUFFIX)
}

fn missing_symbol(path: &Path, symbol: &str, source: libloading::Error) -> LoaderError {
    LoaderError::MissingSymbol {
        path: path.to_path_buf(),
        symbol: symbol.to_string(),
        source,
    }
}

fn panicked(path: &Path, operation: &str, payload: Box<dyn std::any::Any + Send>) -> LoaderError {
    LoaderError::Panicked {
        path: path.to_path_buf(),
        source: PluginPanic {
            operation: operation.to_string(),
            message: panic_message(payload),
        },
    }
}
