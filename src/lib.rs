//! # ES Module Bundler Core
//!
//! Bundles a flat ES-module program into one script, keeping only the
//! top-level statements reachable from the entry.
//!
//! ## Pipeline
//!
//! 1. **Fetch**: the entry is read and analysed. Imported modules are
//!    fetched lazily, the first time one of their names is needed, and
//!    cached by resolved path for the rest of the build.
//! 2. **Analyse**: every top-level statement records the free names it
//!    reads, the top-level names it defines and the ones it reassigns.
//! 3. **Expand**: the entry's root statements are expanded depth-first into
//!    the statement closure. Output order is discovery order.
//! 4. **Deconflict**: a top-level name defined in several modules keeps its
//!    name in the last module only; the others become `name$N`.
//! 5. **Emit**: each statement's source is cloned, renamed identifiers are
//!    overwritten, `export` prefixes are stripped, and the results are
//!    joined with the separator.
//!
//! ## Invariants
//!
//! 1. **Single inclusion**: a statement is included at most once and
//!    appears at most once in the output.
//! 2. **Definitions first**: a statement is preceded by the statements that
//!    define what it reads, and followed by later statements that modify
//!    what it defines.
//! 3. **No partial output**: every failure aborts the build before anything
//!    is written.
//! 4. **Resolution priority**: a name is resolved as
//!    1. an import of this module,
//!    2. a top-level definition of this module,
//!    3. a host global (built-in list plus `globals` option),
//!    4. otherwise `B-ERR-SCOPE-001`.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod analyse;
mod bundle;
mod config;
mod deconflict;
mod emit;
mod error;
mod expand;
mod loader;
pub mod logging;
mod module;
mod renamer;
mod scope;
mod source;

#[cfg(test)]
mod analyse_tests;
#[cfg(test)]
mod fs_tests;

pub use bundle::{bundle, Bundle, BundleOutput, ModuleReport, RenameRecord};
pub use config::{BundleOptions, UnsupportedSyntaxPolicy, VirtualModule};
pub use deconflict::{plan_renames, Rename};
pub use error::{BundleError, ErrorKind};
pub use loader::{normalize_path, resolve_specifier, FsLoader, MemoryLoader, ModuleLoader};
pub use logging::init_tracing;
pub use module::{ImportEntry, Module, ModuleId, StatementId, StatementInfo, StatementKind};
pub use scope::{Scope, ScopeId, ScopeTree, HOST_GLOBALS};
pub use source::{SourceBundle, SourceSpan};

#[cfg(feature = "napi")]
#[napi]
pub fn bundle_bridge() -> String {
    "Bundler Native Bridge Connected".to_string()
}

/// Node entry point. Takes [`BundleOptions`] as JSON and returns the
/// [`BundleOutput`] as JSON; a failed build rejects with the serialized
/// [`BundleError`].
#[cfg(feature = "napi")]
#[napi]
pub fn bundle_native(options: serde_json::Value) -> napi::Result<serde_json::Value> {
    init_tracing();

    let options: BundleOptions = serde_json::from_value(options)
        .map_err(|e| napi::Error::from_reason(format!("Invalid bundle options: {}", e)))?;
    let output = bundle(options).map_err(|e| {
        napi::Error::from_reason(serde_json::to_string(&e).unwrap_or_else(|_| e.to_string()))
    })?;
    serde_json::to_value(output).map_err(|e| napi::Error::from_reason(e.to_string()))
}
