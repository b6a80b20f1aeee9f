//! The module graph.
//!
//! A [`Bundle`] owns every module loaded for one build, keyed by resolved
//! path, and drives the pipeline: fetch the entry, expand its statement
//! closure (fetching imported modules on demand), deconflict colliding
//! top-level names, and emit the concatenated program.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::BundleOptions;
use crate::error::{BundleError, ErrorKind};
use crate::loader::{normalize_path, FsLoader, MemoryLoader, ModuleLoader};
use crate::module::{Module, ModuleId, StatementId, StatementInfo};
use crate::scope::HOST_GLOBALS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleReport {
    pub path: String,
    pub hash: String,
    pub statements: usize,
    pub included_statements: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRecord {
    pub module: String,
    pub original: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOutput {
    pub code: String,
    /// Every module that was loaded, in fetch order.
    pub modules: Vec<ModuleReport>,
    /// Rename decisions, in the order they were made.
    pub renames: Vec<RenameRecord>,
}

pub struct Bundle {
    pub(crate) options: BundleOptions,
    entry_path: PathBuf,
    loader: Box<dyn ModuleLoader>,
    globals: HashSet<String>,
    pub(crate) modules: Vec<Module>,
    cache: HashMap<PathBuf, ModuleId>,
    pub(crate) statements: Vec<StatementId>,
    pub(crate) renames: Vec<RenameRecord>,
    output: Option<BundleOutput>,
}

impl Bundle {
    /// Reads modules from `options.virtual_modules` when any are given,
    /// otherwise from the file system.
    pub fn new(options: BundleOptions) -> Self {
        if options.virtual_modules.is_empty() {
            let entry = PathBuf::from(options.entry_path());
            let entry = std::path::absolute(&entry).unwrap_or(entry);
            Self::with_entry(options, entry, Box::new(FsLoader))
        } else {
            let mut loader = MemoryLoader::new();
            for module in &options.virtual_modules {
                loader.insert(&module.id, module.code.clone());
            }
            let entry = PathBuf::from(options.entry_path());
            Self::with_entry(options, entry, Box::new(loader))
        }
    }

    pub fn with_loader(options: BundleOptions, loader: impl ModuleLoader + 'static) -> Self {
        let entry = PathBuf::from(options.entry_path());
        Self::with_entry(options, entry, Box::new(loader))
    }

    fn with_entry(options: BundleOptions, entry: PathBuf, loader: Box<dyn ModuleLoader>) -> Self {
        let globals = options.globals.iter().cloned().collect();
        Self {
            options,
            entry_path: normalize_path(&entry),
            loader,
            globals,
            modules: Vec::new(),
            cache: HashMap::new(),
            statements: Vec::new(),
            renames: Vec::new(),
            output: None,
        }
    }

    pub fn entry_path(&self) -> &Path {
        &self.entry_path
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module_by_path(&self, path: impl AsRef<Path>) -> Option<&Module> {
        self.cache
            .get(&normalize_path(path.as_ref()))
            .map(|id| &self.modules[id.0])
    }

    pub fn statement(&self, id: StatementId) -> &StatementInfo {
        &self.modules[id.module.0].statements[id.index]
    }

    pub(crate) fn statement_mut(&mut self, id: StatementId) -> &mut StatementInfo {
        &mut self.modules[id.module.0].statements[id.index]
    }

    /// The finalized statement list, in closure discovery order.
    pub fn statements(&self) -> &[StatementId] {
        &self.statements
    }

    pub fn is_host_global(&self, name: &str) -> bool {
        HOST_GLOBALS.contains(name) || self.globals.contains(name)
    }

    /// Returns the module for `specifier`, loading and analysing it on
    /// first use. `importer` is `None` only for the entry.
    pub fn fetch_module(
        &mut self,
        specifier: &str,
        importer: Option<ModuleId>,
    ) -> Result<ModuleId, BundleError> {
        let importer_path = importer.map(|id| self.modules[id.0].path.clone());
        let path = self
            .loader
            .resolve(specifier, importer_path.as_deref(), &self.options.extension);

        if let Some(&id) = self.cache.get(&path) {
            return Ok(id);
        }

        let code = self.loader.read(&path).map_err(|e| {
            let importer = importer_path.as_ref().map(|p| p.display().to_string());
            BundleError::module_not_found(
                &path.display().to_string(),
                importer.as_deref(),
                &e.to_string(),
            )
        })?;

        let id = ModuleId(self.modules.len());
        let module = Module::new(id, path.clone(), code, self.options.unsupported_syntax)?;
        debug!(
            path = %path.display(),
            statements = module.statements.len(),
            imports = module.imports.len(),
            exports = module.exports.len(),
            "fetched module"
        );
        self.modules.push(module);
        self.cache.insert(path, id);
        Ok(id)
    }

    /// Fetches the entry, computes its closure, deconflicts and emits. The
    /// text is only written to `sink` once all of that has succeeded.
    pub fn build(&mut self, sink: &mut dyn Write) -> Result<BundleOutput, BundleError> {
        let output = self.run()?;
        sink.write_all(output.code.as_bytes()).map_err(|e| {
            BundleError::at_file(
                ErrorKind::Io,
                &format!("Failed to write bundle: {}", e),
                &self.entry_path.display().to_string(),
            )
        })?;
        Ok(output)
    }

    /// Like [`Bundle::build`] without writing anywhere. Statements are
    /// included at most once per bundle, so later calls return the first
    /// result.
    pub fn run(&mut self) -> Result<BundleOutput, BundleError> {
        if let Some(output) = &self.output {
            return Ok(output.clone());
        }

        let entry = self.entry_path.display().to_string();
        let entry = self.fetch_module(&entry, None)?;

        self.statements = self.expand_all_statements(entry)?;
        self.deconflict();
        let code = self.generate()?;

        info!(
            entry = %self.entry_path.display(),
            modules = self.modules.len(),
            statements = self.statements.len(),
            renames = self.renames.len(),
            "bundle complete"
        );

        let output = BundleOutput {
            code,
            modules: self.module_reports(),
            renames: self.renames.clone(),
        };
        self.output = Some(output.clone());
        Ok(output)
    }

    fn module_reports(&self) -> Vec<ModuleReport> {
        self.modules
            .iter()
            .map(|module| ModuleReport {
                path: module.display_path(),
                hash: module.hash.clone(),
                statements: module.statements.len(),
                included_statements: module.included_count(),
            })
            .collect()
    }
}

/// Bundles `options.entry` into a single program.
pub fn bundle(options: BundleOptions) -> Result<BundleOutput, BundleError> {
    Bundle::new(options).run()
}
