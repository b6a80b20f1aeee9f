use indexmap::{IndexMap, IndexSet};
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::Parser;
use oxc_span::SourceType;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::analyse::analyse;
use crate::config::UnsupportedSyntaxPolicy;
use crate::error::{line_column, BundleError, ErrorKind};
use crate::source::SourceSpan;

/// Index of a module in the bundle's module table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub usize);

/// A top-level statement, addressed by its module and its position in
/// that module's body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatementId {
    pub module: ModuleId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Import,
    VariableDeclaration,
    /// `export <declaration>`; the `export` prefix ends where the
    /// declaration starts.
    ExportDeclaration { declaration_start: u32 },
    /// Import/export form outside the supported subset, kept out of the
    /// bundle.
    Unsupported,
    Other,
}

/// Analysis results for one top-level statement.
#[derive(Debug, Clone)]
pub struct StatementInfo {
    pub kind: StatementKind,
    pub module: ModuleId,
    pub start: u32,
    pub end: u32,
    pub included: bool,
    pub source: SourceSpan,
    /// Free names read anywhere in the statement, in first-seen order.
    pub depends_on: IndexSet<String>,
    /// Top-level names the statement introduces.
    pub defines: IndexSet<String>,
    /// Top-level names the statement reassigns.
    pub modifies: IndexSet<String>,
}

impl StatementInfo {
    pub fn new(kind: StatementKind, module: ModuleId, source: SourceSpan) -> Self {
        Self {
            kind,
            module,
            start: source.start(),
            end: source.end(),
            included: false,
            source,
            depends_on: IndexSet::new(),
            defines: IndexSet::new(),
            modifies: IndexSet::new(),
        }
    }

    /// Imports and bare variable declarations are only ever pulled in as
    /// dependencies; unsupported forms never are.
    pub fn is_closure_root(&self) -> bool {
        !matches!(
            self.kind,
            StatementKind::Import | StatementKind::VariableDeclaration | StatementKind::Unsupported
        )
    }
}

/// `import { imported as local } from 'source'`, keyed by `local`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub source: String,
    pub imported: String,
}

#[derive(Debug)]
pub struct Module {
    pub id: ModuleId,
    pub path: PathBuf,
    pub code: Arc<str>,
    pub hash: String,
    pub statements: Vec<StatementInfo>,
    pub imports: IndexMap<String, ImportEntry>,
    /// Exported name → local name.
    pub exports: IndexMap<String, String>,
    /// Top-level name → index of its defining statement.
    pub definitions: HashMap<String, usize>,
    /// Top-level name → indices of statements that modify it, in source order.
    pub modifications: HashMap<String, Vec<usize>>,
    pub renames: HashMap<String, String>,
}

impl Module {
    /// Parses and analyses `code`.
    pub fn new(
        id: ModuleId,
        path: PathBuf,
        code: String,
        policy: UnsupportedSyntaxPolicy,
    ) -> Result<Self, BundleError> {
        let code: Arc<str> = Arc::from(code);
        let hash = compute_hash(&code);
        let display_path = path.display().to_string();

        let analysis = {
            let allocator = Allocator::default();
            let program = parse_program(&allocator, &code, &display_path)?;
            analyse(
                &program,
                &SourceSpan::new(Arc::clone(&code)),
                id,
                &display_path,
                policy,
            )?
        };

        Ok(Module {
            id,
            path,
            code,
            hash,
            statements: analysis.statements,
            imports: analysis.imports,
            exports: analysis.exports,
            definitions: analysis.definitions,
            modifications: analysis.modifications,
            renames: HashMap::new(),
        })
    }

    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    pub fn rename(&mut self, name: &str, replacement: &str) {
        self.renames.insert(name.to_string(), replacement.to_string());
    }

    pub fn canonical_name<'n>(&'n self, name: &'n str) -> &'n str {
        self.renames.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn included_count(&self) -> usize {
        self.statements.iter().filter(|s| s.included).count()
    }
}

pub fn module_source_type() -> SourceType {
    SourceType::default().with_module(true)
}

/// Parses ES module source. The first parser diagnostic becomes the error.
pub fn parse_program<'a>(
    allocator: &'a Allocator,
    code: &'a str,
    file: &str,
) -> Result<Program<'a>, BundleError> {
    let ret = Parser::new(allocator, code, module_source_type()).parse();
    if let Some(error) = ret.errors.first() {
        let (line, column) = error
            .labels
            .as_ref()
            .and_then(|labels| labels.first())
            .map(|label| line_column(code, label.offset() as u32))
            .unwrap_or((0, 0));
        return Err(BundleError::with_details(
            ErrorKind::ParseFailure,
            &format!("Invalid module syntax: {}", error),
            file,
            line,
            column,
            None,
            ret.errors.iter().skip(1).map(|e| e.to_string()).collect(),
        ));
    }
    if ret.panicked {
        return Err(BundleError::at_file(
            ErrorKind::ParseFailure,
            "Parser aborted",
            file,
        ));
    }
    Ok(ret.program)
}

pub fn compute_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}
