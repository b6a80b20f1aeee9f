use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_UNRESOLVED_REFERENCE: &str = "B-ERR-SCOPE-001";
pub const ERR_UNSUPPORTED_EXPORT: &str = "B-ERR-EXPORT-001";
pub const ERR_UNSUPPORTED_IMPORT: &str = "B-ERR-IMPORT-001";
pub const ERR_MISSING_EXPORT: &str = "B-ERR-IMPORT-002";
pub const ERR_MODULE_NOT_FOUND: &str = "B-ERR-RESOLVE-001";
pub const ERR_PARSE: &str = "B-ERR-SYNTAX-001";
pub const ERR_IO: &str = "B-ERR-IO-001";
pub const ERR_INVALID_OPTIONS: &str = "B-ERR-CONFIG-001";

/// Typed classification of a [`BundleError`], for callers that branch on
/// the failure instead of displaying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    UnresolvedReference,
    UnsupportedExportShape,
    UnsupportedImportShape,
    MissingExport,
    ModuleNotFound,
    ParseFailure,
    Io,
    InvalidOptions,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::UnresolvedReference => ERR_UNRESOLVED_REFERENCE,
            ErrorKind::UnsupportedExportShape => ERR_UNSUPPORTED_EXPORT,
            ErrorKind::UnsupportedImportShape => ERR_UNSUPPORTED_IMPORT,
            ErrorKind::MissingExport => ERR_MISSING_EXPORT,
            ErrorKind::ModuleNotFound => ERR_MODULE_NOT_FOUND,
            ErrorKind::ParseFailure => ERR_PARSE,
            ErrorKind::Io => ERR_IO,
            ErrorKind::InvalidOptions => ERR_INVALID_OPTIONS,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GUARANTEES
// ═══════════════════════════════════════════════════════════════════════════════

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_UNRESOLVED_REFERENCE => {
            "Every identifier in the bundle is imported, defined at top level, or a known host global."
        }
        ERR_UNSUPPORTED_EXPORT => {
            "Only `export var|let|const`, `export function` and `export class` declarations are bundled."
        }
        ERR_UNSUPPORTED_IMPORT => "Only named imports (`import { a as b } from '...'`) are bundled.",
        ERR_MISSING_EXPORT => "Every imported name is exported by the module it is imported from.",
        ERR_MODULE_NOT_FOUND => "Every imported module resolves to a readable file.",
        ERR_PARSE => "Every bundled module is syntactically valid ES module source.",
        ERR_IO => "Bundle output is written in full or not at all.",
        ERR_INVALID_OPTIONS => "Bundle options name an entry module.",
        _ => "Unknown guarantee.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUNDLE ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleError {
    pub code: String,
    pub kind: ErrorKind,
    pub message: String,
    pub guarantee: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub context: Option<String>,
    pub hints: Vec<String>,
}

impl BundleError {
    pub fn new(kind: ErrorKind, message: &str, file: &str, line: u32, column: u32) -> Self {
        Self::with_details(kind, message, file, line, column, None, vec![])
    }

    pub fn with_details(
        kind: ErrorKind,
        message: &str,
        file: &str,
        line: u32,
        column: u32,
        context: Option<String>,
        hints: Vec<String>,
    ) -> Self {
        let code = kind.code();
        BundleError {
            code: code.to_string(),
            kind,
            message: message.to_string(),
            guarantee: get_guarantee(code).to_string(),
            file: file.to_string(),
            line,
            column,
            context,
            hints,
        }
    }

    /// Error raised before any position inside `file` is known.
    pub fn at_file(kind: ErrorKind, message: &str, file: &str) -> Self {
        Self::new(kind, message, file, 0, 0)
    }

    pub fn unresolved_reference(name: &str, file: &str, line: u32, column: u32) -> Self {
        Self::with_details(
            ErrorKind::UnresolvedReference,
            &format!(
                "'{}' is neither imported nor defined at the top level of this module.",
                name
            ),
            file,
            line,
            column,
            Some(name.to_string()),
            vec![
                format!("Import '{}' from the module that exports it.", name),
                "Host globals can be allowed with the `globals` option.".to_string(),
            ],
        )
    }

    pub fn module_not_found(path: &str, importer: Option<&str>, cause: &str) -> Self {
        let message = match importer {
            Some(importer) => format!("Cannot read '{}' (imported by '{}'): {}", path, importer, cause),
            None => format!("Cannot read entry module '{}': {}", path, cause),
        };
        Self::with_details(
            ErrorKind::ModuleNotFound,
            &message,
            importer.unwrap_or(path),
            0,
            0,
            Some(path.to_string()),
            vec![],
        )
    }
}

impl fmt::Display for BundleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "[{}] {} ({}:{}:{})",
                self.code, self.message, self.file, self.line, self.column
            )
        } else {
            write!(f, "[{}] {} ({})", self.code, self.message, self.file)
        }
    }
}

impl std::error::Error for BundleError {}

/// 1-based line and column of a byte offset.
pub fn line_column(source: &str, offset: u32) -> (u32, u32) {
    let offset = (offset as usize).min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() as u32 + 1;
    let column = match before.rfind('\n') {
        Some(newline) => before[newline + 1..].chars().count() as u32 + 1,
        None => before.chars().count() as u32 + 1,
    };
    (line, column)
}
