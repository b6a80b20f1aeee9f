use serde::{Deserialize, Serialize};

use crate::error::{BundleError, ErrorKind};

/// What to do with import/export forms outside the supported subset
/// (default and namespace imports, `export default`, re-exports and
/// export lists).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnsupportedSyntaxPolicy {
    /// Fail the build.
    #[default]
    Reject,
    /// Warn and leave the statement out of the bundle.
    Ignore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualModule {
    pub id: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOptions {
    pub entry: String,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Host identifiers accepted in addition to the built-in globals.
    #[serde(default)]
    pub globals: Vec<String>,
    #[serde(default)]
    pub unsupported_syntax: UnsupportedSyntaxPolicy,
    /// When non-empty, modules are served from here instead of the disk.
    #[serde(default)]
    pub virtual_modules: Vec<VirtualModule>,
}

fn default_extension() -> String {
    ".js".to_string()
}

fn default_separator() -> String {
    "\n".to_string()
}

impl BundleOptions {
    pub fn new(entry: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            extension: default_extension(),
            separator: default_separator(),
            globals: Vec::new(),
            unsupported_syntax: UnsupportedSyntaxPolicy::default(),
            virtual_modules: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, BundleError> {
        serde_json::from_str(json).map_err(|e| {
            BundleError::at_file(
                ErrorKind::InvalidOptions,
                &format!("Invalid bundle options: {}", e),
                "<options>",
            )
        })
    }

    pub fn with_globals<I, S>(mut self, globals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.globals.extend(globals.into_iter().map(Into::into));
        self
    }

    pub fn with_unsupported_syntax(mut self, policy: UnsupportedSyntaxPolicy) -> Self {
        self.unsupported_syntax = policy;
        self
    }

    /// The entry path with the module extension appended when missing.
    pub fn entry_path(&self) -> String {
        if self.extension.is_empty() || self.entry.ends_with(&self.extension) {
            self.entry.clone()
        } else {
            format!("{}{}", self.entry, self.extension)
        }
    }
}
