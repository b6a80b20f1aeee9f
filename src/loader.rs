//! Module location and reading.
//!
//! The bundler never touches the file system directly; it asks a
//! [`ModuleLoader`] to turn an import specifier into a path and to read
//! that path. [`FsLoader`] is the real thing, [`MemoryLoader`] serves
//! virtual modules.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

pub trait ModuleLoader {
    /// Resolves `specifier` to the path used as the module's identity.
    /// Without an importer the specifier is the entry and is taken as is.
    fn resolve(&self, specifier: &str, importer: Option<&Path>, extension: &str) -> PathBuf {
        resolve_specifier(specifier, importer, extension)
    }

    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Joins a relative specifier onto the importer's directory and appends
/// `extension` when the specifier does not already end with it.
pub fn resolve_specifier(specifier: &str, importer: Option<&Path>, extension: &str) -> PathBuf {
    let importer = match importer {
        Some(importer) => importer,
        None => return normalize_path(Path::new(specifier)),
    };

    let with_extension = if extension.is_empty() || specifier.ends_with(extension) {
        specifier.to_string()
    } else {
        format!("{}{}", specifier, extension)
    };

    let path = Path::new(&with_extension);
    if path.is_absolute() {
        normalize_path(path)
    } else {
        let base = importer.parent().unwrap_or_else(|| Path::new(""));
        normalize_path(&base.join(path))
    }
}

/// Lexically folds `.` and `..` components. Unlike `fs::canonicalize` this
/// works for paths that only exist in a [`MemoryLoader`].
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl ModuleLoader for FsLoader {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Serves module sources from memory, keyed by normalized path.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, source: impl Into<String>) {
        self.files.insert(normalize_path(path.as_ref()), source.into());
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }
}

impl ModuleLoader for MemoryLoader {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no virtual module at {}", path.display()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_specifier_resolves_against_importer_dir() {
        let resolved = resolve_specifier("./lib/a", Some(Path::new("/src/main.js")), ".js");
        assert_eq!(resolved, PathBuf::from("/src/lib/a.js"));

        let resolved = resolve_specifier("../shared/b.js", Some(Path::new("/src/app/main.js")), ".js");
        assert_eq!(resolved, PathBuf::from("/src/shared/b.js"));
    }

    #[test]
    fn test_entry_specifier_is_taken_as_is() {
        let resolved = resolve_specifier("/src/./main.js", None, ".js");
        assert_eq!(resolved, PathBuf::from("/src/main.js"));
    }

    #[test]
    fn test_absolute_specifier_gets_extension() {
        let resolved = resolve_specifier("/lib/util", Some(Path::new("/src/main.js")), ".js");
        assert_eq!(resolved, PathBuf::from("/lib/util.js"));
    }

    #[test]
    fn test_normalize_keeps_leading_parent_dirs_of_relative_paths() {
        assert_eq!(normalize_path(Path::new("../a/./b/../c")), PathBuf::from("../a/c"));
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_memory_loader_reports_missing_files() {
        let loader = MemoryLoader::new().with_file("/src/./a.js", "export var a = 1;");
        assert!(loader.read(Path::new("/src/a.js")).is_ok());
        let err = loader.read(Path::new("/src/b.js")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
