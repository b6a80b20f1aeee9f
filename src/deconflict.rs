use indexmap::IndexMap;
use tracing::debug;

use crate::bundle::{Bundle, RenameRecord};
use crate::module::ModuleId;

/// One rename decision: `module`'s top-level `original` becomes `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub module: ModuleId,
    pub original: String,
    pub replacement: String,
}

/// Given `(module, name)` definitions in final statement order, decides
/// which bindings are renamed. For a name defined by `k` distinct modules
/// the last one keeps it and the others become `name$k-1` down to `name$1`
/// in discovery order.
pub fn plan_renames<'n>(definitions: impl IntoIterator<Item = (ModuleId, &'n str)>) -> Vec<Rename> {
    let mut defined_by: IndexMap<&str, Vec<ModuleId>> = IndexMap::new();
    for (module, name) in definitions {
        let modules = defined_by.entry(name).or_default();
        if !modules.contains(&module) {
            modules.push(module);
        }
    }

    let mut renames = Vec::new();
    for (name, mut modules) in defined_by {
        if modules.len() < 2 {
            continue;
        }
        modules.pop();
        let count = modules.len();
        for (i, module) in modules.into_iter().enumerate() {
            renames.push(Rename {
                module,
                original: name.to_string(),
                replacement: format!("{}${}", name, count - i),
            });
        }
    }
    renames
}

impl Bundle {
    /// Renames top-level bindings that more than one module in the final
    /// statement list defines. Only `defines` is considered; a name that is
    /// merely modified in several modules is not a conflict.
    pub fn deconflict(&mut self) {
        let bundle: &Bundle = self;
        let renames = plan_renames(bundle.statements.iter().flat_map(move |&id| {
            let statement = bundle.statement(id);
            statement
                .defines
                .iter()
                .map(move |name| (statement.module, name.as_str()))
        }));

        for rename in renames {
            let module = &mut self.modules[rename.module.0];
            module.rename(&rename.original, &rename.replacement);
            debug!(
                module = %module.display_path(),
                original = %rename.original,
                replacement = %rename.replacement,
                "renamed conflicting binding"
            );
            self.renames.push(RenameRecord {
                module: module.display_path(),
                original: rename.original,
                replacement: rename.replacement,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_names_are_not_renamed() {
        let renames = plan_renames(vec![(ModuleId(0), "a"), (ModuleId(1), "b")]);
        assert!(renames.is_empty());
    }

    #[test]
    fn test_last_module_keeps_the_name() {
        let renames = plan_renames(vec![
            (ModuleId(2), "age"),
            (ModuleId(0), "age"),
            (ModuleId(1), "age"),
        ]);
        assert_eq!(
            renames,
            vec![
                Rename {
                    module: ModuleId(2),
                    original: "age".to_string(),
                    replacement: "age$2".to_string(),
                },
                Rename {
                    module: ModuleId(0),
                    original: "age".to_string(),
                    replacement: "age$1".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_repeated_definitions_in_one_module_count_once() {
        let renames = plan_renames(vec![
            (ModuleId(0), "x"),
            (ModuleId(0), "x"),
            (ModuleId(1), "x"),
        ]);
        assert_eq!(renames.len(), 1);
        assert_eq!(renames[0].module, ModuleId(0));
        assert_eq!(renames[0].replacement, "x$1");
    }

    #[test]
    fn test_k_colliding_modules_get_k_minus_one_renames() {
        let defs: Vec<(ModuleId, &str)> = (0..5).map(|i| (ModuleId(i), "n")).collect();
        let renames = plan_renames(defs);
        let suffixes: Vec<&str> = renames.iter().map(|r| r.replacement.as_str()).collect();
        assert_eq!(suffixes, vec!["n$4", "n$3", "n$2", "n$1"]);
    }
}
