use oxc_allocator::Allocator;
use oxc_ast_visit::Visit;
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

use crate::bundle::Bundle;
use crate::error::BundleError;
use crate::module::{parse_program, ModuleId, StatementId, StatementKind};
use crate::renamer::RenamerVisitor;
use crate::source::SourceBundle;

impl Bundle {
    /// Canonical names for the identifiers `id` reads or defines, limited to
    /// those that were actually renamed.
    ///
    /// Names are looked up in the statement's own module only. A local that
    /// is bound by an import keeps its name even when the binding it refers
    /// to was renamed in the exporting module.
    pub fn replacements_for(&self, id: StatementId) -> HashMap<String, String> {
        let statement = self.statement(id);
        let module = self.module(statement.module);
        statement
            .depends_on
            .iter()
            .chain(statement.defines.iter())
            .filter_map(|name| {
                let canonical = module.canonical_name(name);
                (canonical != name.as_str()).then(|| (name.clone(), canonical.to_string()))
            })
            .collect()
    }

    /// Renders the finalized statement list: colliding identifiers are
    /// rewritten, `export` prefixes stripped, statements joined with the
    /// configured separator.
    pub fn generate(&self) -> Result<String, BundleError> {
        let edits = self.collect_renames()?;

        let mut bundle = SourceBundle::new();
        for &id in &self.statements {
            let statement = self.statement(id);
            let mut source = statement.source.clone();
            if let StatementKind::ExportDeclaration { declaration_start } = statement.kind {
                source.remove(statement.start, declaration_start);
            }
            for (start, end, replacement) in edits.get(&id).into_iter().flatten() {
                source.overwrite(*start, *end, replacement);
            }
            bundle.add_source(source, &self.options.separator);
        }
        Ok(bundle.to_string())
    }

    /// Walks every statement that needs renaming. Each affected module is
    /// parsed once.
    fn collect_renames(&self) -> Result<HashMap<StatementId, Vec<(u32, u32, String)>>, BundleError> {
        let mut by_module: BTreeMap<ModuleId, Vec<(usize, HashMap<String, String>)>> =
            BTreeMap::new();
        for &id in &self.statements {
            let renames = self.replacements_for(id);
            if !renames.is_empty() {
                by_module
                    .entry(id.module)
                    .or_default()
                    .push((id.index, renames));
            }
        }

        let mut edits = HashMap::new();
        for (module_id, statements) in by_module {
            let module = self.module(module_id);
            let allocator = Allocator::default();
            let program = parse_program(&allocator, &module.code, &module.display_path())?;
            for (index, renames) in statements {
                let mut renamer = RenamerVisitor::new(renames);
                if let Some(statement) = program.body.get(index) {
                    renamer.visit_statement(statement);
                }
                trace!(
                    module = %module.display_path(),
                    index,
                    edits = renamer.replacements.len(),
                    "rewrote identifiers"
                );
                edits.insert(
                    StatementId {
                        module: module_id,
                        index,
                    },
                    renamer.replacements,
                );
            }
        }
        Ok(edits)
    }
}
