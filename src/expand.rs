//! Statement closure ("tree shaking").
//!
//! Starting from the entry module's root statements, every statement pulls
//! in the statements defining what it reads, then itself, then the later
//! statements that modify what it defines. The `included` flag is the only
//! cycle guard: a statement that is already included contributes nothing,
//! wherever it is requested again. The resulting order is discovery order.

use tracing::trace;

use crate::bundle::Bundle;
use crate::error::{line_column, BundleError, ErrorKind};
use crate::module::{ModuleId, StatementId};

impl Bundle {
    /// Expands every root statement of `module` in source order. Imports,
    /// bare variable declarations and ignored unsupported statements are not
    /// roots.
    pub fn expand_all_statements(
        &mut self,
        module: ModuleId,
    ) -> Result<Vec<StatementId>, BundleError> {
        let mut all = Vec::new();
        for index in 0..self.modules[module.0].statements.len() {
            let id = StatementId { module, index };
            if self.statement(id).is_closure_root() {
                all.extend(self.expand_statement(id)?);
            }
        }
        Ok(all)
    }

    /// Marks `id` included and returns it together with everything it needs:
    /// the definitions of what it reads first, its modifications after.
    pub fn expand_statement(&mut self, id: StatementId) -> Result<Vec<StatementId>, BundleError> {
        let statement = self.statement_mut(id);
        if statement.included {
            return Ok(Vec::new());
        }
        statement.included = true;

        let depends_on: Vec<String> = statement.depends_on.iter().cloned().collect();
        let defines: Vec<String> = statement.defines.iter().cloned().collect();

        let mut result = Vec::new();
        for name in &depends_on {
            result.extend(self.define_for(id.module, name, Some(id))?);
        }

        result.push(id);

        for name in &defines {
            let modifications = self.modules[id.module.0]
                .modifications
                .get(name)
                .cloned()
                .unwrap_or_default();
            for index in modifications {
                let modification = StatementId {
                    module: id.module,
                    index,
                };
                if !self.statement(modification).included {
                    result.extend(self.expand_statement(modification)?);
                }
            }
        }

        trace!(
            module = %self.modules[id.module.0].display_path(),
            index = id.index,
            pulled = result.len(),
            "expanded statement"
        );
        Ok(result)
    }

    /// Resolves the top-level `name` of `module` to the statements that must
    /// be emitted for it to be valid. Imported names are followed to the
    /// exporting module.
    pub fn define(&mut self, module: ModuleId, name: &str) -> Result<Vec<StatementId>, BundleError> {
        self.define_for(module, name, None)
    }

    fn define_for(
        &mut self,
        module: ModuleId,
        name: &str,
        reader: Option<StatementId>,
    ) -> Result<Vec<StatementId>, BundleError> {
        if let Some(entry) = self.modules[module.0].imports.get(name).cloned() {
            let imported = self.fetch_module(&entry.source, Some(module))?;
            let local = match self.modules[imported.0].exports.get(&entry.imported) {
                Some(local) => local.clone(),
                None => {
                    return Err(BundleError::with_details(
                        ErrorKind::MissingExport,
                        &format!(
                            "'{}' does not export '{}'.",
                            self.modules[imported.0].display_path(),
                            entry.imported
                        ),
                        &self.modules[module.0].display_path(),
                        0,
                        0,
                        Some(entry.source.clone()),
                        vec![],
                    ));
                }
            };
            trace!(
                name,
                imported = %entry.imported,
                from = %self.modules[imported.0].display_path(),
                "following import"
            );
            return self.define(imported, &local);
        }

        if let Some(&index) = self.modules[module.0].definitions.get(name) {
            return self.expand_statement(StatementId { module, index });
        }

        if self.is_host_global(name) {
            return Ok(Vec::new());
        }

        let m = &self.modules[module.0];
        let (line, column) = match reader {
            Some(reader) => line_column(&m.code, self.statement(reader).start),
            None => (0, 0),
        };
        Err(BundleError::unresolved_reference(
            name,
            &m.display_path(),
            line,
            column,
        ))
    }
}
