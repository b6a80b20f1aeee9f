//! Statement analysis for one module.
//!
//! Pass 1 classifies every top-level statement and fills the module's
//! import and export tables. Pass 2 walks each statement with a live scope
//! stack and records what it reads (`depends_on`), which top-level names it
//! introduces (`defines`) and which it reassigns (`modifies`).
//!
//! Reads and writes are remembered together with the scope they occurred
//! in and only resolved once the statement has been fully walked. Anything
//! bound by a parameter, local or loop variable is dropped at that point;
//! what remains is either a top-level name of this module or something
//! that must be imported or provided by the host.

use indexmap::IndexMap;
use oxc_ast::ast::{
    ArrowFunctionExpression, AssignmentExpression, AssignmentTarget, BindingIdentifier,
    BlockStatement, CatchClause, Class, Declaration, Expression, ForInStatement, ForOfStatement,
    ForStatement, Function, IdentifierReference, ImportDeclarationSpecifier, ModuleExportName,
    Program, SimpleAssignmentTarget, Statement, StaticBlock, SwitchStatement, UpdateExpression,
    VariableDeclaration, VariableDeclarationKind,
};
use oxc_ast_visit::{walk, Visit};
use oxc_span::GetSpan;
use oxc_syntax::scope::ScopeFlags;
use std::collections::HashMap;
use tracing::{trace, warn};

use crate::config::UnsupportedSyntaxPolicy;
use crate::error::{line_column, BundleError, ErrorKind};
use crate::module::{ImportEntry, ModuleId, StatementInfo, StatementKind};
use crate::scope::{BindingCollector, ScopeId, ScopeTree};
use crate::source::SourceSpan;

#[derive(Debug, Default)]
pub struct ModuleAnalysis {
    pub statements: Vec<StatementInfo>,
    pub imports: IndexMap<String, ImportEntry>,
    pub exports: IndexMap<String, String>,
    pub definitions: HashMap<String, usize>,
    pub modifications: HashMap<String, Vec<usize>>,
}

pub fn analyse(
    program: &Program<'_>,
    code: &SourceSpan,
    module: ModuleId,
    file: &str,
    policy: UnsupportedSyntaxPolicy,
) -> Result<ModuleAnalysis, BundleError> {
    let mut analysis = ModuleAnalysis::default();

    // Pass 1: imports and exports.
    for stmt in program.body.iter() {
        let span = stmt.span();
        let kind = match classify(stmt, &mut analysis) {
            Ok(kind) => kind,
            Err(unsupported) => {
                let (line, column) = line_column(code.original(), span.start);
                let error = unsupported.into_error(file, line, column);
                match policy {
                    UnsupportedSyntaxPolicy::Reject => return Err(error),
                    UnsupportedSyntaxPolicy::Ignore => {
                        warn!(file, line, column, "{}", error.message);
                        StatementKind::Unsupported
                    }
                }
            }
        };
        analysis
            .statements
            .push(StatementInfo::new(kind, module, code.snip(span.start, span.end)));
    }

    // Pass 2: scopes, reads, definitions and modifications.
    let mut scopes = ScopeTree::new(file);
    for (index, stmt) in program.body.iter().enumerate() {
        if analysis.statements[index].kind == StatementKind::Unsupported {
            continue;
        }

        let root = scopes.root();
        let mut analyzer = StatementAnalyzer {
            scopes: &mut scopes,
            stack: vec![root],
            reads: Vec::new(),
            writes: Vec::new(),
            defines: Vec::new(),
        };
        analyzer.visit_statement(stmt);
        let StatementAnalyzer {
            reads,
            writes,
            defines,
            ..
        } = analyzer;

        let info = &mut analysis.statements[index];
        for (name, scope) in reads {
            if scopes.is_free_at_module_level(scope, &name) {
                info.depends_on.insert(name);
            }
        }
        for name in defines {
            analysis.definitions.insert(name.clone(), index);
            info.defines.insert(name);
        }
        for (name, scope) in writes {
            if !scopes.is_free_at_module_level(scope, &name) {
                continue;
            }
            let statements = analysis.modifications.entry(name.clone()).or_default();
            if statements.last() != Some(&index) {
                statements.push(index);
            }
            info.modifies.insert(name);
        }

        trace!(
            file,
            index,
            depends_on = ?info.depends_on,
            defines = ?info.defines,
            modifies = ?info.modifies,
            "analysed statement"
        );
    }

    Ok(analysis)
}

enum Unsupported {
    Import(&'static str),
    Export(&'static str),
}

impl Unsupported {
    fn into_error(self, file: &str, line: u32, column: u32) -> BundleError {
        match self {
            Unsupported::Import(what) => BundleError::new(
                ErrorKind::UnsupportedImportShape,
                &format!("{} are not supported.", what),
                file,
                line,
                column,
            ),
            Unsupported::Export(what) => BundleError::new(
                ErrorKind::UnsupportedExportShape,
                &format!("{} are not supported.", what),
                file,
                line,
                column,
            ),
        }
    }
}

fn classify(
    stmt: &Statement<'_>,
    analysis: &mut ModuleAnalysis,
) -> Result<StatementKind, Unsupported> {
    match stmt {
        Statement::ImportDeclaration(decl) => {
            let source = decl.source.value.to_string();
            let mut entries = Vec::new();
            for specifier in decl.specifiers.iter().flatten() {
                match specifier {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => {
                        let entry = ImportEntry {
                            source: source.clone(),
                            imported: module_export_name(&s.imported),
                        };
                        entries.push((s.local.name.to_string(), entry));
                    }
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(_) => {
                        return Err(Unsupported::Import("Default imports"));
                    }
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => {
                        return Err(Unsupported::Import("Namespace imports"));
                    }
                }
            }
            analysis.imports.extend(entries);
            Ok(StatementKind::Import)
        }
        Statement::ExportNamedDeclaration(decl) => {
            if decl.source.is_some() {
                return Err(Unsupported::Export("Re-exports"));
            }
            let declaration = match &decl.declaration {
                Some(declaration) => declaration,
                None => return Err(Unsupported::Export("Export lists")),
            };
            let names = match declaration {
                Declaration::VariableDeclaration(var) => {
                    let mut names = Vec::new();
                    let mut collector = BindingCollector { symbols: &mut names };
                    for declarator in &var.declarations {
                        collector.visit_binding_pattern(&declarator.id);
                    }
                    names
                }
                Declaration::FunctionDeclaration(func) => {
                    func.id.iter().map(|id| id.name.to_string()).collect()
                }
                Declaration::ClassDeclaration(class) => {
                    class.id.iter().map(|id| id.name.to_string()).collect()
                }
                _ => return Err(Unsupported::Export("Type-only exports")),
            };
            for name in names {
                analysis.exports.insert(name.clone(), name);
            }
            Ok(StatementKind::ExportDeclaration {
                declaration_start: declaration.span().start,
            })
        }
        Statement::ExportDefaultDeclaration(_) => Err(Unsupported::Export("Default exports")),
        Statement::ExportAllDeclaration(_) => Err(Unsupported::Export("Namespace re-exports")),
        Statement::VariableDeclaration(_) => Ok(StatementKind::VariableDeclaration),
        _ => Ok(StatementKind::Other),
    }
}

fn module_export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.to_string(),
        ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        ModuleExportName::StringLiteral(s) => s.value.to_string(),
    }
}

/// Root identifier of a member chain: `a` for `a.b[c].d`.
fn expression_root(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::Identifier(id) => Some(id.name.to_string()),
        Expression::StaticMemberExpression(member) => expression_root(&member.object),
        Expression::ComputedMemberExpression(member) => expression_root(&member.object),
        Expression::ParenthesizedExpression(paren) => expression_root(&paren.expression),
        _ => None,
    }
}

fn assignment_target_root(target: &AssignmentTarget<'_>) -> Option<String> {
    match target {
        AssignmentTarget::AssignmentTargetIdentifier(id) => Some(id.name.to_string()),
        AssignmentTarget::StaticMemberExpression(member) => expression_root(&member.object),
        AssignmentTarget::ComputedMemberExpression(member) => expression_root(&member.object),
        _ => None,
    }
}

fn simple_target_root(target: &SimpleAssignmentTarget<'_>) -> Option<String> {
    match target {
        SimpleAssignmentTarget::AssignmentTargetIdentifier(id) => Some(id.name.to_string()),
        SimpleAssignmentTarget::StaticMemberExpression(member) => expression_root(&member.object),
        SimpleAssignmentTarget::ComputedMemberExpression(member) => {
            expression_root(&member.object)
        }
        _ => None,
    }
}

/// Walks one top-level statement. `stack` holds the scopes entered so far;
/// its last element is the current scope.
struct StatementAnalyzer<'s> {
    scopes: &'s mut ScopeTree,
    stack: Vec<ScopeId>,
    reads: Vec<(String, ScopeId)>,
    writes: Vec<(String, ScopeId)>,
    defines: Vec<String>,
}

impl StatementAnalyzer<'_> {
    fn current(&self) -> ScopeId {
        self.stack
            .last()
            .copied()
            .unwrap_or_else(|| self.scopes.root())
    }

    fn declare(&mut self, name: &str, is_block_declaration: bool) {
        let landed = self.scopes.add(self.current(), name, is_block_declaration);
        if self.scopes.is_root(landed) {
            self.defines.push(name.to_string());
        }
    }

    fn push_scope(&mut self, name: Option<String>, names: Vec<String>, is_block: bool) {
        let scope = self.scopes.push(self.current(), name, names, is_block);
        self.stack.push(scope);
    }

    fn pop_scope(&mut self) {
        self.stack.pop();
    }
}

impl<'a> Visit<'a> for StatementAnalyzer<'_> {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        self.reads.push((ident.name.to_string(), self.current()));
    }

    // Declaration targets count as reads too; a top-level declaration's own
    // name resolves to itself and is already included when it is looked up.
    fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
        self.reads.push((ident.name.to_string(), self.current()));
    }

    fn visit_assignment_expression(&mut self, expr: &AssignmentExpression<'a>) {
        if let Some(name) = assignment_target_root(&expr.left) {
            self.writes.push((name, self.current()));
        }
        walk::walk_assignment_expression(self, expr);
    }

    fn visit_update_expression(&mut self, expr: &UpdateExpression<'a>) {
        if let Some(name) = simple_target_root(&expr.argument) {
            self.writes.push((name, self.current()));
        }
        walk::walk_update_expression(self, expr);
    }

    fn visit_function(&mut self, func: &Function<'a>, flags: ScopeFlags) {
        let mut names = Vec::new();
        BindingCollector { symbols: &mut names }.visit_formal_parameters(&func.params);
        // Arrows are handled separately and inherit the outer `arguments`.
        names.push("arguments".to_string());

        let own_name = func.id.as_ref().map(|id| id.name.to_string());
        if let Some(name) = &own_name {
            if func.is_declaration() {
                self.declare(name, false);
            } else {
                names.push(name.clone());
            }
        }

        self.push_scope(own_name, names, false);
        walk::walk_function(self, func, flags);
        self.pop_scope();
    }

    fn visit_arrow_function_expression(&mut self, func: &ArrowFunctionExpression<'a>) {
        let mut names = Vec::new();
        BindingCollector { symbols: &mut names }.visit_formal_parameters(&func.params);

        self.push_scope(None, names, false);
        walk::walk_arrow_function_expression(self, func);
        self.pop_scope();
    }

    fn visit_class(&mut self, class: &Class<'a>) {
        let own_name = class.id.as_ref().map(|id| id.name.to_string());
        match &own_name {
            Some(name) if class.is_declaration() => {
                self.declare(name, true);
                walk::walk_class(self, class);
            }
            Some(name) => {
                self.push_scope(own_name.clone(), vec![name.clone()], true);
                walk::walk_class(self, class);
                self.pop_scope();
            }
            None => walk::walk_class(self, class),
        }
    }

    fn visit_variable_declaration(&mut self, decl: &VariableDeclaration<'a>) {
        let is_block_declaration = !matches!(decl.kind, VariableDeclarationKind::Var);
        let mut names = Vec::new();
        let mut collector = BindingCollector { symbols: &mut names };
        for declarator in &decl.declarations {
            collector.visit_binding_pattern(&declarator.id);
        }
        for name in &names {
            self.declare(name, is_block_declaration);
        }
        walk::walk_variable_declaration(self, decl);
    }

    fn visit_block_statement(&mut self, block: &BlockStatement<'a>) {
        self.push_scope(None, Vec::new(), true);
        walk::walk_block_statement(self, block);
        self.pop_scope();
    }

    fn visit_for_statement(&mut self, stmt: &ForStatement<'a>) {
        self.push_scope(None, Vec::new(), true);
        walk::walk_for_statement(self, stmt);
        self.pop_scope();
    }

    fn visit_for_in_statement(&mut self, stmt: &ForInStatement<'a>) {
        self.push_scope(None, Vec::new(), true);
        walk::walk_for_in_statement(self, stmt);
        self.pop_scope();
    }

    fn visit_for_of_statement(&mut self, stmt: &ForOfStatement<'a>) {
        self.push_scope(None, Vec::new(), true);
        walk::walk_for_of_statement(self, stmt);
        self.pop_scope();
    }

    // One block scope shared by every `case`; the discriminant is outside it.
    fn visit_switch_statement(&mut self, stmt: &SwitchStatement<'a>) {
        self.visit_expression(&stmt.discriminant);
        self.push_scope(None, Vec::new(), true);
        for case in &stmt.cases {
            self.visit_switch_case(case);
        }
        self.pop_scope();
    }

    // `var` inside a static block stays there, like in a function body.
    fn visit_static_block(&mut self, block: &StaticBlock<'a>) {
        self.push_scope(None, Vec::new(), false);
        walk::walk_static_block(self, block);
        self.pop_scope();
    }

    fn visit_catch_clause(&mut self, clause: &CatchClause<'a>) {
        let mut names = Vec::new();
        if let Some(param) = &clause.param {
            BindingCollector { symbols: &mut names }.visit_binding_pattern(&param.pattern);
        }
        self.push_scope(None, names, true);
        walk::walk_catch_clause(self, clause);
        self.pop_scope();
    }
}
