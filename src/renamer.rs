use oxc_ast::ast::{BindingPattern, Expression};
use oxc_ast_visit::Visit;
use std::collections::HashMap;

/// Collects `(start, end, replacement)` edits for every identifier whose
/// name has a canonical replacement. Shorthand properties are expanded so
/// the property key survives the rename.
pub struct RenamerVisitor {
    pub renames: HashMap<String, String>,
    pub replacements: Vec<(u32, u32, String)>,
}

impl RenamerVisitor {
    pub fn new(renames: HashMap<String, String>) -> Self {
        RenamerVisitor {
            renames,
            replacements: Vec::new(),
        }
    }

    fn shorthand(&mut self, name: &str, start: u32, end: u32) -> bool {
        match self.renames.get(name) {
            Some(new_name) => {
                self.replacements.push((start, end, format!("{}: {}", name, new_name)));
                true
            }
            None => false,
        }
    }
}

impl<'a> Visit<'a> for RenamerVisitor {
    fn visit_identifier_reference(&mut self, ident: &oxc_ast::ast::IdentifierReference<'a>) {
        if let Some(new_name) = self.renames.get(ident.name.as_str()) {
            self.replacements
                .push((ident.span.start, ident.span.end, new_name.clone()));
        }
    }

    fn visit_binding_identifier(&mut self, ident: &oxc_ast::ast::BindingIdentifier<'a>) {
        if let Some(new_name) = self.renames.get(ident.name.as_str()) {
            self.replacements
                .push((ident.span.start, ident.span.end, new_name.clone()));
        }
    }

    // `{ age }` -> `{ age: age$1 }`
    fn visit_object_property(&mut self, prop: &oxc_ast::ast::ObjectProperty<'a>) {
        if prop.shorthand {
            if let Expression::Identifier(ident) = &prop.value {
                if self.shorthand(ident.name.as_str(), ident.span.start, ident.span.end) {
                    return;
                }
            }
        }
        oxc_ast_visit::walk::walk_object_property(self, prop);
    }

    // `const { age } = o` -> `const { age: age$1 } = o`
    fn visit_binding_property(&mut self, prop: &oxc_ast::ast::BindingProperty<'a>) {
        if prop.shorthand {
            match &prop.value {
                BindingPattern::BindingIdentifier(ident) => {
                    if self.shorthand(ident.name.as_str(), ident.span.start, ident.span.end) {
                        return;
                    }
                }
                BindingPattern::AssignmentPattern(pattern) => {
                    if let BindingPattern::BindingIdentifier(ident) = &pattern.left {
                        if self.shorthand(ident.name.as_str(), ident.span.start, ident.span.end) {
                            self.visit_expression(&pattern.right);
                            return;
                        }
                    }
                }
                _ => {}
            }
        }
        oxc_ast_visit::walk::walk_binding_property(self, prop);
    }

    // `({ age } = o)` -> `({ age: age$1 } = o)`
    fn visit_assignment_target_property_identifier(
        &mut self,
        prop: &oxc_ast::ast::AssignmentTargetPropertyIdentifier<'a>,
    ) {
        let binding = &prop.binding;
        if self.shorthand(binding.name.as_str(), binding.span.start, binding.span.end) {
            if let Some(init) = &prop.init {
                self.visit_expression(init);
            }
            return;
        }
        oxc_ast_visit::walk::walk_assignment_target_property_identifier(self, prop);
    }
}
