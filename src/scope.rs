use indexmap::IndexSet;
use oxc_ast_visit::Visit;
use oxc_syntax::scope::ScopeFlags;
use std::collections::HashSet;

lazy_static::lazy_static! {
    /// Identifiers provided by the host environment. A statement may read
    /// these without any module defining or importing them.
    pub static ref HOST_GLOBALS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("console");
        s.insert("globalThis");
        s.insert("window");
        s.insert("document");
        s.insert("Math");
        s.insert("JSON");
        s.insert("Date");
        s.insert("String");
        s.insert("Number");
        s.insert("Boolean");
        s.insert("Symbol");
        s.insert("BigInt");
        s.insert("Array");
        s.insert("Object");
        s.insert("Function");
        s.insert("RegExp");
        s.insert("Promise");
        s.insert("Proxy");
        s.insert("Reflect");
        s.insert("Map");
        s.insert("Set");
        s.insert("WeakMap");
        s.insert("WeakSet");
        s.insert("Error");
        s.insert("TypeError");
        s.insert("RangeError");
        s.insert("undefined");
        s.insert("NaN");
        s.insert("Infinity");
        s.insert("parseInt");
        s.insert("parseFloat");
        s.insert("isNaN");
        s.insert("isFinite");
        s.insert("setTimeout");
        s.insert("clearTimeout");
        s.insert("setInterval");
        s.insert("clearInterval");
        s.insert("self");
        s.insert("Intl");
        s.insert("encodeURI");
        s.insert("decodeURI");
        s.insert("encodeURIComponent");
        s.insert("decodeURIComponent");
        s.insert("queueMicrotask");
        s.insert("structuredClone");
        s.insert("ArrayBuffer");
        s.insert("DataView");
        s.insert("Int8Array");
        s.insert("Uint8Array");
        s.insert("Uint8ClampedArray");
        s.insert("Int16Array");
        s.insert("Uint16Array");
        s.insert("Int32Array");
        s.insert("Uint32Array");
        s.insert("Float32Array");
        s.insert("Float64Array");
        s.insert("BigInt64Array");
        s.insert("BigUint64Array");
        s
    };
}

/// Index of a [`Scope`] inside its [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// A lexical scope: the names bound directly in it plus a link to the
/// enclosing scope. Only the module scope has no parent.
#[derive(Debug)]
pub struct Scope {
    pub name: Option<String>,
    pub names: IndexSet<String>,
    pub parent: Option<ScopeId>,
    pub is_block: bool,
}

/// Arena of every scope created while analysing one module.
///
/// Scopes are never removed; "leaving" a scope only moves the analyzer's
/// cursor back to the parent. Keeping them alive lets reads be resolved
/// after the whole statement has been walked, so hoisted declarations
/// further down a function body are still found.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub fn new(module_name: &str) -> Self {
        Self {
            scopes: vec![Scope {
                name: Some(module_name.to_string()),
                names: IndexSet::new(),
                parent: None,
                is_block: false,
            }],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn is_root(&self, id: ScopeId) -> bool {
        self.scopes[id.0].parent.is_none()
    }

    pub fn push(
        &mut self,
        parent: ScopeId,
        name: Option<String>,
        names: impl IntoIterator<Item = String>,
        is_block: bool,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            name,
            names: names.into_iter().collect(),
            parent: Some(parent),
            is_block,
        });
        id
    }

    /// Binds `name` and returns the scope it landed in. Non-block
    /// declarations (`var`, function declarations) skip over block scopes
    /// to the nearest function or module scope.
    pub fn add(&mut self, scope: ScopeId, name: &str, is_block_declaration: bool) -> ScopeId {
        let mut target = scope;
        while !is_block_declaration && self.scopes[target.0].is_block {
            match self.scopes[target.0].parent {
                Some(parent) => target = parent,
                None => break,
            }
        }
        self.scopes[target.0].names.insert(name.to_string());
        target
    }

    pub fn find_defining_scope(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.0];
            if scope.names.contains(name) {
                return Some(id);
            }
            current = scope.parent;
        }
        None
    }

    /// True when `name`, seen from `scope`, refers to a module-level or
    /// unbound identifier rather than a parameter or local.
    pub fn is_free_at_module_level(&self, scope: ScopeId, name: &str) -> bool {
        match self.find_defining_scope(scope, name) {
            Some(id) => self.is_root(id),
            None => true,
        }
    }
}

/// Collects every name bound by a pattern or parameter list.
pub struct BindingCollector<'a> {
    pub symbols: &'a mut Vec<String>,
}

impl<'a, 'b> Visit<'b> for BindingCollector<'a> {
    fn visit_binding_identifier(&mut self, ident: &oxc_ast::ast::BindingIdentifier<'b>) {
        self.symbols.push(ident.name.to_string());
    }

    // Default values may contain functions; their parameters are not ours.
    fn visit_function(&mut self, _func: &oxc_ast::ast::Function<'b>, _flags: ScopeFlags) {}

    fn visit_arrow_function_expression(
        &mut self,
        _func: &oxc_ast::ast::ArrowFunctionExpression<'b>,
    ) {
    }
}
