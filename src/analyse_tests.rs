//! Per-statement analysis: what each top-level statement reads, defines and
//! modifies, and what the module imports and exports.

#[cfg(test)]
mod tests {
    use crate::config::UnsupportedSyntaxPolicy;
    use crate::error::ErrorKind;
    use crate::module::{ImportEntry, Module, ModuleId, StatementKind};
    use std::path::PathBuf;

    fn analyse(code: &str) -> Module {
        Module::new(
            ModuleId(0),
            PathBuf::from("/src/main.js"),
            code.to_string(),
            UnsupportedSyntaxPolicy::Reject,
        )
        .unwrap()
    }

    fn names(set: &indexmap::IndexSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // READS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_declaration_target_is_recorded_as_read() {
        let m = analyse("var age = 1;");
        let s = &m.statements[0];
        assert_eq!(names(&s.defines), vec!["age"]);
        assert_eq!(names(&s.depends_on), vec!["age"]);
    }

    #[test]
    fn test_property_names_are_not_reads() {
        let m = analyse("console.log(a.b, { c: d });");
        assert_eq!(names(&m.statements[0].depends_on), vec!["console", "a", "d"]);
    }

    #[test]
    fn test_parameters_and_locals_are_dropped() {
        let m = analyse("function f(x, { y }, [z] = []) { var w = x + y + z + outer; return w; }");
        let s = &m.statements[0];
        assert_eq!(names(&s.defines), vec!["f"]);
        assert_eq!(names(&s.depends_on), vec!["f", "outer"]);
    }

    #[test]
    fn test_named_function_expression_binds_inside_itself() {
        let m = analyse("var g = function h(n) { return n ? h(n - 1) : 0; };");
        let s = &m.statements[0];
        assert_eq!(names(&s.defines), vec!["g"]);
        assert_eq!(names(&s.depends_on), vec!["g"]);
    }

    #[test]
    fn test_arrow_and_catch_bindings_are_local() {
        let m = analyse("var sq = (n) => n * n;\ntry { run(); } catch (err) { report(err); }");
        assert_eq!(names(&m.statements[0].depends_on), vec!["sq"]);
        assert_eq!(names(&m.statements[1].depends_on), vec!["run", "report"]);
    }

    #[test]
    fn test_class_expression_name_is_local() {
        let m = analyse("var K = class Inner { m() { return Inner; } };");
        assert_eq!(names(&m.statements[0].depends_on), vec!["K"]);
        assert_eq!(names(&m.statements[0].defines), vec!["K"]);
    }

    #[test]
    fn test_hoisted_inner_declaration_is_local() {
        let m = analyse("function outer() { return inner(); function inner() {} }");
        assert_eq!(names(&m.statements[0].depends_on), vec!["outer"]);
        assert!(!m.definitions.contains_key("inner"));
    }

    #[test]
    fn test_functions_bind_arguments_but_arrows_do_not() {
        let m = analyse("function f() { return arguments.length; }\nvar g = () => arguments;");
        assert_eq!(names(&m.statements[0].depends_on), vec!["f"]);
        assert_eq!(names(&m.statements[1].depends_on), vec!["g", "arguments"]);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DEFINITIONS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_var_hoists_out_of_blocks_but_let_does_not() {
        let m = analyse("{ var x = 1; let y = 2; const z = 3; }");
        assert_eq!(names(&m.statements[0].defines), vec!["x"]);
        assert_eq!(m.definitions.get("x"), Some(&0));
        assert!(!m.definitions.contains_key("y"));
        assert!(!m.definitions.contains_key("z"));
    }

    #[test]
    fn test_switch_cases_share_a_block_scope() {
        let m = analyse("var tmp = 5;\nswitch (x) { case 1: let tmp = 2; var hoisted = tmp; }");
        assert_eq!(m.definitions.get("tmp"), Some(&0));
        assert_eq!(m.definitions.get("hoisted"), Some(&1));
        assert_eq!(names(&m.statements[1].defines), vec!["hoisted"]);
        assert_eq!(names(&m.statements[1].depends_on), vec!["x", "hoisted"]);
    }

    #[test]
    fn test_static_block_bindings_are_local() {
        let m = analyse("class C { static { let s = 1; var v = 2; init(s, v); } }");
        assert_eq!(names(&m.statements[0].defines), vec!["C"]);
        assert_eq!(names(&m.statements[0].depends_on), vec!["C", "init"]);
        assert!(!m.definitions.contains_key("s"));
        assert!(!m.definitions.contains_key("v"));
    }

    #[test]
    fn test_top_level_let_const_and_class_are_definitions() {
        let m = analyse("let a = 1;\nconst b = 2;\nclass C {}\nfunction d() {}");
        assert_eq!(m.definitions.get("a"), Some(&0));
        assert_eq!(m.definitions.get("b"), Some(&1));
        assert_eq!(m.definitions.get("C"), Some(&2));
        assert_eq!(m.definitions.get("d"), Some(&3));
    }

    #[test]
    fn test_destructuring_defines_every_binding() {
        let m = analyse("var { a, b: [c], ...rest } = source;");
        let s = &m.statements[0];
        assert_eq!(names(&s.defines), vec!["a", "c", "rest"]);
        assert!(s.depends_on.contains("source"));
    }

    #[test]
    fn test_loop_variables() {
        let m = analyse("for (var i = 0; i < n; i++) {}\nfor (let j = 0; j < n; j++) {}");
        let hoisted = &m.statements[0];
        assert_eq!(names(&hoisted.defines), vec!["i"]);
        assert_eq!(names(&hoisted.modifies), vec!["i"]);

        let scoped = &m.statements[1];
        assert!(scoped.defines.is_empty());
        assert!(scoped.modifies.is_empty());
        assert_eq!(names(&scoped.depends_on), vec!["n"]);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // MODIFICATIONS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_assignments_and_updates_are_modifications() {
        let m = analyse("var count = 0;\ncount++;\nobj.x = 1;\nobj[key] += 2;\ncount = count + 1, count--;");
        assert_eq!(names(&m.statements[1].modifies), vec!["count"]);
        assert_eq!(names(&m.statements[2].modifies), vec!["obj"]);
        assert_eq!(names(&m.statements[3].modifies), vec!["obj"]);
        assert_eq!(m.modifications.get("count"), Some(&vec![1, 4]));
        assert_eq!(m.modifications.get("obj"), Some(&vec![2, 3]));
    }

    #[test]
    fn test_local_writes_are_not_modifications() {
        let m = analyse("function f(a) { let b = 0; a = 1; b++; total += a; }");
        assert_eq!(names(&m.statements[0].modifies), vec!["total"]);
        assert!(!m.modifications.contains_key("a"));
        assert!(!m.modifications.contains_key("b"));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // IMPORTS AND EXPORTS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_named_imports_fill_the_import_table() {
        let m = analyse("import { a, b as c } from './x.js';");
        assert_eq!(m.statements[0].kind, StatementKind::Import);
        assert_eq!(
            m.imports.get("a"),
            Some(&ImportEntry {
                source: "./x.js".to_string(),
                imported: "a".to_string(),
            })
        );
        assert_eq!(m.imports.get("c").map(|e| e.imported.as_str()), Some("b"));
        assert!(!m.imports.contains_key("b"));
    }

    #[test]
    fn test_export_declarations_fill_the_export_table() {
        let m = analyse("export var p = 1, q = 2;\nexport function f() {}\nexport class K {}");
        let exported: Vec<&str> = m.exports.keys().map(String::as_str).collect();
        assert_eq!(exported, vec!["p", "q", "f", "K"]);
        assert_eq!(m.exports.get("f").map(String::as_str), Some("f"));
        assert_eq!(
            m.statements[0].kind,
            StatementKind::ExportDeclaration {
                declaration_start: 7
            }
        );
        assert_eq!(m.definitions.get("K"), Some(&2));
    }

    #[test]
    fn test_unsupported_forms_are_rejected_with_position() {
        let cases = [
            ("foo();\nexport * from './x.js';", ErrorKind::UnsupportedExportShape),
            ("foo();\nexport { foo };", ErrorKind::UnsupportedExportShape),
            ("foo();\nexport { a } from './x.js';", ErrorKind::UnsupportedExportShape),
            ("foo();\nexport default foo;", ErrorKind::UnsupportedExportShape),
            ("foo();\nimport * as ns from './x.js';", ErrorKind::UnsupportedImportShape),
            ("foo();\nimport d from './x.js';", ErrorKind::UnsupportedImportShape),
        ];
        for (code, kind) in cases {
            let err = Module::new(
                ModuleId(0),
                PathBuf::from("/src/main.js"),
                code.to_string(),
                UnsupportedSyntaxPolicy::Reject,
            )
            .unwrap_err();
            assert_eq!(err.kind, kind, "{}", code);
            assert_eq!((err.line, err.column), (2, 1), "{}", code);
        }
    }

    #[test]
    fn test_ignored_forms_are_marked_and_skipped() {
        let m = Module::new(
            ModuleId(0),
            PathBuf::from("/src/main.js"),
            "import d, { a } from './x.js';\nexport default d;".to_string(),
            UnsupportedSyntaxPolicy::Ignore,
        )
        .unwrap();

        assert_eq!(m.statements[0].kind, StatementKind::Unsupported);
        assert_eq!(m.statements[1].kind, StatementKind::Unsupported);
        assert!(m.imports.is_empty());
        assert!(m.statements.iter().all(|s| !s.is_closure_root()));
        assert!(m.statements.iter().all(|s| s.depends_on.is_empty()));
    }
}
