//! Member lookup on classes, instances, tables and namespaces.

use squirrel_ast::{branch::Branch, nodes::NodeKind};
use squirrel_semantic::{analysis::Analysis, symbols::SymbolKind, type_info::TypeLabel};

use crate::utils::{analyze, branch_at, branch_of_kind, declared_name, kind_of};

/// Name of the class or table declaration `branch` passes through, nearest
/// first.
fn owner_name(analysis: &Analysis, branch: &Branch) -> Option<String> {
    let ast = analysis.unit(branch.unit())?.ast();
    let owner = branch.ending_at_any(ast, |kind| {
        kind.is_class() || kind == NodeKind::VariableDeclarator
    })?;
    declared_name(analysis, &owner)
}

mod classes {
    use super::*;

    #[test]
    fn test_member_lookup_follows_class_identity() -> anyhow::Result<()> {
        let source =
            "class foo{function bar(){}} class who{function bar(){}} local x=foo(); x.bar();";
        let (analysis, unit) = analyze(source)?;
        let reference = branch_at(&analysis, unit, source, "bar", 2);
        let declared = branch_of_kind(&analysis, unit, source, "bar", 0, NodeKind::MethodDefinition);

        let definition = analysis
            .resolve_definition(&reference)
            .expect("x is a foo instance");
        assert_eq!(definition.target(), declared.target());
        assert_eq!(owner_name(&analysis, &definition).as_deref(), Some("foo"));
        Ok(())
    }

    #[test]
    fn test_subclass_member_wins() -> anyhow::Result<()> {
        let source = "class A { function f(){} function g(){} } \
                      class B extends A { function f(){} x = 1 } \
                      local b = B(); b.f(); b.g(); b;";
        let (analysis, unit) = analyze(source)?;
        let f = branch_at(&analysis, unit, source, "f()", 2);
        let g = branch_at(&analysis, unit, source, "g()", 1);

        let f_definition = analysis.resolve_definition(&f).expect("f is declared on B");
        assert_eq!(owner_name(&analysis, &f_definition).as_deref(), Some("B"));
        let g_definition = analysis.resolve_definition(&g).expect("g is inherited");
        assert_eq!(owner_name(&analysis, &g_definition).as_deref(), Some("A"));

        let instance = branch_at(&analysis, unit, source, "b;", 0);
        let members: Vec<_> = analysis
            .members(&instance)
            .into_iter()
            .map(|member| (member.name, member.level))
            .collect();
        assert_eq!(
            members,
            vec![
                ("f".to_string(), 0),
                ("x".to_string(), 0),
                ("g".to_string(), 1)
            ]
        );
        Ok(())
    }

    #[test]
    fn test_this_and_base() -> anyhow::Result<()> {
        let source = "class Base { function hello(){ return 1; } } \
                      class Child extends Base { \
                        function hello(){ return base.hello(); } \
                        function other(){ return this.hello(); } \
                      }";
        let (analysis, unit) = analyze(source)?;
        let through_base = branch_at(&analysis, unit, source, "hello", 2);
        let through_this = branch_at(&analysis, unit, source, "hello", 3);

        let base_definition = analysis.resolve_definition(&through_base).expect("Base.hello");
        assert_eq!(owner_name(&analysis, &base_definition).as_deref(), Some("Base"));
        let this_definition = analysis.resolve_definition(&through_this).expect("Child.hello");
        assert_eq!(owner_name(&analysis, &this_definition).as_deref(), Some("Child"));
        Ok(())
    }

    #[test]
    fn test_free_names_see_class_members_inside_body() -> anyhow::Result<()> {
        let source = "class C { limit = 10; function check(){ return limit; } }";
        let (analysis, unit) = analyze(source)?;
        let reference = branch_at(&analysis, unit, source, "limit;", 0);

        let definition = analysis.resolve_definition(&reference).expect("limit is a member");
        assert_eq!(
            kind_of(&analysis, &definition),
            Some(NodeKind::PropertyDefinition)
        );
        assert_eq!(analysis.infer_type(&reference), TypeLabel::Integer);
        Ok(())
    }

    #[test]
    fn test_instances_and_classes_are_labelled_apart() -> anyhow::Result<()> {
        let source = "class Point {} local p = Point(); p; Point;";
        let (analysis, unit) = analyze(source)?;
        let instance = branch_at(&analysis, unit, source, "p;", 0);
        let class = branch_at(&analysis, unit, source, "Point;", 0);

        assert_eq!(
            analysis.infer_type(&instance),
            TypeLabel::Instance("Point".to_string())
        );
        assert_eq!(analysis.infer_type(&instance).to_string(), "instance");
        assert_eq!(
            analysis.infer_type(&class),
            TypeLabel::Class("Point".to_string())
        );
        Ok(())
    }
}

mod delegation {
    use super::*;

    #[test]
    fn test_augments_forwards_to_constructor_argument() -> anyhow::Result<()> {
        let source = "class Inner { function ping(){} } \
                      /** @augments inner */ \
                      class Wrapper { constructor(inner){} function own(){} } \
                      local w = Wrapper(Inner()); w.ping(); w.own();";
        let (analysis, unit) = analyze(source)?;
        let ping = branch_at(&analysis, unit, source, "ping", 1);
        let own = branch_at(&analysis, unit, source, "own", 1);

        let forwarded = analysis.resolve_definition(&ping).expect("ping comes from Inner");
        assert_eq!(owner_name(&analysis, &forwarded).as_deref(), Some("Inner"));
        let direct = analysis.resolve_definition(&own).expect("own is declared on Wrapper");
        assert_eq!(owner_name(&analysis, &direct).as_deref(), Some("Wrapper"));
        Ok(())
    }

    #[test]
    fn test_meta_property_reads_through_getter() -> anyhow::Result<()> {
        let source = "class Box { \
                        /** @getter {int} size */ \
                        function getSize(){ return 1; } \
                        /** @setter size */ \
                        function setSize(v){} \
                      } \
                      local b = Box(); b.size;";
        let (analysis, unit) = analyze(source)?;
        let reference = branch_at(&analysis, unit, source, "size;", 0);

        let definition = analysis.resolve_definition(&reference).expect("size is a meta property");
        assert_eq!(kind_of(&analysis, &definition), Some(NodeKind::MetaProperty));
        assert_eq!(analysis.infer_type(&reference), TypeLabel::Integer);

        let instance = branch_at(&analysis, unit, source, "b.size", 0);
        let names: Vec<_> = analysis
            .members(&instance)
            .into_iter()
            .map(|member| member.name)
            .collect();
        assert_eq!(names, vec!["getSize", "setSize", "size"]);
        Ok(())
    }
}

mod tables {
    use super::*;

    #[test]
    fn test_literal_keys_read_as_names() -> anyhow::Result<()> {
        let source = "local t = { \"x\": 1, [\"y\"] = \"s\" }; t.x; t[\"y\"]; t[\"x\"];";
        let (analysis, unit) = analyze(source)?;
        let dotted = branch_of_kind(&analysis, unit, source, "t.x", 0, NodeKind::MemberExpression);
        let indexed = branch_of_kind(&analysis, unit, source, "t[\"y\"]", 0, NodeKind::MemberExpression);
        let mixed = branch_of_kind(&analysis, unit, source, "t[\"x\"]", 0, NodeKind::MemberExpression);

        let x = analysis.resolve_definition(&dotted).expect("x is a slot");
        assert_eq!(declared_name(&analysis, &x).as_deref(), Some("x"));
        assert_eq!(analysis.resolve_definition(&mixed), Some(x));
        assert_eq!(analysis.infer_type(&indexed), TypeLabel::String);
        Ok(())
    }

    #[test]
    fn test_computed_keys_stay_opaque() -> anyhow::Result<()> {
        let source = "local k = \"x\"; local t = { k = 1 }; t[k];";
        let (analysis, unit) = analyze(source)?;
        let member = branch_of_kind(&analysis, unit, source, "t[k]", 0, NodeKind::MemberExpression);
        assert_eq!(analysis.resolve_definition(&member), None);
        Ok(())
    }

    #[test]
    fn test_this_inside_table_method() -> anyhow::Result<()> {
        let source = "local t = { n = 1, function get(){ return this.n; } }; t.get();";
        let (analysis, unit) = analyze(source)?;
        let call = branch_of_kind(&analysis, unit, source, "t.get()", 0, NodeKind::CallExpression);
        assert_eq!(analysis.infer_type(&call), TypeLabel::Integer);
        Ok(())
    }
}

mod namespaces {
    use super::*;

    #[test]
    fn test_qualified_function_joins_class() -> anyhow::Result<()> {
        let source = "class A { v = 1 } \
                      function A::f(){ return v; } \
                      local a = A(); a.f();";
        let (analysis, unit) = analyze(source)?;
        let declared = branch_of_kind(
            &analysis,
            unit,
            source,
            "function A::f",
            0,
            NodeKind::FunctionDeclaration,
        );
        let reference = branch_at(&analysis, unit, source, "f()", 1);
        let call = branch_of_kind(&analysis, unit, source, "a.f()", 0, NodeKind::CallExpression);

        let definition = analysis.resolve_definition(&reference).expect("f joined A");
        assert_eq!(definition.target(), declared.target());
        // `v` inside the body is found on the owner class.
        assert_eq!(analysis.infer_type(&call), TypeLabel::Integer);

        let symbols = analysis.document_symbols(unit);
        let class = symbols.iter().find(|symbol| symbol.name == "A").expect("A symbol");
        assert_eq!(class.kind, SymbolKind::Class);
        assert!(class.children.iter().any(|child| child.name == "f"));
        assert!(!symbols.iter().any(|symbol| symbol.name == "f"));
        Ok(())
    }

    #[test]
    fn test_newslot_on_member_joins_table() -> anyhow::Result<()> {
        let source = "local M = {}; M.helper <- function(){ return \"h\"; }; M.helper();";
        let (analysis, unit) = analyze(source)?;
        let call = branch_of_kind(&analysis, unit, source, "M.helper()", 0, NodeKind::CallExpression);
        let module = branch_at(&analysis, unit, source, "M.helper()", 0);

        assert_eq!(analysis.infer_type(&call), TypeLabel::String);
        let names: Vec<_> = analysis
            .members(&module)
            .into_iter()
            .map(|member| member.name)
            .collect();
        assert_eq!(names, vec!["helper"]);

        let symbols = analysis.document_symbols(unit);
        let table = symbols.iter().find(|symbol| symbol.name == "M").expect("M symbol");
        assert_eq!(table.children.len(), 1);
        assert_eq!(table.children[0].name, "helper");
        assert_eq!(table.children[0].kind, SymbolKind::Method);
        Ok(())
    }

    #[test]
    fn test_nested_qualified_class() -> anyhow::Result<()> {
        let source = "local ns = {}; class ns.Inner { function go(){} } local i = ns.Inner(); i.go();";
        let (analysis, unit) = analyze(source)?;
        let reference = branch_at(&analysis, unit, source, "go()", 1);

        let definition = analysis.resolve_definition(&reference).expect("go on ns.Inner");
        assert_eq!(kind_of(&analysis, &definition), Some(NodeKind::MethodDefinition));
        assert_eq!(owner_name(&analysis, &definition).as_deref(), Some("Inner"));
        Ok(())
    }
}
