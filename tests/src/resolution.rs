//! Definition and value resolution through scopes, calls and cycles.

use squirrel_ast::nodes::{LiteralValue, NodeKind};
use squirrel_semantic::{resolver::Value, type_info::TypeLabel};

use crate::utils::{analyze, branch_at, branch_of_kind, declared_name, kind_of};

mod scenarios {
    use super::*;

    #[test]
    fn test_local_reference_resolves_to_declarator() -> anyhow::Result<()> {
        let source = "local abc = 123; abc;";
        let (analysis, unit) = analyze(source)?;
        let reference = branch_at(&analysis, unit, source, "abc", 1);

        let definition = analysis
            .resolve_definition(&reference)
            .expect("abc is declared");
        assert_eq!(
            kind_of(&analysis, &definition),
            Some(NodeKind::VariableDeclarator)
        );
        assert_eq!(declared_name(&analysis, &definition).as_deref(), Some("abc"));

        let value = analysis.resolve_value(&reference).expect("abc has a value");
        let literal = value
            .branch()
            .and_then(|branch| analysis.unit(unit)?.ast().get(branch.target()))
            .and_then(|node| node.literal().cloned());
        assert_eq!(literal, Some(LiteralValue::Integer(123)));
        Ok(())
    }

    #[test]
    fn test_double_call_indirection() -> anyhow::Result<()> {
        let source = "function foo(){return 123} function bar(){return foo()} bar()";
        let (analysis, unit) = analyze(source)?;
        let call = branch_of_kind(&analysis, unit, source, "bar()", 1, NodeKind::CallExpression);

        let value = analysis.resolve_value(&call).expect("bar() returns foo()");
        let node = value
            .branch()
            .and_then(|branch| analysis.unit(unit)?.ast().get(branch.target()))
            .expect("value is a node");
        assert_eq!(node.literal(), Some(&LiteralValue::Integer(123)));
        assert_eq!(analysis.infer_type(&call), TypeLabel::Integer);
        Ok(())
    }

    #[test]
    fn test_mutually_extending_classes_terminate() -> anyhow::Result<()> {
        let source = "class foo extends bar{}; class bar extends foo{};";
        let (analysis, unit) = analyze(source)?;
        let foo = branch_of_kind(&analysis, unit, source, "foo", 0, NodeKind::ClassDeclaration);
        let bar_reference = branch_at(&analysis, unit, source, "bar", 0);

        let bar = analysis
            .resolve_definition(&bar_reference)
            .expect("bar is declared at the top level");
        assert_eq!(declared_name(&analysis, &bar).as_deref(), Some("bar"));

        let chain = analysis.superclass_chain(&foo);
        assert_eq!(chain.len(), 1);
        assert_eq!(declared_name(&analysis, &chain[0]).as_deref(), Some("bar"));
        assert!(analysis.members(&foo).is_empty());
        assert_eq!(analysis.find_member(&foo, "missing"), None);
        Ok(())
    }

    #[test]
    fn test_enum_member_reference() -> anyhow::Result<()> {
        let source = "enum myenum{abc=123}; myenum.abc;";
        let (analysis, unit) = analyze(source)?;
        let reference = branch_at(&analysis, unit, source, "abc", 1);

        let definition = analysis
            .resolve_definition(&reference)
            .expect("abc is a member of myenum");
        assert_eq!(kind_of(&analysis, &definition), Some(NodeKind::EnumMember));
        assert_eq!(declared_name(&analysis, &definition).as_deref(), Some("abc"));
        assert_eq!(analysis.infer_type(&reference), TypeLabel::Integer);

        let enumeration = branch_at(&analysis, unit, source, "myenum", 1);
        assert_eq!(
            analysis.infer_type(&enumeration),
            TypeLabel::Enum("myenum".to_string())
        );
        Ok(())
    }
}

mod properties {
    use super::*;

    #[test]
    fn test_resolution_is_idempotent() -> anyhow::Result<()> {
        let source = "local a = { x = 1 }; local b = a; b.x;";
        let (analysis, unit) = analyze(source)?;
        let reference = branch_at(&analysis, unit, source, "x;", 0);

        let first = analysis.resolve_definition(&reference);
        let second = analysis.resolve_definition(&reference);
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(analysis.resolve_value(&reference), analysis.resolve_value(&reference));
        Ok(())
    }

    #[test]
    fn test_mutual_calls_terminate_unresolved() -> anyhow::Result<()> {
        let source = "function a(){return b()} function b(){return a()} a();";
        let (analysis, unit) = analyze(source)?;
        let call = branch_of_kind(&analysis, unit, source, "a();", 0, NodeKind::CallExpression);

        assert_eq!(analysis.resolve_value(&call), None);
        assert_eq!(analysis.infer_type(&call), TypeLabel::Any);
        // The callee itself is still found.
        assert!(analysis.resolve_definition(&call).is_some());
        Ok(())
    }

    #[test]
    fn test_self_referencing_table_terminates() -> anyhow::Result<()> {
        let source = "local t = {}; t.me <- t; t.me.me.missing;";
        let (analysis, unit) = analyze(source)?;
        let me = branch_at(&analysis, unit, source, "me", 2);
        let missing = branch_at(&analysis, unit, source, "missing", 0);

        let definition = analysis.resolve_definition(&me).expect("me is a slot of t");
        assert_eq!(
            kind_of(&analysis, &definition),
            Some(NodeKind::AssignmentExpression)
        );
        assert_eq!(analysis.resolve_definition(&missing), None);
        Ok(())
    }

    #[test]
    fn test_circular_locals_resolve_to_nothing() -> anyhow::Result<()> {
        let source = "local a = b; local b = a; a;";
        let (analysis, unit) = analyze(source)?;
        let reference = branch_at(&analysis, unit, source, "a;", 1);
        assert_eq!(analysis.resolve_value(&reference), None);
        assert_eq!(analysis.resolve_value(&reference), None);
        Ok(())
    }

    #[test]
    fn test_inner_declaration_shadows_outer() -> anyhow::Result<()> {
        let source = "local x = 1; function f(){ local x = \"s\"; return x; } x;";
        let (analysis, unit) = analyze(source)?;
        let inner = branch_at(&analysis, unit, source, "x;", 0);
        let outer = branch_at(&analysis, unit, source, "x;", 1);

        let inner_definition = analysis.resolve_definition(&inner).expect("inner x");
        let outer_definition = analysis.resolve_definition(&outer).expect("outer x");
        assert_ne!(inner_definition.target(), outer_definition.target());
        assert_eq!(analysis.infer_type(&inner), TypeLabel::String);
        assert_eq!(analysis.infer_type(&outer), TypeLabel::Integer);
        Ok(())
    }

    #[test]
    fn test_parameters_have_no_value() -> anyhow::Result<()> {
        let source = "function f(p){ return p; }";
        let (analysis, unit) = analyze(source)?;
        let reference = branch_at(&analysis, unit, source, "p;", 0);

        let definition = analysis.resolve_definition(&reference).expect("p is a parameter");
        assert_eq!(kind_of(&analysis, &definition), Some(NodeKind::Identifier));
        assert_eq!(analysis.resolve_value(&reference), None);
        Ok(())
    }
}

mod calls {
    use super::*;

    #[test]
    fn test_overload_picked_by_arity() -> anyhow::Result<()> {
        let source = "function pick(a){ return 1; } \
                      function pick(a, b){ return \"two\"; } \
                      pick(1, 2); pick(1); pick();";
        let (analysis, unit) = analyze(source)?;
        let two = branch_of_kind(&analysis, unit, source, "pick(1, 2)", 0, NodeKind::CallExpression);
        let one = branch_of_kind(&analysis, unit, source, "pick(1)", 0, NodeKind::CallExpression);
        let none = branch_of_kind(&analysis, unit, source, "pick()", 0, NodeKind::CallExpression);

        assert_eq!(analysis.infer_type(&two), TypeLabel::String);
        assert_eq!(analysis.infer_type(&one), TypeLabel::Integer);
        assert_eq!(analysis.infer_type(&none), TypeLabel::Integer);
        Ok(())
    }

    #[test]
    fn test_method_overload_picked_by_arity() -> anyhow::Result<()> {
        let source = "class A { function f(a){ return 1; } function f(a, b){ return \"s\"; } } \
                      local x = A(); x.f(1, 2); x.f(1);";
        let (analysis, unit) = analyze(source)?;
        let two = branch_of_kind(&analysis, unit, source, "x.f(1, 2)", 0, NodeKind::CallExpression);
        let one = branch_of_kind(&analysis, unit, source, "x.f(1)", 0, NodeKind::CallExpression);
        let reference = branch_at(&analysis, unit, source, "f(1, 2)", 0);
        let declared = branch_of_kind(&analysis, unit, source, "f(a, b)", 0, NodeKind::MethodDefinition);

        assert_eq!(analysis.infer_type(&two), TypeLabel::String);
        assert_eq!(analysis.infer_type(&one), TypeLabel::Integer);
        let definition = analysis.resolve_definition(&reference).expect("f is a method of A");
        assert_eq!(definition.target(), declared.target());
        Ok(())
    }

    #[test]
    fn test_namespaced_overload_picked_by_arity() -> anyhow::Result<()> {
        let source = "local fe = {}; \
                      function fe::add(a){ return 1; } \
                      function fe::add(a, b, c){ return \"s\"; } \
                      fe.add(1, 2, 3); fe.add(1);";
        let (analysis, unit) = analyze(source)?;
        let three = branch_of_kind(&analysis, unit, source, "fe.add(1, 2, 3)", 0, NodeKind::CallExpression);
        let one = branch_of_kind(&analysis, unit, source, "fe.add(1)", 0, NodeKind::CallExpression);

        assert_eq!(analysis.infer_type(&three), TypeLabel::String);
        assert_eq!(analysis.infer_type(&one), TypeLabel::Integer);
        Ok(())
    }

    #[test]
    fn test_rest_parameter_accepts_any_arity() -> anyhow::Result<()> {
        let source = "function log(a){ return 1; } \
                      function log(...){ return \"many\"; } \
                      log(1, 2, 3);";
        let (analysis, unit) = analyze(source)?;
        let call = branch_of_kind(&analysis, unit, source, "log(1, 2, 3)", 0, NodeKind::CallExpression);
        assert_eq!(analysis.infer_type(&call), TypeLabel::String);
        Ok(())
    }

    #[test]
    fn test_lambda_and_generator_returns() -> anyhow::Result<()> {
        let source = "local twice = @(x) \"s\"; twice(1); \
                      function gen(){ yield 1; return 2; } gen();";
        let (analysis, unit) = analyze(source)?;
        let lambda = branch_of_kind(&analysis, unit, source, "twice(1)", 0, NodeKind::CallExpression);
        let generator = branch_of_kind(&analysis, unit, source, "gen();", 0, NodeKind::CallExpression);

        assert_eq!(analysis.infer_type(&lambda), TypeLabel::String);
        assert_eq!(
            analysis.resolve_value(&generator),
            Some(Value::Nominal("Generator".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_return_in_nested_function_is_ignored() -> anyhow::Result<()> {
        let source = "function outer(){ local inner = function(){ return \"s\"; }; return 1; } outer();";
        let (analysis, unit) = analyze(source)?;
        let call = branch_of_kind(&analysis, unit, source, "outer();", 0, NodeKind::CallExpression);
        assert_eq!(analysis.infer_type(&call), TypeLabel::Integer);
        Ok(())
    }

    #[test]
    fn test_root_lookup_skips_locals() -> anyhow::Result<()> {
        let source = "g <- 1; function f(){ local g = \"s\"; return ::g; } f();";
        let (analysis, unit) = analyze(source)?;
        let call = branch_of_kind(&analysis, unit, source, "f();", 0, NodeKind::CallExpression);
        assert_eq!(analysis.infer_type(&call), TypeLabel::Integer);
        Ok(())
    }
}

mod inference {
    use super::*;

    fn type_of(source: &str, needle: &str, nth: usize) -> anyhow::Result<TypeLabel> {
        let (analysis, unit) = analyze(source)?;
        let branch = branch_at(&analysis, unit, source, needle, nth);
        Ok(analysis.infer_type(&branch))
    }

    #[test]
    fn test_array_element_types() -> anyhow::Result<()> {
        assert_eq!(
            type_of("local a = [1, 2, 3]; a;", "a;", 0)?,
            TypeLabel::Array(Some(Box::new(TypeLabel::Integer)))
        );
        assert_eq!(
            type_of("local a = [1, \"s\"]; a;", "a;", 0)?,
            TypeLabel::Array(Some(Box::new(TypeLabel::Any)))
        );
        assert_eq!(type_of("local a = []; a;", "a;", 0)?, TypeLabel::Array(None));
        Ok(())
    }

    #[test]
    fn test_operator_types() -> anyhow::Result<()> {
        assert_eq!(type_of("local s = 1 + 2.5; s;", "s;", 0)?, TypeLabel::Float);
        assert_eq!(type_of("local s = \"a\" + 1; s;", "s;", 0)?, TypeLabel::String);
        assert_eq!(type_of("local s = 1 < 2; s;", "s;", 0)?, TypeLabel::Bool);
        assert_eq!(type_of("local s = typeof 1; s;", "s;", 0)?, TypeLabel::String);
        assert_eq!(type_of("local s = -4; s;", "s;", 0)?, TypeLabel::Integer);
        Ok(())
    }

    #[test]
    fn test_conditional_prefers_consequent() -> anyhow::Result<()> {
        assert_eq!(
            type_of("local c = true ? 1 : \"s\"; c;", "c;", 0)?,
            TypeLabel::Integer
        );
        assert_eq!(
            type_of("local c = true ? missing : \"s\"; c;", "c;", 0)?,
            TypeLabel::String
        );
        Ok(())
    }

    #[test]
    fn test_unresolved_is_any() -> anyhow::Result<()> {
        assert_eq!(type_of("nowhere;", "nowhere", 0)?, TypeLabel::Any);
        Ok(())
    }
}
