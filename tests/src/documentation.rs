//! Documentation annotations and their precedence over inferred shapes.

use squirrel_ast::nodes::NodeKind;
use squirrel_semantic::type_info::TypeLabel;

use crate::utils::{analyze, branch_at, branch_of_kind, declared_name};

mod annotations {
    use super::*;

    #[test]
    fn test_returns_annotation_wins_over_body() -> anyhow::Result<()> {
        let source = "/** @returns {string} */ function foo(){ return 123; } foo();";
        let (analysis, unit) = analyze(source)?;
        let call = branch_of_kind(&analysis, unit, source, "foo();", 0, NodeKind::CallExpression);
        assert_eq!(analysis.infer_type(&call), TypeLabel::String);
        Ok(())
    }

    #[test]
    fn test_type_annotation_wins_over_initializer() -> anyhow::Result<()> {
        let source = "/** @type {float} */ local ratio = 1; ratio;";
        let (analysis, unit) = analyze(source)?;
        let reference = branch_at(&analysis, unit, source, "ratio;", 0);
        assert_eq!(analysis.infer_type(&reference), TypeLabel::Float);
        Ok(())
    }

    #[test]
    fn test_param_annotation() -> anyhow::Result<()> {
        let source = "/**\n * @param {string} name\n */\nfunction greet(name){ return name; }";
        let (analysis, unit) = analyze(source)?;
        let reference = branch_at(&analysis, unit, source, "name;", 0);
        assert_eq!(analysis.infer_type(&reference), TypeLabel::String);
        Ok(())
    }

    #[test]
    fn test_returned_class_exposes_members() -> anyhow::Result<()> {
        let source = "class Foo { function bar(){} } \
                      /** @returns {Foo} */ function make(){ return null; } \
                      make().bar();";
        let (analysis, unit) = analyze(source)?;
        let reference = branch_at(&analysis, unit, source, "bar", 1);
        let call = branch_of_kind(&analysis, unit, source, "make()", 1, NodeKind::CallExpression);

        let definition = analysis.resolve_definition(&reference).expect("bar on Foo");
        let method = definition.parent_branch().and_then(|body| body.parent_branch());
        assert_eq!(
            method.and_then(|class| declared_name(&analysis, &class)).as_deref(),
            Some("Foo")
        );
        assert_eq!(
            analysis.infer_type(&call),
            TypeLabel::Instance("Foo".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_declared_type_of_variable_exposes_members() -> anyhow::Result<()> {
        let source = "class Foo { function bar(){} } \
                      /** @type {Foo} */ local f = null; f.bar();";
        let (analysis, unit) = analyze(source)?;
        let reference = branch_at(&analysis, unit, source, "bar", 1);
        let variable = branch_at(&analysis, unit, source, "f.bar", 0);

        assert!(analysis.resolve_definition(&reference).is_some());
        assert_eq!(
            analysis.infer_type(&variable),
            TypeLabel::Nominal("Foo".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_call_of_annotated_variable_uses_return_value() -> anyhow::Result<()> {
        let source = "function make(){ return 1; } \
                      /** @type {Widget} */ local build = make; build; build();";
        let (analysis, unit) = analyze(source)?;
        let variable = branch_at(&analysis, unit, source, "build;", 0);
        let call = branch_of_kind(&analysis, unit, source, "build();", 0, NodeKind::CallExpression);

        assert_eq!(
            analysis.infer_type(&variable),
            TypeLabel::Nominal("Widget".to_string())
        );
        assert_eq!(analysis.infer_type(&call), TypeLabel::Integer);
        Ok(())
    }

    #[test]
    fn test_unknown_return_type_stays_nominal() -> anyhow::Result<()> {
        let source = "/** @returns {Widget} */ function make(){} make();";
        let (analysis, unit) = analyze(source)?;
        let call = branch_of_kind(&analysis, unit, source, "make();", 0, NodeKind::CallExpression);
        assert_eq!(
            analysis.infer_type(&call),
            TypeLabel::Nominal("Widget".to_string())
        );
        Ok(())
    }
}

mod classes {
    use super::*;

    #[test]
    fn test_alias_names_the_class() -> anyhow::Result<()> {
        let source = "/** @alias Vec */ class Vector2 {} local v = Vector2(); v; Vector2;";
        let (analysis, unit) = analyze(source)?;
        let instance = branch_at(&analysis, unit, source, "v;", 0);
        let class = branch_at(&analysis, unit, source, "Vector2;", 0);

        assert_eq!(
            analysis.infer_type(&instance),
            TypeLabel::Instance("Vec".to_string())
        );
        assert_eq!(analysis.infer_type(&class), TypeLabel::Class("Vec".to_string()));
        Ok(())
    }

    #[test]
    fn test_alias_is_usable_as_type_name() -> anyhow::Result<()> {
        let source = "/** @alias Vec */ class Vector2 { function len(){} } \
                      /** @type {Vec} */ local v = null; v.len();";
        let (analysis, unit) = analyze(source)?;
        let reference = branch_at(&analysis, unit, source, "len", 1);
        assert!(analysis.resolve_definition(&reference).is_some());
        Ok(())
    }

    #[test]
    fn test_self_typed_class_constructs_itself() -> anyhow::Result<()> {
        let source = "/** @type {self} */ class Color {} local c = Color(); c;";
        let (analysis, unit) = analyze(source)?;
        let instance = branch_at(&analysis, unit, source, "c;", 0);
        assert_eq!(
            analysis.infer_type(&instance),
            TypeLabel::Class("Color".to_string())
        );
        Ok(())
    }
}

mod queries {
    use super::*;

    #[test]
    fn test_deprecation_and_documentation() -> anyhow::Result<()> {
        let source = "/**\n * Old entry point.\n * @deprecated use fresh\n */\nfunction old(){}\n\
                      function fresh(){}\nold(); fresh();";
        let (analysis, unit) = analyze(source)?;
        let old = branch_at(&analysis, unit, source, "old();", 0);
        let fresh = branch_at(&analysis, unit, source, "fresh();", 0);

        assert!(analysis.is_deprecated(&old));
        assert!(!analysis.is_deprecated(&fresh));

        let kinds: Vec<_> = analysis
            .documentation(&old)
            .expect("old is documented")
            .iter()
            .map(|attribute| attribute.kind.as_str())
            .collect();
        assert_eq!(kinds, vec!["description", "deprecated"]);
        assert!(analysis.documentation(&fresh).is_none());
        Ok(())
    }
}
