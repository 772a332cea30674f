//! Multi-unit analyses, incremental edits and the editor-facing outputs.

use squirrel_ast::nodes::{NodeKind, UnitId};
use squirrel_semantic::{
    analysis::Analysis, config::AnalysisConfig, errors::AnalysisError, imports::StaticImports,
    symbols::TokenKind, type_info::TypeLabel,
};

use crate::utils::{analyze, analyze_all, branch_at, branch_of_kind, declared_name};

mod imports {
    use super::*;

    #[test]
    fn test_top_level_names_cross_imports() -> anyhow::Result<()> {
        let library = "class Logger { function write(){} } local level = 3;";
        let script = "local log = Logger(); log.write(); level;";
        let analysis = analyze_all(
            &[library, script],
            StaticImports::new().with(UnitId(1), UnitId(0)),
        )?;
        let write = branch_at(&analysis, UnitId(1), script, "write", 0);
        let level = branch_at(&analysis, UnitId(1), script, "level", 0);

        let definition = analysis.resolve_definition(&write).expect("Logger is imported");
        assert_eq!(definition.unit(), UnitId(0));
        assert_eq!(declared_name(&analysis, &definition).as_deref(), Some("write"));
        assert_eq!(analysis.infer_type(&level), TypeLabel::Integer);
        Ok(())
    }

    #[test]
    fn test_without_imports_units_are_isolated() -> anyhow::Result<()> {
        let analysis = analyze_all(&["local shared = 1;", "shared;"], StaticImports::new())?;
        let reference = branch_at(&analysis, UnitId(1), "shared;", "shared", 0);
        assert_eq!(analysis.resolve_definition(&reference), None);
        Ok(())
    }

    #[test]
    fn test_imports_are_not_transitive() -> anyhow::Result<()> {
        let script = "middle; deep;";
        let analysis = analyze_all(
            &[script, "local middle = 1;", "local deep = 2;"],
            StaticImports::new()
                .with(UnitId(0), UnitId(1))
                .with(UnitId(1), UnitId(2)),
        )?;
        let middle = branch_at(&analysis, UnitId(0), script, "middle", 0);
        let deep = branch_at(&analysis, UnitId(0), script, "deep", 0);

        let definition = analysis.resolve_definition(&middle).expect("middle is imported");
        assert_eq!(definition.unit(), UnitId(1));
        assert_eq!(analysis.resolve_definition(&deep), None);
        Ok(())
    }

    #[test]
    fn test_namespace_entry_from_other_unit() -> anyhow::Result<()> {
        let library = "class Api {} local api = Api(); api.extra();";
        let plugin = "function Api::extra(){ return \"x\"; }";
        let analysis = analyze_all(
            &[library, plugin],
            StaticImports::new().with(UnitId(1), UnitId(0)),
        )?;
        let reference = branch_at(&analysis, UnitId(0), library, "extra", 0);
        let call = branch_of_kind(
            &analysis,
            UnitId(0),
            library,
            "api.extra()",
            0,
            NodeKind::CallExpression,
        );

        let definition = analysis.resolve_definition(&reference).expect("extra joined Api");
        assert_eq!(definition.unit(), UnitId(1));
        assert_eq!(analysis.infer_type(&call), TypeLabel::String);
        // Symbols only move under owners of their own unit.
        assert!(
            analysis
                .document_symbols(UnitId(1))
                .iter()
                .any(|symbol| symbol.name == "extra")
        );
        Ok(())
    }
}

mod edits {
    use super::*;

    #[test]
    fn test_replacing_a_unit_drops_stale_answers() -> anyhow::Result<()> {
        let (mut analysis, unit) = analyze("local a = 1; a;")?;
        let before = branch_at(&analysis, unit, "local a = 1; a;", "a;", 0);
        assert_eq!(analysis.infer_type(&before), TypeLabel::Integer);

        let source = "local a = \"s\"; a;";
        analysis.replace_source(unit, source)?;
        let after = branch_at(&analysis, unit, source, "a;", 0);
        assert_eq!(analysis.infer_type(&after), TypeLabel::String);
        Ok(())
    }

    #[test]
    fn test_namespaces_follow_a_replaced_owner() -> anyhow::Result<()> {
        let plugin = "function Api::extra(){ return 1; }";
        let mut analysis = analyze_all(
            &["class Api {}", plugin],
            StaticImports::new().with(UnitId(1), UnitId(0)),
        )?;

        let library = "local pad = 0; class Api {} local api = Api(); api.extra();";
        analysis.replace_source(UnitId(0), library)?;
        let reference = branch_at(&analysis, UnitId(0), library, "extra", 0);
        let definition = analysis.resolve_definition(&reference).expect("entry re-recorded");
        assert_eq!(definition.unit(), UnitId(1));
        Ok(())
    }

    #[test]
    fn test_namespace_owner_added_after_entry() -> anyhow::Result<()> {
        let mut analysis = Analysis::default();
        analysis.set_import_resolver(StaticImports::new().with(UnitId(0), UnitId(1)));
        let plugin = analysis.add_source("function Api::extra(){ return 1; }")?;
        let source = "class Api {} local api = Api(); api.extra();";
        let library = analysis.add_source(source)?;

        let reference = branch_at(&analysis, library, source, "extra", 0);
        let definition = analysis.resolve_definition(&reference).expect("extra joined Api");
        assert_eq!(definition.unit(), plugin);
        Ok(())
    }

    #[test]
    fn test_namespaces_follow_new_imports() -> anyhow::Result<()> {
        let source = "class Api {} local api = Api(); api.extra();";
        let mut analysis = analyze_all(
            &[source, "function Api::extra(){ return 1; }"],
            StaticImports::new(),
        )?;
        let reference = branch_at(&analysis, UnitId(0), source, "extra", 0);
        assert_eq!(analysis.resolve_definition(&reference), None);

        analysis.set_import_resolver(StaticImports::new().with(UnitId(1), UnitId(0)));
        let definition = analysis.resolve_definition(&reference).expect("Api is now visible");
        assert_eq!(definition.unit(), UnitId(1));
        Ok(())
    }

    #[test]
    fn test_unknown_units_are_reported() -> anyhow::Result<()> {
        let (mut analysis, unit) = analyze("local a = 1;")?;
        let error = analysis
            .replace_source(UnitId(7), "local b = 2;")
            .expect_err("unit 7 was never added");
        assert!(matches!(error, AnalysisError::UnknownUnit(UnitId(7))));

        let removed = analysis.remove_unit(unit)?;
        assert_eq!(removed.id(), unit);
        assert!(analysis.unit(unit).is_none());
        assert!(matches!(
            analysis.remove_unit(unit),
            Err(AnalysisError::UnknownUnit(_))
        ));
        Ok(())
    }

    #[test]
    fn test_parse_errors_surface() {
        let mut analysis = Analysis::default();
        let error = analysis
            .add_source("function (")
            .expect_err("missing function name");
        assert!(matches!(error, AnalysisError::Parse(_)));
    }
}

mod outputs {
    use super::*;

    #[test]
    fn test_import_hints_from_configured_calls() -> anyhow::Result<()> {
        let source = "require(\"a.nut\"); local b = require_optional(\"b.nut\"); other(\"c.nut\");";
        let (analysis, unit) = analyze(source)?;
        let hints: Vec<_> = analysis
            .import_hints(unit)
            .iter()
            .map(|hint| (hint.function.as_str(), hint.path.as_str()))
            .collect();
        assert_eq!(hints, vec![("require", "a.nut"), ("require_optional", "b.nut")]);
        Ok(())
    }

    #[test]
    fn test_config_changes_import_functions_and_generator() -> anyhow::Result<()> {
        let config = AnalysisConfig::from_json(
            r#"{ "import_functions": ["load"], "generator_type": "Iterator" }"#,
        )?;
        let mut analysis = Analysis::new(config);
        let source = "load(\"x.nut\"); require(\"y.nut\"); function g(){ yield 1; } g();";
        let unit = analysis.add_source(source)?;

        let paths: Vec<_> = analysis
            .import_hints(unit)
            .iter()
            .map(|hint| hint.path.as_str())
            .collect();
        assert_eq!(paths, vec!["x.nut"]);

        let call = branch_of_kind(&analysis, unit, source, "g();", 0, NodeKind::CallExpression);
        assert_eq!(
            analysis.infer_type(&call),
            TypeLabel::Nominal("Iterator".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_document_symbols_serialize() -> anyhow::Result<()> {
        let source = "class foo { function bar(){} } enum E { A }";
        let (analysis, unit) = analyze(source)?;
        let json = serde_json::to_value(analysis.document_symbols(unit))?;

        assert_eq!(json[0]["name"], "foo");
        assert_eq!(json[0]["kind"], "class");
        assert_eq!(json[0]["children"][0]["name"], "bar");
        assert_eq!(json[0]["children"][0]["kind"], "method");
        assert_eq!(json[1]["kind"], "enum");
        assert_eq!(json[1]["children"][0]["kind"], "enumMember");
        assert!(json[0]["children"][0].get("children").is_none());
        Ok(())
    }

    #[test]
    fn test_semantic_tokens_in_source_order() -> anyhow::Result<()> {
        let source = "function f(p){ return p; } f(1);";
        let (analysis, unit) = analyze(source)?;
        let tokens: Vec<_> = analysis
            .semantic_tokens(unit)
            .into_iter()
            .map(|(location, kind)| (location.offset_start, kind))
            .collect();

        assert!(tokens.windows(2).all(|pair| pair[0].0 <= pair[1].0));
        let declared = u32::try_from(source.find("f(p").unwrap_or_default())?;
        assert!(tokens.contains(&(declared, TokenKind::Function)));
        let parameter = u32::try_from(source.find("p)").unwrap_or_default())?;
        assert!(tokens.contains(&(parameter, TokenKind::Parameter)));
        Ok(())
    }
}
