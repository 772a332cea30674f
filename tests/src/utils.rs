use squirrel_ast::{
    branch::Branch,
    nodes::{NodeKind, UnitId},
};
use squirrel_semantic::{AnalysisBuilder, analysis::Analysis, imports::StaticImports};

/// Analyses a single source; it becomes unit 0.
pub(crate) fn analyze(source: &str) -> anyhow::Result<(Analysis, UnitId)> {
    let analysis = AnalysisBuilder::new().add_source(source)?.build().analysis();
    Ok((analysis, UnitId(0)))
}

/// Analyses `sources` as one batch; unit ids follow the slice order.
pub(crate) fn analyze_all(sources: &[&str], imports: StaticImports) -> anyhow::Result<Analysis> {
    let mut builder = AnalysisBuilder::new().with_import_resolver(imports);
    for source in sources {
        builder = builder.add_source(source)?;
    }
    Ok(builder.build().analysis())
}

/// Byte offset of the `nth` (zero-based) occurrence of `needle`.
pub(crate) fn offset_of(source: &str, needle: &str, nth: usize) -> u32 {
    let (offset, _) = source
        .match_indices(needle)
        .nth(nth)
        .unwrap_or_else(|| panic!("`{needle}` occurs fewer than {} times", nth + 1));
    u32::try_from(offset).expect("offset fits in u32")
}

/// Branch to the innermost node at the `nth` occurrence of `needle`.
pub(crate) fn branch_at(
    analysis: &Analysis,
    unit: UnitId,
    source: &str,
    needle: &str,
    nth: usize,
) -> Branch {
    analysis
        .branch_at(unit, offset_of(source, needle, nth))
        .expect("offset lies inside the unit")
}

/// Like [`branch_at`], trimmed back to the nearest node of `kind`.
pub(crate) fn branch_of_kind(
    analysis: &Analysis,
    unit: UnitId,
    source: &str,
    needle: &str,
    nth: usize,
    kind: NodeKind,
) -> Branch {
    let branch = branch_at(analysis, unit, source, needle, nth);
    let ast = analysis.unit(unit).expect("unit is loaded").ast();
    branch
        .ending_at(ast, kind)
        .unwrap_or_else(|| panic!("no {kind:?} around `{needle}`"))
}

pub(crate) fn kind_of(analysis: &Analysis, branch: &Branch) -> Option<NodeKind> {
    analysis.unit(branch.unit())?.ast().kind(branch.target())
}

/// Declared name of the node at the end of `branch`.
pub(crate) fn declared_name(analysis: &Analysis, branch: &Branch) -> Option<String> {
    let unit = analysis.unit(branch.unit())?;
    let ast = unit.ast();
    let name = ast.get(branch.target())?.name_node()?;
    unit.tables()
        .key_name(ast, name)
        .map(str::to_string)
}
