//! Definition and value resolution.
//!
//! The two queries are one mutually recursive unit: resolving a value often
//! needs a definition (an identifier's declaration) and resolving a
//! definition often needs a value (the object of a member access). Both
//! share a single [`Walk`] per top-level query.
//!
//! Every step is guarded by the walk. Re-entering a `(query, unit, node)`
//! triple that is still on the stack, or exceeding the configured depth,
//! aborts that path with `None`. A result is memoized in the unit's side
//! tables only when nothing below it was aborted, so a truncated answer is
//! never mistaken for a terminal one.

mod definition;
mod inference;
mod inheritance;
mod value;

use rustc_hash::FxHashSet;
use squirrel_ast::{
    arena::Ast,
    branch::Branch,
    fields::FieldTable,
    nodes::{NodeId, NodeKind, UnitId},
};
use tracing::trace;

pub use inheritance::MemberEntry;

use crate::{analysis::Analysis, unit::Unit};

/// Outcome of value resolution.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Value {
    /// A concrete node. `instance` is set for constructed classes and `this`;
    /// `call` remembers the construction site.
    Node {
        branch: Branch,
        instance: bool,
        call: Option<Branch>,
    },
    /// A value only known by name, from an annotation that names no
    /// declaration.
    Nominal(String),
}

impl Value {
    #[must_use]
    pub fn node(branch: Branch) -> Self {
        Value::Node {
            branch,
            instance: false,
            call: None,
        }
    }

    #[must_use]
    pub fn instance(branch: Branch, call: Option<Branch>) -> Self {
        Value::Node {
            branch,
            instance: true,
            call,
        }
    }

    #[must_use]
    pub fn branch(&self) -> Option<&Branch> {
        match self {
            Value::Node { branch, .. } => Some(branch),
            Value::Nominal(_) => None,
        }
    }

    #[must_use]
    pub fn is_instance(&self) -> bool {
        matches!(self, Value::Node { instance: true, .. })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum Query {
    Definition,
    Value,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct Visit {
    query: Query,
    unit: UnitId,
    node: NodeId,
}

/// State of one top-level query.
#[derive(Debug, Default)]
pub struct Walk {
    visited: FxHashSet<Visit>,
    depth: usize,
    /// Set when the current frame, or anything below it, hit a guard.
    aborted: bool,
}

impl Walk {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

pub(crate) struct Resolver<'a> {
    analysis: &'a Analysis,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(analysis: &'a Analysis) -> Self {
        Self { analysis }
    }

    fn unit(&self, id: UnitId) -> Option<&'a Unit> {
        self.analysis.unit(id)
    }

    fn ast(&self, branch: &Branch) -> Option<&'a Ast> {
        self.unit(branch.unit()).map(Unit::ast)
    }

    fn kind(&self, branch: &Branch) -> Option<NodeKind> {
        self.ast(branch)?.kind(branch.target())
    }

    /// Declaring construct of the node at the end of `branch`.
    pub(crate) fn definition(&self, branch: &Branch, walk: &mut Walk) -> Option<Branch> {
        let unit = self.unit(branch.unit())?;
        let kind = unit.ast().kind(branch.target())?;
        if !definition::is_reference(kind) {
            return self.resolve_definition(branch, walk);
        }
        let memo = unit.tables.definitions.borrow().get(branch.target()).cloned();
        if let Some(result) = memo {
            return result;
        }
        let branch = self.anchored(unit.ast(), branch);
        let (result, clean) = self.guarded(Query::Definition, &branch, walk, |resolver, walk| {
            resolver.resolve_definition(&branch, walk)
        });
        if clean {
            unit.tables
                .definitions
                .borrow_mut()
                .insert(branch.target(), result.clone());
        }
        result
    }

    /// Ultimate value of the node at the end of `branch`.
    pub(crate) fn value(&self, branch: &Branch, walk: &mut Walk) -> Option<Value> {
        let unit = self.unit(branch.unit())?;
        let kind = unit.ast().kind(branch.target())?;
        if !value::is_indirect(kind) {
            return self.resolve_value(branch, walk);
        }
        let memo = unit.tables.values.borrow().get(branch.target()).cloned();
        if let Some(result) = memo {
            return result;
        }
        let branch = self.anchored(unit.ast(), branch);
        let (result, clean) = self.guarded(Query::Value, &branch, walk, |resolver, walk| {
            resolver.resolve_value(&branch, walk)
        });
        if clean {
            unit.tables
                .values
                .borrow_mut()
                .insert(branch.target(), result.clone());
        }
        result
    }

    /// Runs `compute` as one frame of the walk. The flag tells whether the
    /// frame finished without hitting a guard.
    fn guarded<T>(
        &self,
        query: Query,
        branch: &Branch,
        walk: &mut Walk,
        compute: impl FnOnce(&Self, &mut Walk) -> Option<T>,
    ) -> (Option<T>, bool) {
        let visit = Visit {
            query,
            unit: branch.unit(),
            node: branch.target(),
        };
        if walk.depth >= self.analysis.config.max_depth {
            trace!(?query, node = %visit.node, depth = walk.depth, "depth limit reached");
            walk.aborted = true;
            return (None, false);
        }
        if !walk.visited.insert(visit) {
            trace!(?query, unit = %visit.unit, node = %visit.node, "cycle, path aborted");
            walk.aborted = true;
            return (None, false);
        }
        let outer_aborted = std::mem::replace(&mut walk.aborted, false);
        walk.depth += 1;
        let result = compute(self, walk);
        walk.depth -= 1;
        walk.visited.remove(&visit);
        let clean = !walk.aborted;
        walk.aborted |= outer_aborted;
        (result, clean)
    }

    /// Maps a logical branch (one reached through a namespace entry) onto the
    /// syntactic path of its target, so memoized facts never depend on how a
    /// node was reached.
    fn anchored(&self, ast: &Ast, branch: &Branch) -> Branch {
        let syntactic = branch.nodes().first() == Some(&ast.root())
            && branch.nodes().windows(2).all(|pair| {
                ast.children(pair[0], FieldTable::Full)
                    .any(|child| child == pair[1])
            });
        if syntactic {
            return branch.clone();
        }
        ast.branch_to(branch.target())
            .unwrap_or_else(|| branch.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analysis;

    fn analysis(source: &str) -> (Analysis, UnitId) {
        let mut analysis = Analysis::default();
        let unit = analysis.add_source(source).expect("source parses");
        (analysis, unit)
    }

    fn branch_of(analysis: &Analysis, unit: UnitId, source: &str, needle: &str) -> Branch {
        let offset = u32::try_from(source.rfind(needle).expect("needle present")).expect("fits");
        analysis.branch_at(unit, offset).expect("inside the unit")
    }

    #[test]
    fn clean_results_are_memoized() {
        let source = "local abc = 123; abc;";
        let (analysis, unit) = analysis(source);
        let branch = branch_of(&analysis, unit, source, "abc");
        let resolver = Resolver::new(&analysis);
        let first = resolver.definition(&branch, &mut Walk::new());
        assert!(first.is_some());
        let tables = &analysis.unit(unit).expect("unit").tables;
        assert_eq!(
            tables.definitions.borrow().get(branch.target()).cloned(),
            Some(first.clone())
        );
        assert_eq!(resolver.definition(&branch, &mut Walk::new()), first);
    }

    #[test]
    fn aborted_results_are_not_memoized() {
        let source = "local a = b; local b = a; a;";
        let (analysis, unit) = analysis(source);
        let branch = branch_of(&analysis, unit, source, "a;");
        let resolver = Resolver::new(&analysis);
        let mut walk = Walk::new();
        assert_eq!(resolver.value(&branch, &mut walk), None);
        assert!(walk.visited.is_empty());
        assert_eq!(walk.depth, 0);
        let tables = &analysis.unit(unit).expect("unit").tables;
        assert!(tables.values.borrow().get(branch.target()).is_none());
    }

    #[test]
    fn depth_limit_aborts() {
        let source = "local a = 1; local b = a; local c = b; c;";
        let mut analysis = Analysis::new(crate::config::AnalysisConfig {
            max_depth: 2,
            ..Default::default()
        });
        let unit = analysis.add_source(source).expect("source parses");
        let branch = branch_of(&analysis, unit, source, "c;");
        let resolver = Resolver::new(&analysis);
        assert_eq!(resolver.value(&branch, &mut Walk::new()), None);
    }
}
