//! Static import relation between units.
//!
//! Discovering which files a unit imports is left to the host. The analysis
//! only asks, for a given unit, which other units' top-level scopes are
//! visible from it.

use rustc_hash::FxHashMap;
use squirrel_ast::nodes::UnitId;

pub trait ImportResolver {
    /// Units whose top-level declarations are visible from `unit`, in lookup order.
    fn imports(&self, unit: UnitId) -> Vec<UnitId>;
}

/// Every unit stands alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoImports;

impl ImportResolver for NoImports {
    fn imports(&self, _unit: UnitId) -> Vec<UnitId> {
        Vec::new()
    }
}

/// Fixed import lists registered up front.
#[derive(Clone, Debug, Default)]
pub struct StaticImports {
    edges: FxHashMap<UnitId, Vec<UnitId>>,
}

impl StaticImports {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `imported` visible from `unit`.
    #[must_use]
    pub fn with(mut self, unit: UnitId, imported: UnitId) -> Self {
        self.add(unit, imported);
        self
    }

    pub fn add(&mut self, unit: UnitId, imported: UnitId) {
        let edges = self.edges.entry(unit).or_default();
        if !edges.contains(&imported) {
            edges.push(imported);
        }
    }
}

impl ImportResolver for StaticImports {
    fn imports(&self, unit: UnitId) -> Vec<UnitId> {
        self.edges.get(&unit).cloned().unwrap_or_default()
    }
}

impl<F> ImportResolver for F
where
    F: Fn(UnitId) -> Vec<UnitId>,
{
    fn imports(&self, unit: UnitId) -> Vec<UnitId> {
        self(unit)
    }
}
