//! The analysis facade: owns the units, runs the namespace step and answers
//! queries.

use squirrel_ast::{
    arena::Ast,
    branch::Branch,
    builder::parse,
    doc::DocAttribute,
    nodes::{Declaration, Expression, Location, NodeData, UnitId},
};
use tracing::{debug, trace};

use crate::{
    config::AnalysisConfig,
    errors::AnalysisError,
    imports::{ImportResolver, NoImports},
    resolver::{MemberEntry, Resolver, Value, Walk},
    symbol_table::SymbolTableBuilder,
    symbols::{self, Symbol, TokenKind},
    tables::{ImportHint, NamespaceEntry, NodeRef},
    type_info::TypeLabel,
    unit::Unit,
};

/// A set of units analysed together.
///
/// Every query starts a fresh [`Walk`] and is answered from the units' side
/// tables, memoizing what it computes on the way.
pub struct Analysis {
    pub(crate) config: AnalysisConfig,
    units: Vec<Option<Unit>>,
    pub(crate) imports: Box<dyn ImportResolver>,
}

impl Default for Analysis {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Analysis {
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            units: Vec::new(),
            imports: Box::new(NoImports),
        }
    }

    /// Swaps the import resolver. Owner expressions of qualified
    /// declarations are looked up again under the new imports.
    pub fn set_import_resolver(&mut self, imports: impl ImportResolver + 'static) {
        self.imports = Box::new(imports);
        self.clear_memo();
        self.refresh_namespaces(None);
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().flatten()
    }

    /// Adds a parsed unit and runs its whole build pipeline. Qualified
    /// declarations of the other units are recorded again, since their owner
    /// may live in the new unit.
    pub fn add_unit(&mut self, ast: Ast) -> UnitId {
        let id = self.insert_unit(ast);
        self.clear_memo();
        self.refresh_namespaces(Some(id));
        self.resolve_namespaces(id, true);
        id
    }

    /// Parses `source` and adds it as a new unit.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Parse`] when the source does not parse.
    pub fn add_source(&mut self, source: &str) -> Result<UnitId, AnalysisError> {
        Ok(self.add_unit(parse(source)?))
    }

    /// Rebuilds unit `id` from a new tree. Memoized facts of every unit are
    /// dropped since they may point into the old tree.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownUnit`] when `id` is not loaded.
    pub fn replace_unit(&mut self, id: UnitId, ast: Ast) -> Result<(), AnalysisError> {
        if self.unit(id).is_none() {
            return Err(AnalysisError::UnknownUnit(id));
        }
        debug!(unit = %id, "replacing unit");
        let unit = SymbolTableBuilder::new(&self.config, ast, id).build();
        self.units[id.0 as usize] = Some(unit);
        self.clear_memo();
        self.refresh_namespaces(Some(id));
        self.resolve_namespaces(id, true);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AnalysisError::Parse`] when the source does not parse and
    /// [`AnalysisError::UnknownUnit`] when `id` is not loaded.
    pub fn replace_source(&mut self, id: UnitId, source: &str) -> Result<(), AnalysisError> {
        self.replace_unit(id, parse(source)?)
    }

    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownUnit`] when `id` is not loaded.
    pub fn remove_unit(&mut self, id: UnitId) -> Result<Unit, AnalysisError> {
        let unit = self
            .units
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(AnalysisError::UnknownUnit(id))?;
        debug!(unit = %id, "unit removed");
        self.clear_memo();
        self.refresh_namespaces(Some(id));
        Ok(unit)
    }

    /// Runs the build pass and the first two finishing steps.
    pub(crate) fn insert_unit(&mut self, ast: Ast) -> UnitId {
        let id = UnitId(u32::try_from(self.units.len()).unwrap_or(u32::MAX));
        let unit = SymbolTableBuilder::new(&self.config, ast, id).build();
        self.units.push(Some(unit));
        id
    }

    /// Finishing step 3 for one unit: records each qualified declaration
    /// under the value of its owner expression and, for owners in the same
    /// unit, moves its symbol under the owner's symbol.
    pub(crate) fn resolve_namespaces(&mut self, id: UnitId, reparent: bool) {
        let pending = match self.unit(id) {
            Some(unit) => unit.pending_namespaces.clone(),
            None => return,
        };
        for declaration in &pending {
            let resolved = {
                let resolver = Resolver::new(self);
                self.qualified_parts(declaration).and_then(|(owner, name)| {
                    let value = resolver.value(&owner, &mut Walk::new())?;
                    Some((value.branch()?.clone(), name))
                })
            };
            self.clear_memo();
            let Some((owner, name)) = resolved else {
                trace!(unit = %id, node = %declaration.target(), "namespace owner unresolved");
                continue;
            };
            let Some(Some(unit)) = self.units.get_mut(id.0 as usize) else {
                return;
            };
            unit.tables
                .namespaces
                .entry(NodeRef::of(&owner))
                .or_default()
                .push(NamespaceEntry {
                    name,
                    declaration: declaration.clone(),
                });
            if reparent && owner.unit() == id {
                Self::reparent_symbol(&mut unit.symbols, declaration, &owner);
            }
        }
        debug!(unit = %id, declarations = pending.len(), "namespaces resolved");
    }

    /// Owner expression and member name of a qualified declaration.
    fn qualified_parts(&self, declaration: &Branch) -> Option<(Branch, String)> {
        let unit = self.unit(declaration.unit())?;
        let ast = unit.ast();
        let (owner, name_node) = match &ast.get(declaration.target())?.data {
            NodeData::Declaration(Declaration::Function(function)) => {
                (declaration.child(function.qualifier?), function.id)
            }
            NodeData::Declaration(Declaration::Class(class)) => {
                (declaration.child(class.qualifier?), class.id)
            }
            NodeData::Expression(Expression::Assignment(assignment)) => {
                let member = ast.get(assignment.left)?.as_member()?;
                let left = declaration.child(assignment.left);
                (left.child(member.object), member.property)
            }
            _ => return None,
        };
        let name = unit.tables.key_name(ast, name_node)?.to_string();
        Some((owner, name))
    }

    fn reparent_symbol(symbols: &mut Vec<Symbol>, declaration: &Branch, owner: &Branch) {
        let target = declaration.target();
        if symbols::find_mut(symbols, owner.target()).is_none() {
            return;
        }
        let Some(symbol) = symbols::take(symbols, target) else {
            return;
        };
        match symbols::find_mut(symbols, owner.target()) {
            Some(parent) => parent.children.push(symbol),
            None => symbols.push(symbol),
        }
    }

    /// Re-records the namespace entries of every unit but `changed`, which
    /// may name owners in a unit that just changed.
    fn refresh_namespaces(&mut self, changed: Option<UnitId>) {
        let others: Vec<UnitId> = self
            .units()
            .map(Unit::id)
            .filter(|id| Some(*id) != changed)
            .collect();
        for id in &others {
            if let Some(Some(unit)) = self.units.get_mut(id.0 as usize) {
                unit.tables.namespaces.clear();
            }
        }
        for id in others {
            self.resolve_namespaces(id, false);
        }
    }

    pub(crate) fn clear_memo(&self) {
        for unit in self.units() {
            unit.tables.clear_memo();
        }
    }

    /// Branch to the innermost node at `offset` in unit `id`.
    #[must_use]
    pub fn branch_at(&self, id: UnitId, offset: u32) -> Option<Branch> {
        self.unit(id)?.ast().branch_at(offset)
    }

    /// Declaring construct of the reference at `branch`, `None` when
    /// unresolved.
    #[must_use]
    pub fn resolve_definition(&self, branch: &Branch) -> Option<Branch> {
        Resolver::new(self).definition(branch, &mut Walk::new())
    }

    #[must_use]
    pub fn definition_at(&self, id: UnitId, offset: u32) -> Option<Branch> {
        self.resolve_definition(&self.branch_at(id, offset)?)
    }

    /// Ultimate value of the expression at `branch`, `None` when unresolved.
    #[must_use]
    pub fn resolve_value(&self, branch: &Branch) -> Option<Value> {
        Resolver::new(self).value(branch, &mut Walk::new())
    }

    #[must_use]
    pub fn infer_type(&self, branch: &Branch) -> TypeLabel {
        Resolver::new(self).infer_type(branch, &mut Walk::new())
    }

    /// Superclasses of the class at `class`, nearest first.
    #[must_use]
    pub fn superclass_chain(&self, class: &Branch) -> Vec<Branch> {
        Resolver::new(self).superclass_chain(class, &mut Walk::new())
    }

    /// Members visible on the value of `branch`, closest level first.
    #[must_use]
    pub fn members(&self, branch: &Branch) -> Vec<MemberEntry> {
        let resolver = Resolver::new(self);
        let mut walk = Walk::new();
        match resolver.value(branch, &mut walk) {
            Some(value) => resolver.members(&value, &mut walk),
            None => Vec::new(),
        }
    }

    /// Member `name` of the value of `branch`, searched like `value.name`.
    #[must_use]
    pub fn find_member(&self, branch: &Branch, name: &str) -> Option<Branch> {
        let resolver = Resolver::new(self);
        let mut walk = Walk::new();
        let value = resolver.value(branch, &mut walk)?;
        resolver.find_member(&value, name, None, &mut walk)
    }

    #[must_use]
    pub fn document_symbols(&self, id: UnitId) -> &[Symbol] {
        self.unit(id).map_or(&[], Unit::symbols)
    }

    #[must_use]
    pub fn import_hints(&self, id: UnitId) -> &[ImportHint] {
        self.unit(id).map_or(&[], Unit::import_hints)
    }

    #[must_use]
    pub fn semantic_tokens(&self, id: UnitId) -> Vec<(Location, TokenKind)> {
        self.unit(id).map(Unit::semantic_tokens).unwrap_or_default()
    }

    /// Documentation of the definition of `branch`.
    #[must_use]
    pub fn documentation(&self, branch: &Branch) -> Option<&[DocAttribute]> {
        let definition = self.resolve_definition(branch)?;
        self.unit(definition.unit())?.documentation(definition.target())
    }

    #[must_use]
    pub fn is_deprecated(&self, branch: &Branch) -> bool {
        self.resolve_definition(branch).is_some_and(|definition| {
            self.unit(definition.unit())
                .is_some_and(|unit| unit.is_deprecated(definition.target()))
        })
    }
}
