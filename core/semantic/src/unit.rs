use squirrel_ast::{
    arena::Ast,
    branch::Branch,
    doc::DocAttribute,
    nodes::{Location, NodeId, UnitId},
};

use crate::{
    symbols::{Symbol, TokenKind},
    tables::{ImportHint, SideTables},
};

/// One parsed source together with everything the build pass derived from it.
///
/// Replacing the source means building a new unit; nothing here is updated
/// incrementally except the memo tables.
#[derive(Debug)]
pub struct Unit {
    pub(crate) id: UnitId,
    pub(crate) ast: Ast,
    pub(crate) tables: SideTables,
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) hints: Vec<ImportHint>,
    pub(crate) literal_strings: Vec<NodeId>,
    /// Qualified declarations waiting for their owner to be resolved.
    pub(crate) pending_namespaces: Vec<Branch>,
}

impl Unit {
    #[must_use]
    pub fn id(&self) -> UnitId {
        self.id
    }

    #[must_use]
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    #[must_use]
    pub fn tables(&self) -> &SideTables {
        &self.tables
    }

    /// Hierarchical outline of the unit.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    #[must_use]
    pub fn import_hints(&self) -> &[ImportHint] {
        &self.hints
    }

    /// Every string literal of the unit, in document order.
    #[must_use]
    pub fn literal_strings(&self) -> &[NodeId] {
        &self.literal_strings
    }

    #[must_use]
    pub fn token(&self, node: NodeId) -> Option<TokenKind> {
        self.tables.tokens.get(node).copied()
    }

    /// Identifier tokens sorted by position.
    #[must_use]
    pub fn semantic_tokens(&self) -> Vec<(Location, TokenKind)> {
        let mut tokens: Vec<_> = self
            .tables
            .tokens
            .iter()
            .filter(|(node, _)| !self.ast.is_synthetic(*node))
            .filter_map(|(node, token)| Some((self.ast.location(node)?, *token)))
            .collect();
        tokens.sort_by_key(|(location, _)| location.offset_start);
        tokens
    }

    /// Documentation attached to a declaring node.
    #[must_use]
    pub fn documentation(&self, node: NodeId) -> Option<&[DocAttribute]> {
        self.tables.docs.get(node).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn is_deprecated(&self, node: NodeId) -> bool {
        self.tables.deprecated.contains(node)
    }

    /// Declaring node introduced by a name node.
    #[must_use]
    pub fn declaration(&self, name: NodeId) -> Option<NodeId> {
        self.tables.declarations.get(name).map(|entry| entry.declaring)
    }
}
