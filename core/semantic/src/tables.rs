//! Per-unit side tables.
//!
//! Facts about nodes are stored in [`NodeTable`]s, parallel arrays indexed by
//! [`NodeId`]. They are owned by the [`Unit`](crate::unit::Unit) and dropped
//! with it. The two memo tables are the only ones written after the unit is
//! built; they live behind `RefCell` so that queries can take `&self`.

use std::{cell::RefCell, rc::Rc};

use rustc_hash::FxHashMap;
use serde::Serialize;
use squirrel_ast::{
    arena::Ast,
    branch::Branch,
    doc::DocAttribute,
    nodes::{Location, NodeId, UnitId},
};

use crate::{resolver::Value, symbols::TokenKind};

/// Dense map keyed by node index.
#[derive(Clone, Debug)]
pub struct NodeTable<T> {
    entries: Vec<Option<T>>,
}

impl<T> Default for NodeTable<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> NodeTable<T> {
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.entries.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.entries.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn insert(&mut self, id: NodeId, value: T) -> Option<T> {
        let index = id.index();
        if index >= self.entries.len() {
            self.entries.resize_with(index + 1, || None);
        }
        self.entries[index].replace(value)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.entries.iter().enumerate().filter_map(|(index, entry)| {
            let id = NodeId(u32::try_from(index).ok()?);
            entry.as_ref().map(|value| (id, value))
        })
    }
}

/// Links a name-carrying node to the construct it introduces.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DeclarationEntry {
    pub declaring: NodeId,
    pub token: TokenKind,
}

/// A name visible in a lexical scope, with the path to its declaring node.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ScopedName {
    pub name: String,
    pub declaration: Branch,
}

/// Identity of a node across units, used for cross-unit tables.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct NodeRef {
    pub unit: UnitId,
    pub node: NodeId,
}

impl NodeRef {
    #[must_use]
    pub fn of(branch: &Branch) -> Self {
        Self {
            unit: branch.unit(),
            node: branch.target(),
        }
    }
}

/// Declaration attached to an owner through a qualified name.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NamespaceEntry {
    pub name: String,
    /// Syntactic branch of the declaration in its own unit.
    pub declaration: Branch,
}

/// Accessors backing a meta property.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MetaAccessors {
    pub getter: Option<NodeId>,
    pub setter: Option<NodeId>,
}

/// Literal first argument of an import-like call.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct ImportHint {
    pub function: String,
    pub path: String,
    pub call: NodeId,
    pub location: Location,
}

#[derive(Debug, Default)]
pub struct SideTables {
    pub declarations: NodeTable<DeclarationEntry>,
    pub scopes: FxHashMap<NodeId, Vec<ScopedName>>,
    /// Literal string keys read as plain names (`obj["x"]`, `"x": 1`).
    pub normalized_keys: NodeTable<String>,
    pub tokens: NodeTable<TokenKind>,
    pub docs: NodeTable<Rc<[DocAttribute]>>,
    /// Deprecation note, empty when none was given.
    pub deprecated: NodeTable<String>,
    pub type_overrides: NodeTable<String>,
    /// Keyed by the callable (function declaration or expression, lambda).
    pub return_overrides: NodeTable<String>,
    pub aliases: NodeTable<String>,
    /// Constructor parameter a wrapper class delegates to.
    pub augments: NodeTable<String>,
    /// Meta properties per class.
    pub meta: NodeTable<Vec<NodeId>>,
    pub meta_accessors: NodeTable<MetaAccessors>,
    /// Qualified declarations of this unit keyed by their resolved owner.
    pub namespaces: FxHashMap<NodeRef, Vec<NamespaceEntry>>,
    pub definitions: RefCell<NodeTable<Option<Branch>>>,
    pub values: RefCell<NodeTable<Option<Value>>>,
}

impl SideTables {
    pub fn clear_memo(&self) {
        self.definitions.borrow_mut().clear();
        self.values.borrow_mut().clear();
    }

    /// Name a member key stands for, plain or normalized.
    #[must_use]
    pub fn key_name<'a>(&'a self, ast: &'a Ast, key: NodeId) -> Option<&'a str> {
        ast.identifier_name(key)
            .or_else(|| self.normalized_keys.get(key).map(String::as_str))
    }
}
