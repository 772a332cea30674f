//! Path-based ancestry.
//!
//! Nodes carry no parent pointers. A [`Branch`] is the ordered path from the
//! unit root to a target node and is rebuilt by whoever walks the tree. A
//! branch may also describe *logical* ownership: a namespaced declaration can
//! be reached through its owner's branch even though it is parsed elsewhere.

use serde::{Deserialize, Serialize};

use crate::{
    arena::Ast,
    fields::FieldTable,
    nodes::{NodeId, NodeKind, UnitId},
};

/// Non-empty node path from a unit root to a target.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Branch {
    unit: UnitId,
    nodes: Vec<NodeId>,
}

impl Branch {
    #[must_use]
    pub fn root(ast: &Ast) -> Self {
        Self {
            unit: ast.unit(),
            nodes: vec![ast.root()],
        }
    }

    /// `None` when `nodes` is empty.
    #[must_use]
    pub fn from_nodes(unit: UnitId, nodes: Vec<NodeId>) -> Option<Self> {
        if nodes.is_empty() {
            None
        } else {
            Some(Self { unit, nodes })
        }
    }

    #[must_use]
    pub fn unit(&self) -> UnitId {
        self.unit
    }

    #[must_use]
    pub fn target(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Target's parent, absent for a root-only branch.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.nodes.len().checked_sub(2).map(|index| self.nodes[index])
    }

    /// Branch of the parent, absent for a root-only branch.
    #[must_use]
    pub fn parent_branch(&self) -> Option<Branch> {
        (self.nodes.len() > 1).then(|| self.truncated(self.nodes.len() - 1))
    }

    /// Extends the path by one node.
    #[must_use]
    pub fn child(&self, id: NodeId) -> Branch {
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.extend_from_slice(&self.nodes);
        nodes.push(id);
        Branch {
            unit: self.unit,
            nodes,
        }
    }

    pub fn push(&mut self, id: NodeId) {
        self.nodes.push(id);
    }

    /// Removes the target unless it is the only node left.
    pub fn pop(&mut self) -> Option<NodeId> {
        if self.nodes.len() > 1 {
            self.nodes.pop()
        } else {
            None
        }
    }

    /// Keeps the first `len` nodes, never fewer than one.
    #[must_use]
    pub fn truncated(&self, len: usize) -> Branch {
        let len = len.clamp(1, self.nodes.len());
        Branch {
            unit: self.unit,
            nodes: self.nodes[..len].to_vec(),
        }
    }

    /// Trims back to the nearest node of `kind`, the target included.
    #[must_use]
    pub fn ending_at(&self, ast: &Ast, kind: NodeKind) -> Option<Branch> {
        self.ending_at_any(ast, |k| k == kind)
    }

    #[must_use]
    pub fn ending_at_any(&self, ast: &Ast, accept: impl Fn(NodeKind) -> bool) -> Option<Branch> {
        self.nodes
            .iter()
            .rposition(|id| ast.kind(*id).is_some_and(&accept))
            .map(|index| self.truncated(index + 1))
    }

    /// `(index, id)` pairs from the target's parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.nodes
            .iter()
            .copied()
            .enumerate()
            .rev()
            .skip(1)
    }
}

impl Ast {
    /// Path to the innermost node whose range contains `offset`. At each level
    /// the first child in document order that contains the offset wins.
    #[must_use]
    pub fn branch_at(&self, offset: u32) -> Option<Branch> {
        let root = self.get(self.root())?;
        if !root.location.contains_offset(offset) {
            return None;
        }
        let mut branch = Branch::root(self);
        loop {
            let next = self
                .children(branch.target(), FieldTable::Full)
                .find(|child| {
                    self.get(*child)
                        .is_some_and(|node| node.location.contains_offset(offset))
                });
            match next {
                Some(child) => branch.push(child),
                None => return Some(branch),
            }
        }
    }

    /// Path from the root to `target`, found by descending through ranges.
    #[must_use]
    pub fn branch_to(&self, target: NodeId) -> Option<Branch> {
        let location = self.location(target)?;
        let mut branch = Branch::root(self);
        while branch.target() != target {
            // Subtrees are stored children-first, so an ancestor's id is larger.
            let next = self.children(branch.target(), FieldTable::Full).find(|child| {
                *child == target
                    || (*child > target
                        && self
                            .get(*child)
                            .is_some_and(|node| node.location.contains(&location)))
            })?;
            branch.push(next);
        }
        Some(branch)
    }
}
