//! Superclass chains and member search.
//!
//! Members are searched one level at a time, the value itself first and then
//! each ancestor class, nearest first. A level is made of its parsed members,
//! its meta properties and the namespace entries recorded for it by any unit.

use rustc_hash::FxHashSet;
use serde::Serialize;
use squirrel_ast::{
    branch::Branch,
    fields::FieldTable,
    nodes::{Declaration, Expression, NodeData, NodeKind},
};
use tracing::trace;

use super::{Resolver, Value, Walk};
use crate::tables::NodeRef;

/// A member visible on a value, with the inheritance level it was found at
/// (0 for the value itself).
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct MemberEntry {
    pub name: String,
    pub branch: Branch,
    pub level: usize,
}

impl Resolver<'_> {
    pub(super) fn superclass_of(&self, class: &Branch, walk: &mut Walk) -> Option<Branch> {
        let (superclass, _) = self.ast(class)?.get(class.target())?.class_parts()?;
        let value = self.value(&class.child(superclass?), walk)?;
        let branch = value.branch()?;
        self.kind(branch)
            .is_some_and(NodeKind::is_class)
            .then(|| branch.clone())
    }

    /// Ancestors of `class`, nearest first. Stops at a class without
    /// superclass, an unresolvable superclass or a class already seen.
    pub(crate) fn superclass_chain(&self, class: &Branch, walk: &mut Walk) -> Vec<Branch> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(NodeRef::of(class));
        let mut current = class.clone();
        while let Some(superclass) = self.superclass_of(&current, walk) {
            if !seen.insert(NodeRef::of(&superclass)) {
                trace!(class = %class.target(), "inheritance cycle");
                break;
            }
            chain.push(superclass.clone());
            current = superclass;
        }
        chain
    }

    /// Levels searched for members of `value`.
    fn levels(&self, value: &Value, walk: &mut Walk) -> Vec<Branch> {
        let Some(branch) = value.branch() else {
            return Vec::new();
        };
        let mut levels = vec![branch.clone()];
        if self.kind(branch).is_some_and(NodeKind::is_class) {
            levels.extend(self.superclass_chain(branch, walk));
        }
        levels
    }

    /// Closest member called `name`. Variations declared at the same level
    /// are told apart by `arity`, the argument count of the call using it.
    pub(crate) fn find_member(
        &self,
        value: &Value,
        name: &str,
        arity: Option<usize>,
        walk: &mut Walk,
    ) -> Option<Branch> {
        self.levels(value, walk).iter().find_map(|level| {
            let candidates = self
                .own_members(level)
                .into_iter()
                .filter_map(|(member, branch)| (member == name).then_some(branch));
            self.select_variation(candidates, arity)
        })
    }

    /// Every member visible on `value`; a name found at a closer level hides
    /// the same name further up.
    pub(crate) fn members(&self, value: &Value, walk: &mut Walk) -> Vec<MemberEntry> {
        let mut seen = FxHashSet::default();
        let mut entries = Vec::new();
        for (level, owner) in self.levels(value, walk).iter().enumerate() {
            for (name, branch) in self.own_members(owner) {
                if seen.insert(name.clone()) {
                    entries.push(MemberEntry {
                        name,
                        branch,
                        level,
                    });
                }
            }
        }
        entries
    }

    /// Members declared directly on `owner`, in source order, followed by
    /// meta properties and namespace entries.
    fn own_members(&self, owner: &Branch) -> Vec<(String, Branch)> {
        let Some(unit) = self.unit(owner.unit()) else {
            return Vec::new();
        };
        let ast = unit.ast();
        let Some(node) = ast.get(owner.target()) else {
            return Vec::new();
        };
        let mut members = Vec::new();
        let mut push_named = |parent: &Branch, member| {
            let name = ast
                .get(member)
                .and_then(|node| node.name_node())
                .and_then(|key| unit.tables.key_name(ast, key));
            if let Some(name) = name {
                members.push((name.to_string(), parent.child(member)));
            }
        };
        match &node.data {
            _ if node.kind().is_class() => {
                if let Some((_, body)) = node.class_parts() {
                    let body_branch = owner.child(body);
                    for member in ast.children(body, FieldTable::Full) {
                        push_named(&body_branch, member);
                    }
                }
                for meta in unit.tables.meta.get(owner.target()).into_iter().flatten() {
                    push_named(owner, *meta);
                }
            }
            NodeData::Expression(Expression::Table(table)) => {
                for property in &table.properties {
                    push_named(owner, *property);
                }
            }
            NodeData::Declaration(Declaration::Enum(declaration)) => {
                for member in &declaration.members {
                    push_named(owner, *member);
                }
            }
            _ => {}
        }
        let key = NodeRef::of(owner);
        for declaring in self.analysis.units() {
            for entry in declaring.tables.namespaces.get(&key).into_iter().flatten() {
                let branch = if entry.declaration.unit() == owner.unit() {
                    owner.child(entry.declaration.target())
                } else {
                    entry.declaration.clone()
                };
                members.push((entry.name.clone(), branch));
            }
        }
        members
    }
}
