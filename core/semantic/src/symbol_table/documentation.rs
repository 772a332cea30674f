//! Finishing step 2: documentation attachment.
//!
//! Each doc comment attaches to the first declaration that starts after it
//! ends. Its attributes are then spread over the side tables: overrides,
//! aliases, augments, deprecation notes and meta properties.

use std::rc::Rc;

use squirrel_ast::{
    doc::{DocAttribute, DocComment},
    nodes::{
        Declaration, Expression, Identifier, Location, Member, MetaProperty, NodeData, NodeId,
        NodeKind, Statement,
    },
};
use tracing::trace;

use super::SymbolTableBuilder;
use crate::symbols::{Symbol, SymbolKind, TokenKind, find_mut};

#[derive(Clone, Copy, Debug)]
enum Accessor {
    Getter,
    Setter,
}

impl SymbolTableBuilder<'_> {
    pub(super) fn attach_documentation(&mut self) {
        let comments = self.ast.comments().to_vec();
        if comments.is_empty() {
            return;
        }
        let candidates = self.attachable_nodes();
        for comment in &comments {
            let index = candidates.partition_point(|(start, _)| *start < comment.location.offset_end);
            match candidates.get(index) {
                Some((_, target)) => self.apply(*target, comment),
                None => trace!(location = %comment.location, "doc comment has no declaration to attach to"),
            }
        }
    }

    /// `(start offset, attachment target)` of every declaration, sorted by
    /// start with outer constructs first.
    fn attachable_nodes(&self) -> Vec<(u32, NodeId)> {
        let mut candidates: Vec<_> = self
            .ast
            .nodes()
            .filter_map(|node| {
                let target = match &node.data {
                    NodeData::Declaration(Declaration::Variable(declaration)) => {
                        *declaration.declarations.first()?
                    }
                    NodeData::Declaration(
                        Declaration::Function(_) | Declaration::Class(_) | Declaration::Enum(_),
                    )
                    | NodeData::Member(
                        Member::Method(_) | Member::Property(_) | Member::EnumMember(_),
                    ) => node.id,
                    NodeData::Statement(Statement::Expression(statement))
                        if self.ast.kind(statement.expression)
                            == Some(NodeKind::AssignmentExpression) =>
                    {
                        statement.expression
                    }
                    _ => return None,
                };
                Some((node.location.offset_start, node.id, target))
            })
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
        candidates
            .into_iter()
            .map(|(start, _, target)| (start, target))
            .collect()
    }

    fn apply(&mut self, target: NodeId, comment: &DocComment) {
        let attributes: Rc<[DocAttribute]> = Rc::from(comment.attributes.as_slice());
        self.tables.docs.insert(target, Rc::clone(&attributes));
        for attribute in attributes.iter() {
            let ty = attribute.ty.as_deref();
            let name = attribute.name.as_deref();
            match attribute.kind.as_str() {
                "deprecated" => {
                    let note = attribute.documentation.clone().unwrap_or_default();
                    self.tables.deprecated.insert(target, note);
                }
                "type" => {
                    let Some(ty) = ty else { continue };
                    if let Some(callable) = self.callable_of(target) {
                        self.tables.return_overrides.insert(callable, ty.to_string());
                    } else {
                        let typed = self.class_of(target).unwrap_or(target);
                        self.tables.type_overrides.insert(typed, ty.to_string());
                    }
                }
                "returns" | "return" => {
                    if let (Some(ty), Some(callable)) = (ty, self.callable_of(target)) {
                        self.tables.return_overrides.insert(callable, ty.to_string());
                    }
                }
                "param" => {
                    if let (Some(ty), Some(name)) = (ty, name)
                        && let Some(param) = self.param_named(target, name)
                    {
                        self.tables.type_overrides.insert(param, ty.to_string());
                    }
                }
                "alias" => {
                    if let (Some(name), Some(class)) = (name, self.class_of(target)) {
                        self.tables.aliases.insert(class, name.to_string());
                    }
                }
                "augments" => {
                    let class = self.class_of(target).or_else(|| self.enclosing_class(target));
                    if let (Some(name), Some(class)) = (name, class) {
                        self.tables.augments.insert(class, name.to_string());
                    }
                }
                "property" => {
                    if let (Some(name), Some(class)) = (name, self.property_owner(target)) {
                        self.add_meta(class, name, attribute, None, comment.location);
                    }
                }
                "getter" | "setter" => {
                    let accessor = if attribute.kind == "getter" {
                        Accessor::Getter
                    } else {
                        Accessor::Setter
                    };
                    if self.ast.kind(target) != Some(NodeKind::MethodDefinition) {
                        continue;
                    }
                    if let (Some(name), Some(class)) = (name, self.enclosing_class(target)) {
                        self.add_meta(
                            class,
                            name,
                            attribute,
                            Some((accessor, target)),
                            comment.location,
                        );
                    }
                }
                _ => {}
            }
        }
    }

    /// Initializer of a declaring node, or the node itself for bare values.
    fn value_of(&self, target: NodeId) -> Option<NodeId> {
        let node = self.ast.get(target)?;
        match &node.data {
            NodeData::Member(Member::Method(method)) => Some(method.value),
            NodeData::Member(Member::Property(property)) => property.value,
            NodeData::Declaration(Declaration::Declarator(declarator)) => declarator.init,
            NodeData::Expression(Expression::Assignment(assignment)) => Some(assignment.right),
            _ => Some(target),
        }
    }

    fn callable_of(&self, target: NodeId) -> Option<NodeId> {
        self.value_of(target)
            .filter(|value| self.ast.kind(*value).is_some_and(NodeKind::is_function))
    }

    fn class_of(&self, target: NodeId) -> Option<NodeId> {
        self.value_of(target)
            .filter(|value| self.ast.kind(*value).is_some_and(NodeKind::is_class))
    }

    fn enclosing_class(&self, target: NodeId) -> Option<NodeId> {
        self.ast
            .branch_to(target)?
            .ending_at_any(&self.ast, NodeKind::is_class)
            .map(|branch| branch.target())
    }

    /// Class receiving an `@property`: the documented class itself, or the
    /// class of a magic accessor method.
    fn property_owner(&self, target: NodeId) -> Option<NodeId> {
        if let Some(class) = self.class_of(target) {
            return Some(class);
        }
        let node = self.ast.get(target)?;
        let NodeData::Member(Member::Method(method)) = &node.data else {
            return None;
        };
        let name = self.ast.identifier_name(method.key)?;
        if name == self.config.magic_getter || name == self.config.magic_setter {
            self.enclosing_class(target)
        } else {
            None
        }
    }

    /// Declaring node of the parameter called `name`.
    fn param_named(&self, target: NodeId, name: &str) -> Option<NodeId> {
        let callable = self.callable_of(target)?;
        self.ast
            .get(callable)?
            .params()?
            .iter()
            .copied()
            .find(|param| {
                let name_node = self
                    .ast
                    .get(*param)
                    .and_then(|node| node.name_node())
                    .unwrap_or(*param);
                self.ast.identifier_name(name_node) == Some(name)
            })
    }

    fn meta_named(&self, class: NodeId, name: &str) -> Option<NodeId> {
        self.tables.meta.get(class)?.iter().copied().find(|meta| {
            self.ast
                .get(*meta)
                .and_then(|node| node.name_node())
                .and_then(|key| self.ast.identifier_name(key))
                == Some(name)
        })
    }

    /// Creates the meta property `name` on `class`, or merges into the one
    /// already there.
    fn add_meta(
        &mut self,
        class: NodeId,
        name: &str,
        attribute: &DocAttribute,
        accessor: Option<(Accessor, NodeId)>,
        location: Location,
    ) {
        let meta = match self.meta_named(class, name) {
            Some(meta) => {
                trace!(%class, name, "merging meta property");
                meta
            }
            None => self.alloc_meta(class, name, attribute, location),
        };
        if let Some(ty) = &attribute.ty
            && !self.tables.type_overrides.contains(meta)
        {
            self.tables.type_overrides.insert(meta, ty.clone());
        }
        if let Some((accessor, method)) = accessor {
            let mut accessors = self
                .tables
                .meta_accessors
                .get(meta)
                .copied()
                .unwrap_or_default();
            match accessor {
                Accessor::Getter => accessors.getter = Some(method),
                Accessor::Setter => accessors.setter = Some(method),
            }
            self.tables.meta_accessors.insert(meta, accessors);
        }
    }

    fn alloc_meta(
        &mut self,
        class: NodeId,
        name: &str,
        attribute: &DocAttribute,
        location: Location,
    ) -> NodeId {
        let key = self.ast.alloc(
            location,
            NodeData::Expression(Expression::Identifier(Identifier {
                name: name.to_string(),
            })),
        );
        let meta = self
            .ast
            .alloc(location, NodeData::Member(Member::Meta(MetaProperty { key })));
        self.declare_name(key, meta, TokenKind::Property);
        self.tables.docs.insert(meta, Rc::from(vec![attribute.clone()]));
        match self.tables.meta.get_mut(class) {
            Some(metas) => metas.push(meta),
            None => {
                self.tables.meta.insert(class, vec![meta]);
            }
        }
        if let Some(symbol) = find_mut(&mut self.symbols, class) {
            symbol.children.push(Symbol {
                name: name.to_string(),
                kind: SymbolKind::Property,
                location,
                selection: location,
                node: meta,
                value: None,
                children: Vec::new(),
            });
        }
        meta
    }
}
