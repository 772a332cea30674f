use squirrel_ast::{
    arena::Ast,
    branch::Branch,
    fields::FieldTable,
    nodes::{Declaration, Expression, Member, MethodKind, NodeData, NodeKind, Pattern},
};
use tracing::trace;

use super::{Resolver, Value, Walk};
use crate::{symbol_table::is_scope, tables::ScopedName, type_info::TypeLabel};

/// Nodes whose definition lies elsewhere and is worth memoizing.
pub(super) fn is_reference(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Identifier
            | NodeKind::MemberExpression
            | NodeKind::RootExpression
            | NodeKind::ThisExpression
            | NodeKind::BaseExpression
            | NodeKind::CallExpression
    )
}

/// Nodes that are their own declaration.
fn is_declaring(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::VariableDeclarator
            | NodeKind::FunctionDeclaration
            | NodeKind::ClassDeclaration
            | NodeKind::EnumDeclaration
            | NodeKind::MethodDefinition
            | NodeKind::PropertyDefinition
            | NodeKind::EnumMember
            | NodeKind::MetaProperty
            | NodeKind::AssignmentPattern
            | NodeKind::AssignmentExpression
    )
}

/// Argument count of the call whose callee is the node at the end of
/// `branch`.
fn call_arity(ast: &Ast, branch: &Branch) -> Option<usize> {
    let parent = branch.parent_branch()?;
    let call = ast.get(parent.target())?.as_call()?;
    (call.callee == branch.target()).then_some(call.arguments.len())
}

impl Resolver<'_> {
    pub(super) fn resolve_definition(&self, branch: &Branch, walk: &mut Walk) -> Option<Branch> {
        let ast = self.ast(branch)?;
        let node = ast.get(branch.target())?;
        match &node.data {
            NodeData::Expression(Expression::Identifier(_)) => {
                self.resolve_identifier(branch, walk)
            }
            NodeData::Expression(Expression::Member(member)) => {
                let tables = &self.unit(branch.unit())?.tables;
                // A computed key names a member only when it is a literal.
                let name = if member.computed {
                    tables.normalized_keys.get(member.property)?.clone()
                } else {
                    ast.identifier_name(member.property)?.to_string()
                };
                let arity = call_arity(ast, branch);
                self.resolve_member(&branch.child(member.object), &name, arity, walk)
            }
            NodeData::Expression(Expression::Root(root)) => {
                let name = ast.identifier_name(root.property)?;
                self.lookup_root(branch, name)
            }
            NodeData::Expression(Expression::This) => self
                .this_value(branch, walk)
                .and_then(|value| value.branch().cloned()),
            NodeData::Expression(Expression::Base) => self.base_class(branch, walk),
            NodeData::Expression(Expression::Call(call)) => {
                self.definition(&branch.child(call.callee), walk)
            }
            NodeData::Expression(Expression::Assignment(assignment))
                if !node.is_newslot() =>
            {
                self.definition(&branch.child(assignment.left), walk)
            }
            _ if is_declaring(node.kind()) => Some(branch.clone()),
            _ => None,
        }
    }

    fn resolve_identifier(&self, branch: &Branch, walk: &mut Walk) -> Option<Branch> {
        let unit = self.unit(branch.unit())?;
        let ast = unit.ast();
        let id = branch.target();

        if let Some(entry) = unit.tables.declarations.get(id) {
            if entry.declaring == id {
                return Some(branch.clone());
            }
            return match branch.nodes().iter().rposition(|node| *node == entry.declaring) {
                Some(index) => Some(branch.truncated(index + 1)),
                None => ast.branch_to(entry.declaring),
            };
        }

        let parent = branch.parent_branch();
        if let Some(parent) = &parent {
            match &ast.get(parent.target())?.data {
                NodeData::Expression(Expression::Member(member))
                    if member.property == id && !member.computed =>
                {
                    return self.definition(parent, walk);
                }
                NodeData::Expression(Expression::Root(root)) if root.property == id => {
                    return self.definition(parent, walk);
                }
                _ => {}
            }
        }

        let name = ast.identifier_name(id)?;
        self.lookup_name(branch, name, call_arity(ast, branch), walk)
    }

    /// Looks `name` up from the position of `branch`: enclosing scopes
    /// outward, then the top level of every imported unit.
    pub(super) fn lookup_name(
        &self,
        branch: &Branch,
        name: &str,
        arity: Option<usize>,
        walk: &mut Walk,
    ) -> Option<Branch> {
        let unit = self.unit(branch.unit())?;
        let ast = unit.ast();
        for (index, ancestor) in branch.ancestors() {
            let Some(node) = ast.get(ancestor) else {
                continue;
            };
            let kind = node.kind();
            if is_scope(kind)
                && let Some(scoped) = unit.tables.scopes.get(&ancestor)
                && let Some(found) = self.pick_variation(scoped, name, arity)
            {
                return Some(found);
            }
            // Only code inside the body sees members; the superclass
            // expression and the qualifier are looked up outside.
            let inner = branch.nodes().get(index + 1).copied();
            if let Some((_, body)) = node.class_parts()
                && inner == Some(body)
            {
                let class = Value::instance(branch.truncated(index + 1), None);
                if let Some(found) = self.find_member(&class, name, arity, walk) {
                    return Some(found);
                }
            }
            if let NodeData::Declaration(Declaration::Function(function)) = &node.data
                && let Some(qualifier) = function.qualifier
                && inner == Some(function.body)
            {
                let owner = self.value(&branch.truncated(index + 1).child(qualifier), walk);
                if let Some(found) =
                    owner.and_then(|owner| self.find_member(&owner, name, arity, walk))
                {
                    return Some(found);
                }
            }
        }
        self.lookup_imported(branch, name, arity)
    }

    /// `::name`: the unit root first, then the imported units.
    fn lookup_root(&self, branch: &Branch, name: &str) -> Option<Branch> {
        let unit = self.unit(branch.unit())?;
        unit.tables
            .scopes
            .get(&unit.ast().root())
            .and_then(|scoped| self.pick_variation(scoped, name, None))
            .or_else(|| self.lookup_imported(branch, name, None))
    }

    fn lookup_imported(&self, branch: &Branch, name: &str, arity: Option<usize>) -> Option<Branch> {
        for imported in self.analysis.imports.imports(branch.unit()) {
            let Some(unit) = self.unit(imported) else {
                trace!(%imported, "import names a unit that is not loaded");
                continue;
            };
            let root = unit.ast().root();
            if let Some(found) = unit
                .tables
                .scopes
                .get(&root)
                .and_then(|scoped| self.pick_variation(scoped, name, arity))
            {
                return Some(found);
            }
        }
        None
    }

    fn pick_variation(
        &self,
        scoped: &[ScopedName],
        name: &str,
        arity: Option<usize>,
    ) -> Option<Branch> {
        let candidates = scoped
            .iter()
            .filter(|scoped| scoped.name == name)
            .map(|scoped| scoped.declaration.clone());
        self.select_variation(candidates, arity)
    }

    /// Among same-named declarations, the first whose parameter count admits
    /// `arity` arguments, else the first in source order.
    pub(super) fn select_variation(
        &self,
        candidates: impl IntoIterator<Item = Branch>,
        arity: Option<usize>,
    ) -> Option<Branch> {
        let mut candidates = candidates.into_iter().peekable();
        let first = candidates.peek()?.clone();
        match arity {
            Some(arguments) if arguments > 0 => Some(
                candidates
                    .find(|candidate| {
                        self.parameter_count(candidate)
                            .is_some_and(|count| count >= arguments)
                    })
                    .unwrap_or(first),
            ),
            _ => Some(first),
        }
    }

    /// Declared parameter count of a callable declaration. A rest parameter
    /// admits any number of arguments.
    fn parameter_count(&self, declaration: &Branch) -> Option<usize> {
        let ast = self.ast(declaration)?;
        let node = ast.get(declaration.target())?;
        let callable = match &node.data {
            NodeData::Declaration(Declaration::Declarator(declarator)) => declarator.init?,
            NodeData::Expression(Expression::Assignment(assignment)) => assignment.right,
            NodeData::Member(Member::Method(method)) => method.value,
            _ => declaration.target(),
        };
        let params = ast.get(callable)?.params()?;
        let rest = params.iter().any(|param| {
            ast.get(*param)
                .is_some_and(|param| matches!(param.data, NodeData::Pattern(Pattern::Rest)))
        });
        Some(if rest { usize::MAX } else { params.len() })
    }

    /// Member `name` of the value of `object`: its own members first, then
    /// those of its documented type, then those reachable through augments
    /// delegation at the construction site.
    pub(super) fn resolve_member(
        &self,
        object: &Branch,
        name: &str,
        arity: Option<usize>,
        walk: &mut Walk,
    ) -> Option<Branch> {
        let value = self.value(object, walk);
        if let Some(value) = &value
            && let Some(found) = self.find_member(value, name, arity, walk)
        {
            return Some(found);
        }

        if let Some(declared) = self.declared_type_of(object, walk)
            && let Some(found) = self.find_member(&declared, name, arity, walk)
        {
            return Some(found);
        }

        if let Some(Value::Node {
            branch: class,
            instance: true,
            call: Some(call),
        }) = &value
        {
            return self.augmented_member(class, call, name, arity, walk);
        }
        None
    }

    /// Class named by the type annotation on the definition of `branch`.
    fn declared_type_of(&self, branch: &Branch, walk: &mut Walk) -> Option<Value> {
        let definition = self.definition(branch, walk)?;
        let annotation = self
            .unit(definition.unit())?
            .tables
            .type_overrides
            .get(definition.target())?;
        self.lookup_type(&definition, annotation, walk)
    }

    /// Resolves a dotted type name written in documentation, as seen from
    /// `context`. Classes come back as instances. Builtin names resolve to
    /// nothing.
    pub(super) fn lookup_type(&self, context: &Branch, name: &str, walk: &mut Walk) -> Option<Value> {
        if !matches!(TypeLabel::from_annotation(name), TypeLabel::Nominal(_)) {
            return None;
        }
        let mut segments = name.split('.');
        let first = segments.next()?;
        let mut current = match self.lookup_name(context, first, None, walk) {
            Some(declaration) => self.value(&declaration, walk)?,
            None => self.lookup_alias(first)?,
        };
        for segment in segments {
            let member = self.find_member(&current, segment, None, walk)?;
            current = self.value(&member, walk)?;
        }
        match current {
            Value::Node { branch, .. } if self.kind(&branch).is_some_and(NodeKind::is_class) => {
                Some(Value::instance(branch, None))
            }
            other => Some(other),
        }
    }

    /// Class carrying `@alias name` in any loaded unit.
    fn lookup_alias(&self, name: &str) -> Option<Value> {
        self.analysis.units().find_map(|unit| {
            let (class, _) = unit
                .tables
                .aliases
                .iter()
                .find(|(_, alias)| alias.as_str() == name)?;
            Some(Value::instance(unit.ast().branch_to(class)?, None))
        })
    }

    /// Forwards a member lookup to the constructor argument named by the
    /// class's `@augments` tag. One level only.
    fn augmented_member(
        &self,
        class: &Branch,
        call: &Branch,
        name: &str,
        arity: Option<usize>,
        walk: &mut Walk,
    ) -> Option<Branch> {
        let unit = self.unit(class.unit())?;
        let ast = unit.ast();
        let param_name = unit.tables.augments.get(class.target())?;
        let (_, body) = ast.get(class.target())?.class_parts()?;
        let constructor = ast
            .children(body, FieldTable::Full)
            .find_map(|member| match &ast.get(member)?.data {
                NodeData::Member(Member::Method(method))
                    if method.kind == MethodKind::Constructor =>
                {
                    Some(method.value)
                }
                _ => None,
            })?;
        let index = ast.get(constructor)?.params()?.iter().position(|param| {
            let name_node = ast.get(*param).and_then(|node| node.name_node()).unwrap_or(*param);
            ast.identifier_name(name_node) == Some(param_name.as_str())
        })?;
        let argument = *self.ast(call)?.get(call.target())?.as_call()?.arguments.get(index)?;
        let wrapped = self.value(&call.child(argument), walk)?;
        trace!(class = %class.target(), param = %param_name, "member lookup through augments");
        self.find_member(&wrapped, name, arity, walk)
    }

    /// Class or table `this` refers to at `branch`, or the owner of the
    /// enclosing qualified function.
    pub(super) fn this_value(&self, branch: &Branch, walk: &mut Walk) -> Option<Value> {
        let ast = self.ast(branch)?;
        for (index, ancestor) in branch.ancestors() {
            let node = ast.get(ancestor)?;
            let owner = branch.truncated(index + 1);
            match &node.data {
                _ if node.kind().is_class() => return Some(Value::instance(owner, None)),
                NodeData::Expression(Expression::Table(_)) => return Some(Value::node(owner)),
                NodeData::Declaration(Declaration::Function(function)) => {
                    if let Some(qualifier) = function.qualifier {
                        let value = self.value(&owner.child(qualifier), walk)?;
                        return Some(match value {
                            Value::Node { branch, .. }
                                if self.kind(&branch).is_some_and(NodeKind::is_class) =>
                            {
                                Value::instance(branch, None)
                            }
                            other => other,
                        });
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Superclass of the class `this` refers to at `branch`.
    pub(super) fn base_class(&self, branch: &Branch, walk: &mut Walk) -> Option<Branch> {
        let this = self.this_value(branch, walk)?;
        self.superclass_of(this.branch()?, walk)
    }
}
