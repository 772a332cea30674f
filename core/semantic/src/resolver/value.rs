use squirrel_ast::{
    arena::Ast,
    branch::Branch,
    fields::FieldTable,
    nodes::{
        CallExpression, Declaration, Expression, Member, NodeData, NodeKind, Pattern, Statement,
        UnaryOperator,
    },
};

use super::{Resolver, Value, Walk};

/// Nodes whose value lies elsewhere and is worth memoizing. Everything else
/// is its own value.
pub(super) fn is_indirect(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Identifier
            | NodeKind::MemberExpression
            | NodeKind::RootExpression
            | NodeKind::ThisExpression
            | NodeKind::BaseExpression
            | NodeKind::CallExpression
            | NodeKind::VariableDeclarator
            | NodeKind::PropertyDefinition
            | NodeKind::MethodDefinition
            | NodeKind::EnumMember
            | NodeKind::MetaProperty
            | NodeKind::AssignmentPattern
            | NodeKind::AssignmentExpression
            | NodeKind::ConditionalExpression
            | NodeKind::UnaryExpression
    )
}

impl Resolver<'_> {
    pub(super) fn resolve_value(&self, branch: &Branch, walk: &mut Walk) -> Option<Value> {
        let unit = self.unit(branch.unit())?;
        let node = unit.ast().get(branch.target())?;
        match &node.data {
            NodeData::Declaration(Declaration::Declarator(declarator)) => {
                self.value(&branch.child(declarator.init?), walk)
            }
            NodeData::Member(Member::Property(property)) => {
                self.value(&branch.child(property.value?), walk)
            }
            NodeData::Member(Member::Method(method)) => {
                self.value(&branch.child(method.value), walk)
            }
            NodeData::Member(Member::EnumMember(member)) => match member.init {
                Some(init) => self.value(&branch.child(init), walk),
                None => Some(Value::node(branch.clone())),
            },
            NodeData::Member(Member::Meta(_)) => {
                let getter = unit
                    .tables
                    .meta_accessors
                    .get(branch.target())
                    .and_then(|accessors| accessors.getter);
                match getter {
                    Some(getter) => {
                        let method = unit.ast().branch_to(getter)?;
                        let callable = self.value(&method, walk)?;
                        self.return_value(callable.branch()?, walk)
                    }
                    None => Some(Value::node(branch.clone())),
                }
            }
            NodeData::Pattern(Pattern::Assignment(pattern)) => {
                self.value(&branch.child(pattern.right), walk)
            }
            NodeData::Expression(Expression::Assignment(assignment)) => {
                self.value(&branch.child(assignment.right), walk)
            }
            NodeData::Expression(Expression::Identifier(_)) => {
                let definition = self.definition(branch, walk)?;
                // Parameters and loop variables declare themselves and carry
                // no value.
                if definition.target() == branch.target() {
                    return None;
                }
                self.value(&definition, walk)
            }
            NodeData::Expression(Expression::Member(_) | Expression::Root(_)) => {
                let definition = self.definition(branch, walk)?;
                self.value(&definition, walk)
            }
            NodeData::Expression(Expression::This) => self.this_value(branch, walk),
            NodeData::Expression(Expression::Base) => self
                .base_class(branch, walk)
                .map(|class| Value::instance(class, None)),
            NodeData::Expression(Expression::Call(call)) => self.call_value(branch, call, walk),
            NodeData::Expression(Expression::Unary(unary))
                if unary.operator == UnaryOperator::Clone =>
            {
                self.value(&branch.child(unary.argument), walk)
            }
            NodeData::Expression(Expression::Conditional(conditional)) => {
                match self.value(&branch.child(conditional.consequent), walk) {
                    Some(value) => Some(value),
                    None => self.value(&branch.child(conditional.alternate), walk),
                }
            }
            _ => Some(Value::node(branch.clone())),
        }
    }

    /// Calling a class constructs an instance; calling a function yields its
    /// return value.
    fn call_value(&self, branch: &Branch, call: &CallExpression, walk: &mut Walk) -> Option<Value> {
        let Value::Node {
            branch: callee,
            instance: false,
            ..
        } = self.value(&branch.child(call.callee), walk)?
        else {
            return None;
        };
        let kind = self.kind(&callee)?;
        if kind.is_class() {
            Some(Value::instance(callee, Some(branch.clone())))
        } else if kind.is_function() {
            self.return_value(&callee, walk)
        } else {
            None
        }
    }

    /// Value a callable returns: its documented return type, the body of a
    /// lambda, the generator pseudo-type when it yields, or else the first
    /// `return` in source order outside nested functions.
    pub(super) fn return_value(&self, callable: &Branch, walk: &mut Walk) -> Option<Value> {
        let unit = self.unit(callable.unit())?;
        let ast = unit.ast();
        let node = ast.get(callable.target())?;
        if let Some(annotation) = unit.tables.return_overrides.get(callable.target()) {
            return Some(
                self.lookup_type(callable, annotation, walk)
                    .unwrap_or_else(|| Value::Nominal(annotation.clone())),
            );
        }
        let body = callable.child(node.function_body()?);
        if node.kind() == NodeKind::LambdaExpression {
            return self.value(&body, walk);
        }
        if find_in_body(ast, &body, |kind| kind == NodeKind::YieldExpression).is_some() {
            return Some(Value::Nominal(self.analysis.config.generator_type.clone()));
        }
        let statement = find_in_body(ast, &body, |kind| kind == NodeKind::ReturnStatement)?;
        let NodeData::Statement(Statement::Return(ret)) = &ast.get(statement.target())?.data else {
            return None;
        };
        self.value(&statement.child(ret.argument?), walk)
    }
}

/// First node under `body`, in document order, accepted by `accept`.
/// Nested functions are not entered.
fn find_in_body(ast: &Ast, body: &Branch, accept: impl Fn(NodeKind) -> bool) -> Option<Branch> {
    let mut stack = vec![body.clone()];
    while let Some(branch) = stack.pop() {
        let Some(kind) = ast.kind(branch.target()) else {
            continue;
        };
        if accept(kind) {
            return Some(branch);
        }
        if kind.is_function() {
            continue;
        }
        let children: Vec<_> = ast.children(branch.target(), FieldTable::Full).collect();
        stack.extend(children.into_iter().rev().map(|child| branch.child(child)));
    }
    None
}
