use squirrel_ast::{
    branch::Branch,
    nodes::{
        Declaration, Expression, LiteralKind, Member, NodeData, NodeId, NodeKind, UnaryOperator,
    },
};

use super::{Resolver, Value, Walk};
use crate::type_info::TypeLabel;

impl Resolver<'_> {
    /// Display type of the expression at `branch`. An annotation on its
    /// definition wins over the shape of its value, except for calls: the
    /// callee's annotation types the callee, not what it returns.
    pub(crate) fn infer_type(&self, branch: &Branch, walk: &mut Walk) -> TypeLabel {
        if self.kind(branch) != Some(NodeKind::CallExpression)
            && let Some(definition) = self.definition(branch, walk)
            && !self.kind(&definition).is_some_and(NodeKind::is_class)
            && let Some(annotation) = self
                .unit(definition.unit())
                .and_then(|unit| unit.tables.type_overrides.get(definition.target()))
        {
            return TypeLabel::from_annotation(annotation);
        }
        match self.value(branch, walk) {
            Some(value) => self.label_of(&value, walk),
            None => TypeLabel::Any,
        }
    }

    fn label_of(&self, value: &Value, walk: &mut Walk) -> TypeLabel {
        let (branch, instance) = match value {
            Value::Nominal(name) => return TypeLabel::from_annotation(name),
            Value::Node {
                branch, instance, ..
            } => (branch, *instance),
        };
        let Some(unit) = self.unit(branch.unit()) else {
            return TypeLabel::Any;
        };
        let ast = unit.ast();
        let Some(node) = ast.get(branch.target()) else {
            return TypeLabel::Any;
        };
        match &node.data {
            NodeData::Expression(Expression::Literal(literal)) => match literal.kind() {
                LiteralKind::Integer => TypeLabel::Integer,
                LiteralKind::Float => TypeLabel::Float,
                LiteralKind::String => TypeLabel::String,
                LiteralKind::Bool => TypeLabel::Bool,
                LiteralKind::Null => TypeLabel::Null,
            },
            NodeData::Expression(Expression::Table(_)) => TypeLabel::Table,
            NodeData::Expression(Expression::Array(array)) => {
                self.array_label(branch, &array.elements, walk)
            }
            NodeData::Expression(Expression::Function(_) | Expression::Lambda(_))
            | NodeData::Declaration(Declaration::Function(_)) => TypeLabel::Function,
            _ if node.kind().is_class() => {
                let name = self.class_name(branch);
                let self_typed = unit
                    .tables
                    .type_overrides
                    .get(branch.target())
                    .is_some_and(|annotation| annotation == "self" || *annotation == name);
                if instance && !self_typed {
                    TypeLabel::Instance(name)
                } else {
                    TypeLabel::Class(name)
                }
            }
            NodeData::Declaration(Declaration::Enum(declaration)) => {
                TypeLabel::Enum(ast.identifier_name(declaration.id).unwrap_or_default().to_string())
            }
            NodeData::Member(Member::EnumMember(_)) => branch
                .parent_branch()
                .and_then(|parent| {
                    let name = ast.get(parent.target())?.name_node()?;
                    ast.identifier_name(name).map(str::to_string)
                })
                .map_or(TypeLabel::Any, TypeLabel::Enum),
            NodeData::Expression(Expression::Binary(binary)) => {
                if binary.operator.is_predicate() {
                    return TypeLabel::Bool;
                }
                let left = self.infer_type(&branch.child(binary.left), walk);
                let right = self.infer_type(&branch.child(binary.right), walk);
                arithmetic(left, right)
            }
            NodeData::Expression(Expression::Unary(unary)) => match unary.operator {
                UnaryOperator::Not => TypeLabel::Bool,
                UnaryOperator::TypeOf => TypeLabel::String,
                UnaryOperator::Neg
                | UnaryOperator::BitNot
                | UnaryOperator::Increment
                | UnaryOperator::Decrement => self.infer_type(&branch.child(unary.argument), walk),
                _ => TypeLabel::Any,
            },
            _ => TypeLabel::Any,
        }
    }

    /// `array<T>` when every element has the same tag (and literal kind),
    /// plain `array` when empty, `array<any>` otherwise.
    fn array_label(&self, branch: &Branch, elements: &[NodeId], walk: &mut Walk) -> TypeLabel {
        let Some(ast) = self.ast(branch) else {
            return TypeLabel::Array(None);
        };
        let shape = |element| {
            let node = ast.get(element)?;
            Some((node.kind(), node.literal().map(|literal| literal.kind())))
        };
        let Some(first) = elements.first() else {
            return TypeLabel::Array(None);
        };
        let first_shape = shape(*first);
        if elements.iter().any(|element| shape(*element) != first_shape) {
            return TypeLabel::Array(Some(Box::new(TypeLabel::Any)));
        }
        let element = self.infer_type(&branch.child(*first), walk);
        TypeLabel::Array(Some(Box::new(element)))
    }

    /// Alias, declared name, or the name the class expression is bound to.
    fn class_name(&self, class: &Branch) -> String {
        let Some(unit) = self.unit(class.unit()) else {
            return String::new();
        };
        if let Some(alias) = unit.tables.aliases.get(class.target()) {
            return alias.clone();
        }
        let ast = unit.ast();
        let declared = ast
            .get(class.target())
            .and_then(|node| node.name_node())
            .or_else(|| {
                let parent = ast.get(class.parent()?)?;
                parent.name_node()
            });
        declared
            .and_then(|name| unit.tables.key_name(ast, name))
            .unwrap_or("class")
            .to_string()
    }
}

fn arithmetic(left: TypeLabel, right: TypeLabel) -> TypeLabel {
    match (left, right) {
        (TypeLabel::String, _) | (_, TypeLabel::String) => TypeLabel::String,
        (TypeLabel::Integer, TypeLabel::Integer) => TypeLabel::Integer,
        (TypeLabel::Float | TypeLabel::Integer, TypeLabel::Float | TypeLabel::Integer) => {
            TypeLabel::Float
        }
        _ => TypeLabel::Any,
    }
}
