//! Static child-field tables.
//!
//! Every [`NodeKind`] has an entry in both tables, even when it has no children.
//! The *full* table lists every child-holding field in document order. The
//! *value* table drops the construct's own name (`Id`, `Key`, the left side of
//! a defaulted parameter) and is what scope and member enumeration walk.

use std::slice;

use crate::nodes::{
    Declaration, Expression, Member, Node, NodeData, NodeId, NodeKind, Pattern, Statement,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Field {
    Body,
    Expression,
    Argument,
    Test,
    Consequent,
    Alternate,
    Init,
    Update,
    Index,
    Value,
    Object,
    Block,
    Param,
    Handler,
    Declarations,
    Id,
    Qualifier,
    Params,
    Superclass,
    Members,
    Key,
    Properties,
    Elements,
    Callee,
    Arguments,
    Property,
    Left,
    Right,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FieldTable {
    Full,
    Value,
}

impl NodeKind {
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn fields(self, table: FieldTable) -> &'static [Field] {
        use Field as F;
        let full = table == FieldTable::Full;
        match self {
            NodeKind::SourceFile | NodeKind::BlockStatement | NodeKind::ClassBody => &[F::Body],
            NodeKind::ExpressionStatement => &[F::Expression],
            NodeKind::ReturnStatement
            | NodeKind::ThrowStatement
            | NodeKind::UnaryExpression
            | NodeKind::YieldExpression => &[F::Argument],
            NodeKind::IfStatement | NodeKind::ConditionalExpression => {
                &[F::Test, F::Consequent, F::Alternate]
            }
            NodeKind::WhileStatement => &[F::Test, F::Body],
            NodeKind::DoWhileStatement => &[F::Body, F::Test],
            NodeKind::ForStatement => &[F::Init, F::Test, F::Update, F::Body],
            NodeKind::ForeachStatement => &[F::Index, F::Value, F::Object, F::Body],
            NodeKind::TryStatement => &[F::Block, F::Param, F::Handler],
            NodeKind::VariableDeclaration => &[F::Declarations],
            NodeKind::VariableDeclarator | NodeKind::EnumMember => {
                if full {
                    &[F::Id, F::Init]
                } else {
                    &[F::Init]
                }
            }
            NodeKind::FunctionDeclaration => {
                if full {
                    &[F::Qualifier, F::Id, F::Params, F::Body]
                } else {
                    &[F::Qualifier, F::Params, F::Body]
                }
            }
            NodeKind::ClassDeclaration => {
                if full {
                    &[F::Qualifier, F::Id, F::Superclass, F::Body]
                } else {
                    &[F::Qualifier, F::Superclass, F::Body]
                }
            }
            NodeKind::EnumDeclaration => {
                if full {
                    &[F::Id, F::Members]
                } else {
                    &[F::Members]
                }
            }
            NodeKind::MethodDefinition | NodeKind::PropertyDefinition => {
                if full {
                    &[F::Key, F::Value]
                } else {
                    &[F::Value]
                }
            }
            NodeKind::MetaProperty => {
                if full {
                    &[F::Key]
                } else {
                    &[]
                }
            }
            NodeKind::AssignmentPattern => {
                if full {
                    &[F::Left, F::Right]
                } else {
                    &[F::Right]
                }
            }
            NodeKind::TableExpression => &[F::Properties],
            NodeKind::ArrayExpression => &[F::Elements],
            NodeKind::FunctionExpression | NodeKind::LambdaExpression => &[F::Params, F::Body],
            NodeKind::ClassExpression => &[F::Superclass, F::Body],
            NodeKind::CallExpression => &[F::Callee, F::Arguments],
            NodeKind::MemberExpression => &[F::Object, F::Property],
            NodeKind::RootExpression => &[F::Property],
            NodeKind::AssignmentExpression | NodeKind::BinaryExpression => &[F::Left, F::Right],
            NodeKind::BreakStatement
            | NodeKind::ContinueStatement
            | NodeKind::Identifier
            | NodeKind::Literal
            | NodeKind::ThisExpression
            | NodeKind::BaseExpression
            | NodeKind::RestElement => &[],
        }
    }
}

impl Node {
    /// Children stored under `field`, empty when the node has no such field
    /// or the optional child is absent.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn field(&self, field: Field) -> &[NodeId] {
        use Field as F;
        match (&self.data, field) {
            (NodeData::SourceFile(s), F::Body) => &s.body,
            (NodeData::Statement(statement), _) => match (statement, field) {
                (Statement::Block(b), F::Body) => &b.body,
                (Statement::Expression(e), F::Expression) => slice::from_ref(&e.expression),
                (Statement::Return(r), F::Argument) => r.argument.as_slice(),
                (Statement::If(i), F::Test) => slice::from_ref(&i.test),
                (Statement::If(i), F::Consequent) => slice::from_ref(&i.consequent),
                (Statement::If(i), F::Alternate) => i.alternate.as_slice(),
                (Statement::While(w), F::Test) => slice::from_ref(&w.test),
                (Statement::While(w), F::Body) => slice::from_ref(&w.body),
                (Statement::DoWhile(d), F::Body) => slice::from_ref(&d.body),
                (Statement::DoWhile(d), F::Test) => slice::from_ref(&d.test),
                (Statement::For(f), F::Init) => f.init.as_slice(),
                (Statement::For(f), F::Test) => f.test.as_slice(),
                (Statement::For(f), F::Update) => f.update.as_slice(),
                (Statement::For(f), F::Body) => slice::from_ref(&f.body),
                (Statement::Foreach(f), F::Index) => f.index.as_slice(),
                (Statement::Foreach(f), F::Value) => slice::from_ref(&f.value),
                (Statement::Foreach(f), F::Object) => slice::from_ref(&f.object),
                (Statement::Foreach(f), F::Body) => slice::from_ref(&f.body),
                (Statement::Try(t), F::Block) => slice::from_ref(&t.block),
                (Statement::Try(t), F::Param) => t.param.as_slice(),
                (Statement::Try(t), F::Handler) => t.handler.as_slice(),
                (Statement::Throw(t), F::Argument) => slice::from_ref(&t.argument),
                _ => &[],
            },
            (NodeData::Declaration(declaration), _) => match (declaration, field) {
                (Declaration::Variable(v), F::Declarations) => &v.declarations,
                (Declaration::Declarator(d), F::Id) => slice::from_ref(&d.id),
                (Declaration::Declarator(d), F::Init) => d.init.as_slice(),
                (Declaration::Function(f), F::Qualifier) => f.qualifier.as_slice(),
                (Declaration::Function(f), F::Id) => slice::from_ref(&f.id),
                (Declaration::Function(f), F::Params) => &f.params,
                (Declaration::Function(f), F::Body) => slice::from_ref(&f.body),
                (Declaration::Class(c), F::Qualifier) => c.qualifier.as_slice(),
                (Declaration::Class(c), F::Id) => slice::from_ref(&c.id),
                (Declaration::Class(c), F::Superclass) => c.superclass.as_slice(),
                (Declaration::Class(c), F::Body) => slice::from_ref(&c.body),
                (Declaration::Enum(e), F::Id) => slice::from_ref(&e.id),
                (Declaration::Enum(e), F::Members) => &e.members,
                _ => &[],
            },
            (NodeData::Member(member), _) => match (member, field) {
                (Member::ClassBody(b), F::Body) => &b.body,
                (Member::Method(m), F::Key) => slice::from_ref(&m.key),
                (Member::Method(m), F::Value) => slice::from_ref(&m.value),
                (Member::Property(p), F::Key) => slice::from_ref(&p.key),
                (Member::Property(p), F::Value) => p.value.as_slice(),
                (Member::EnumMember(m), F::Id) => slice::from_ref(&m.id),
                (Member::EnumMember(m), F::Init) => m.init.as_slice(),
                (Member::Meta(m), F::Key) => slice::from_ref(&m.key),
                _ => &[],
            },
            (NodeData::Expression(expression), _) => match (expression, field) {
                (Expression::Table(t), F::Properties) => &t.properties,
                (Expression::Array(a), F::Elements) => &a.elements,
                (Expression::Function(f), F::Params) => &f.params,
                (Expression::Function(f), F::Body) => slice::from_ref(&f.body),
                (Expression::Lambda(l), F::Params) => &l.params,
                (Expression::Lambda(l), F::Body) => slice::from_ref(&l.body),
                (Expression::Class(c), F::Superclass) => c.superclass.as_slice(),
                (Expression::Class(c), F::Body) => slice::from_ref(&c.body),
                (Expression::Call(c), F::Callee) => slice::from_ref(&c.callee),
                (Expression::Call(c), F::Arguments) => &c.arguments,
                (Expression::Member(m), F::Object) => slice::from_ref(&m.object),
                (Expression::Member(m), F::Property) => slice::from_ref(&m.property),
                (Expression::Root(r), F::Property) => slice::from_ref(&r.property),
                (Expression::Assignment(a), F::Left) => slice::from_ref(&a.left),
                (Expression::Assignment(a), F::Right) => slice::from_ref(&a.right),
                (Expression::Binary(b), F::Left) => slice::from_ref(&b.left),
                (Expression::Binary(b), F::Right) => slice::from_ref(&b.right),
                (Expression::Unary(u), F::Argument) => slice::from_ref(&u.argument),
                (Expression::Conditional(c), F::Test) => slice::from_ref(&c.test),
                (Expression::Conditional(c), F::Consequent) => slice::from_ref(&c.consequent),
                (Expression::Conditional(c), F::Alternate) => slice::from_ref(&c.alternate),
                (Expression::Yield(y), F::Argument) => y.argument.as_slice(),
                _ => &[],
            },
            (NodeData::Pattern(Pattern::Assignment(p)), F::Left) => slice::from_ref(&p.left),
            (NodeData::Pattern(Pattern::Assignment(p)), F::Right) => slice::from_ref(&p.right),
            _ => &[],
        }
    }

    /// Children in document order through the given table.
    pub fn children(&self, table: FieldTable) -> impl Iterator<Item = NodeId> + '_ {
        self.kind()
            .fields(table)
            .iter()
            .flat_map(move |field| self.field(*field).iter().copied())
    }
}
