use crate::nodes::{
    AssignmentOperator, CallExpression, Declaration, Expression, LiteralValue, Member,
    MemberExpression, Node, NodeData, NodeId, NodeKind, Pattern, Statement,
};

impl NodeData {
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::SourceFile(_) => NodeKind::SourceFile,
            NodeData::Statement(statement) => match statement {
                Statement::Block(_) => NodeKind::BlockStatement,
                Statement::Expression(_) => NodeKind::ExpressionStatement,
                Statement::Return(_) => NodeKind::ReturnStatement,
                Statement::If(_) => NodeKind::IfStatement,
                Statement::While(_) => NodeKind::WhileStatement,
                Statement::DoWhile(_) => NodeKind::DoWhileStatement,
                Statement::For(_) => NodeKind::ForStatement,
                Statement::Foreach(_) => NodeKind::ForeachStatement,
                Statement::Try(_) => NodeKind::TryStatement,
                Statement::Throw(_) => NodeKind::ThrowStatement,
                Statement::Break => NodeKind::BreakStatement,
                Statement::Continue => NodeKind::ContinueStatement,
            },
            NodeData::Declaration(declaration) => match declaration {
                Declaration::Variable(_) => NodeKind::VariableDeclaration,
                Declaration::Declarator(_) => NodeKind::VariableDeclarator,
                Declaration::Function(_) => NodeKind::FunctionDeclaration,
                Declaration::Class(_) => NodeKind::ClassDeclaration,
                Declaration::Enum(_) => NodeKind::EnumDeclaration,
            },
            NodeData::Member(member) => match member {
                Member::ClassBody(_) => NodeKind::ClassBody,
                Member::Method(_) => NodeKind::MethodDefinition,
                Member::Property(_) => NodeKind::PropertyDefinition,
                Member::EnumMember(_) => NodeKind::EnumMember,
                Member::Meta(_) => NodeKind::MetaProperty,
            },
            NodeData::Expression(expression) => match expression {
                Expression::Identifier(_) => NodeKind::Identifier,
                Expression::Literal(_) => NodeKind::Literal,
                Expression::Table(_) => NodeKind::TableExpression,
                Expression::Array(_) => NodeKind::ArrayExpression,
                Expression::Function(_) => NodeKind::FunctionExpression,
                Expression::Lambda(_) => NodeKind::LambdaExpression,
                Expression::Class(_) => NodeKind::ClassExpression,
                Expression::Call(_) => NodeKind::CallExpression,
                Expression::Member(_) => NodeKind::MemberExpression,
                Expression::This => NodeKind::ThisExpression,
                Expression::Base => NodeKind::BaseExpression,
                Expression::Root(_) => NodeKind::RootExpression,
                Expression::Assignment(_) => NodeKind::AssignmentExpression,
                Expression::Binary(_) => NodeKind::BinaryExpression,
                Expression::Unary(_) => NodeKind::UnaryExpression,
                Expression::Conditional(_) => NodeKind::ConditionalExpression,
                Expression::Yield(_) => NodeKind::YieldExpression,
            },
            NodeData::Pattern(pattern) => match pattern {
                Pattern::Assignment(_) => NodeKind::AssignmentPattern,
                Pattern::Rest => NodeKind::RestElement,
            },
        }
    }
}

impl Node {
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    #[must_use]
    pub fn identifier_name(&self) -> Option<&str> {
        match &self.data {
            NodeData::Expression(Expression::Identifier(identifier)) => Some(&identifier.name),
            _ => None,
        }
    }

    #[must_use]
    pub fn literal(&self) -> Option<&LiteralValue> {
        match &self.data {
            NodeData::Expression(Expression::Literal(literal)) => Some(literal),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_call(&self) -> Option<&CallExpression> {
        match &self.data {
            NodeData::Expression(Expression::Call(call)) => Some(call),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_member(&self) -> Option<&MemberExpression> {
        match &self.data {
            NodeData::Expression(Expression::Member(member)) => Some(member),
            _ => None,
        }
    }

    /// The name-carrying child of a declaring construct (`Id` or `Key` field).
    #[must_use]
    pub fn name_node(&self) -> Option<NodeId> {
        match &self.data {
            NodeData::Declaration(Declaration::Declarator(d)) => Some(d.id),
            NodeData::Declaration(Declaration::Function(f)) => Some(f.id),
            NodeData::Declaration(Declaration::Class(c)) => Some(c.id),
            NodeData::Declaration(Declaration::Enum(e)) => Some(e.id),
            NodeData::Member(Member::Method(m)) => Some(m.key),
            NodeData::Member(Member::Property(p)) => Some(p.key),
            NodeData::Member(Member::EnumMember(m)) => Some(m.id),
            NodeData::Member(Member::Meta(m)) => Some(m.key),
            NodeData::Pattern(Pattern::Assignment(p)) => Some(p.left),
            NodeData::Expression(Expression::Assignment(a))
                if a.operator == AssignmentOperator::NewSlot =>
            {
                Some(a.left)
            }
            _ => None,
        }
    }

    /// Parameter list of a callable node, looking through method wrappers.
    #[must_use]
    pub fn params(&self) -> Option<&[NodeId]> {
        match &self.data {
            NodeData::Declaration(Declaration::Function(f)) => Some(&f.params),
            NodeData::Expression(Expression::Function(f)) => Some(&f.params),
            NodeData::Expression(Expression::Lambda(l)) => Some(&l.params),
            _ => None,
        }
    }

    /// Superclass expression and body of a class in either form.
    #[must_use]
    pub fn class_parts(&self) -> Option<(Option<NodeId>, NodeId)> {
        match &self.data {
            NodeData::Declaration(Declaration::Class(c)) => Some((c.superclass, c.body)),
            NodeData::Expression(Expression::Class(c)) => Some((c.superclass, c.body)),
            _ => None,
        }
    }

    /// Body of a function in any form (block for functions, expression for lambdas).
    #[must_use]
    pub fn function_body(&self) -> Option<NodeId> {
        match &self.data {
            NodeData::Declaration(Declaration::Function(f)) => Some(f.body),
            NodeData::Expression(Expression::Function(f)) => Some(f.body),
            NodeData::Expression(Expression::Lambda(l)) => Some(l.body),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_newslot(&self) -> bool {
        matches!(
            &self.data,
            NodeData::Expression(Expression::Assignment(a)) if a.operator == AssignmentOperator::NewSlot
        )
    }
}
