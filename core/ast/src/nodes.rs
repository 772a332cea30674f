use core::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Index of a node inside its [`Ast`](crate::arena::Ast) arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies one parsed unit (one source file) inside an analysis.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize, Deserialize,
)]
pub struct UnitId(pub u32);

impl Display for UnitId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "unit{}", self.0)
    }
}

/// Source range of a node. Offsets are byte offsets, lines and columns are 1-based.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Location {
    pub offset_start: u32,
    pub offset_end: u32,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Location {
    #[must_use]
    pub fn new(
        offset_start: u32,
        offset_end: u32,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Self {
        Self {
            offset_start,
            offset_end,
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// End-inclusive, so a cursor sitting right after an identifier still hits it.
    #[must_use]
    pub fn contains_offset(&self, offset: u32) -> bool {
        self.offset_start <= offset && offset <= self.offset_end
    }

    #[must_use]
    pub fn contains(&self, other: &Location) -> bool {
        self.offset_start <= other.offset_start && other.offset_end <= self.offset_end
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}

/// Flat discriminant of every node shape. The child-field tables in
/// [`fields`](crate::fields) are keyed by this tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum NodeKind {
    SourceFile,
    BlockStatement,
    ExpressionStatement,
    ReturnStatement,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    ForeachStatement,
    TryStatement,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    ClassDeclaration,
    EnumDeclaration,
    ClassBody,
    MethodDefinition,
    PropertyDefinition,
    EnumMember,
    MetaProperty,
    Identifier,
    Literal,
    TableExpression,
    ArrayExpression,
    FunctionExpression,
    LambdaExpression,
    ClassExpression,
    CallExpression,
    MemberExpression,
    ThisExpression,
    BaseExpression,
    RootExpression,
    AssignmentExpression,
    BinaryExpression,
    UnaryExpression,
    ConditionalExpression,
    YieldExpression,
    AssignmentPattern,
    RestElement,
}

impl NodeKind {
    /// Classes in either declaration or expression form.
    #[must_use]
    pub fn is_class(self) -> bool {
        matches!(self, NodeKind::ClassDeclaration | NodeKind::ClassExpression)
    }

    /// Nodes that own a parameter list.
    #[must_use]
    pub fn is_function(self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration | NodeKind::FunctionExpression | NodeKind::LambdaExpression
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum LiteralKind {
    Integer,
    Float,
    String,
    Bool,
    Null,
}

#[derive(Clone, PartialEq, Debug)]
pub enum LiteralValue {
    Integer(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
}

impl LiteralValue {
    #[must_use]
    pub fn kind(&self) -> LiteralKind {
        match self {
            LiteralValue::Integer(_) => LiteralKind::Integer,
            LiteralValue::Float(_) => LiteralKind::Float,
            LiteralValue::String(_) => LiteralKind::String,
            LiteralValue::Bool(_) => LiteralKind::Bool,
            LiteralValue::Null => LiteralKind::Null,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        if let LiteralValue::String(value) = self {
            Some(value)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Cmp,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    In,
    InstanceOf,
}

impl BinaryOperator {
    /// Operators whose result is always a boolean.
    #[must_use]
    pub fn is_predicate(self) -> bool {
        matches!(
            self,
            BinaryOperator::Eq
                | BinaryOperator::Ne
                | BinaryOperator::Lt
                | BinaryOperator::Le
                | BinaryOperator::Gt
                | BinaryOperator::Ge
                | BinaryOperator::And
                | BinaryOperator::Or
                | BinaryOperator::In
                | BinaryOperator::InstanceOf
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnaryOperator {
    Neg,
    Not,
    BitNot,
    TypeOf,
    Clone,
    Delete,
    Resume,
    Increment,
    Decrement,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AssignmentOperator {
    Assign,
    /// `<-`, creates a new slot.
    NewSlot,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum VariableKind {
    #[default]
    Local,
    Const,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MethodKind {
    Constructor,
    Method,
}

#[derive(Clone, PartialEq, Debug)]
pub struct SourceFile {
    pub body: Vec<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct BlockStatement {
    pub body: Vec<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ExpressionStatement {
    pub expression: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ReturnStatement {
    pub argument: Option<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct IfStatement {
    pub test: NodeId,
    pub consequent: NodeId,
    pub alternate: Option<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct WhileStatement {
    pub test: NodeId,
    pub body: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct DoWhileStatement {
    pub body: NodeId,
    pub test: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ForStatement {
    pub init: Option<NodeId>,
    pub test: Option<NodeId>,
    pub update: Option<NodeId>,
    pub body: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ForeachStatement {
    pub index: Option<NodeId>,
    pub value: NodeId,
    pub object: NodeId,
    pub body: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct TryStatement {
    pub block: NodeId,
    pub param: Option<NodeId>,
    pub handler: Option<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ThrowStatement {
    pub argument: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct VariableDeclaration {
    pub kind: VariableKind,
    pub declarations: Vec<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct VariableDeclarator {
    pub id: NodeId,
    pub init: Option<NodeId>,
}

/// `function name(...)` or the namespaced `function Owner::name(...)`.
#[derive(Clone, PartialEq, Debug)]
pub struct FunctionDeclaration {
    pub qualifier: Option<NodeId>,
    pub id: NodeId,
    pub params: Vec<NodeId>,
    pub body: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ClassDeclaration {
    pub qualifier: Option<NodeId>,
    pub id: NodeId,
    pub superclass: Option<NodeId>,
    pub body: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct EnumDeclaration {
    pub id: NodeId,
    pub members: Vec<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ClassBody {
    pub body: Vec<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct MethodDefinition {
    pub kind: MethodKind,
    pub is_static: bool,
    pub key: NodeId,
    pub value: NodeId,
}

/// Class field or table slot. `computed` is set for `[expr] = value` and
/// string keys.
#[derive(Clone, PartialEq, Debug)]
pub struct PropertyDefinition {
    pub is_static: bool,
    pub computed: bool,
    pub key: NodeId,
    pub value: Option<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct EnumMember {
    pub id: NodeId,
    pub init: Option<NodeId>,
}

/// Synthetic member standing for a documented or accessor-backed property.
/// Never produced by the parser.
#[derive(Clone, PartialEq, Debug)]
pub struct MetaProperty {
    pub key: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Identifier {
    pub name: String,
}

#[derive(Clone, PartialEq, Debug)]
pub struct TableExpression {
    pub properties: Vec<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ArrayExpression {
    pub elements: Vec<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct FunctionExpression {
    pub params: Vec<NodeId>,
    pub body: NodeId,
}

/// `@(params) expression`
#[derive(Clone, PartialEq, Debug)]
pub struct LambdaExpression {
    pub params: Vec<NodeId>,
    pub body: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ClassExpression {
    pub superclass: Option<NodeId>,
    pub body: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct CallExpression {
    pub callee: NodeId,
    pub arguments: Vec<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct MemberExpression {
    pub object: NodeId,
    pub property: NodeId,
    pub computed: bool,
}

/// `::name`, a lookup in the root table.
#[derive(Clone, PartialEq, Debug)]
pub struct RootExpression {
    pub property: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct AssignmentExpression {
    pub operator: AssignmentOperator,
    pub left: NodeId,
    pub right: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: NodeId,
    pub right: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub prefix: bool,
    pub argument: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ConditionalExpression {
    pub test: NodeId,
    pub consequent: NodeId,
    pub alternate: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct YieldExpression {
    pub argument: Option<NodeId>,
}

/// Defaulted parameter `name = value`.
#[derive(Clone, PartialEq, Debug)]
pub struct AssignmentPattern {
    pub left: NodeId,
    pub right: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Statement {
    Block(BlockStatement),
    Expression(ExpressionStatement),
    Return(ReturnStatement),
    If(IfStatement),
    While(WhileStatement),
    DoWhile(DoWhileStatement),
    For(ForStatement),
    Foreach(ForeachStatement),
    Try(TryStatement),
    Throw(ThrowStatement),
    Break,
    Continue,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Declaration {
    Variable(VariableDeclaration),
    Declarator(VariableDeclarator),
    Function(FunctionDeclaration),
    Class(ClassDeclaration),
    Enum(EnumDeclaration),
}

#[derive(Clone, PartialEq, Debug)]
pub enum Member {
    ClassBody(ClassBody),
    Method(MethodDefinition),
    Property(PropertyDefinition),
    EnumMember(EnumMember),
    Meta(MetaProperty),
}

#[derive(Clone, PartialEq, Debug)]
pub enum Expression {
    Identifier(Identifier),
    Literal(LiteralValue),
    Table(TableExpression),
    Array(ArrayExpression),
    Function(FunctionExpression),
    Lambda(LambdaExpression),
    Class(ClassExpression),
    Call(CallExpression),
    Member(MemberExpression),
    This,
    Base,
    Root(RootExpression),
    Assignment(AssignmentExpression),
    Binary(BinaryExpression),
    Unary(UnaryExpression),
    Conditional(ConditionalExpression),
    Yield(YieldExpression),
}

#[derive(Clone, PartialEq, Debug)]
pub enum Pattern {
    Assignment(AssignmentPattern),
    Rest,
}

/// Tag-specific payload of a node, split by syntactic category.
#[derive(Clone, PartialEq, Debug)]
pub enum NodeData {
    SourceFile(SourceFile),
    Statement(Statement),
    Declaration(Declaration),
    Member(Member),
    Expression(Expression),
    Pattern(Pattern),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Node {
    pub id: NodeId,
    pub location: Location,
    pub data: NodeData,
}
