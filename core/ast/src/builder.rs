//! Reference builder that lowers Squirrel source text into an [`Ast`].
//!
//! The builder is a recursive-descent parser over the token stream produced by
//! [`Lexer`]. Nodes are appended to the arena as soon as they are complete, so
//! a child always gets a smaller [`NodeId`] than its parent and the root
//! `SourceFile` is the last parsed node.
//!
//! # Example
//!
//! ```
//! use squirrel_ast::builder::Builder;
//! use squirrel_ast::nodes::NodeKind;
//!
//! let ast = Builder::new("local abc = 123; abc;").build_ast().unwrap();
//! assert_eq!(ast.kind(ast.root()), Some(NodeKind::SourceFile));
//! ```
//!
//! # Error Handling
//!
//! The first lexing or parsing problem aborts the build with an
//! [`AstError`] carrying the offending location.

use crate::{
    arena::Ast,
    doc::{DocComment, parse_doc_comment},
    errors::AstError,
    lexer::{LineIndex, RawDocComment, Token, TokenKind},
    nodes::{
        ArrayExpression, AssignmentExpression, AssignmentOperator, AssignmentPattern,
        BinaryExpression, BinaryOperator, BlockStatement, CallExpression, ClassBody,
        ClassDeclaration, ClassExpression, ConditionalExpression, Declaration, DoWhileStatement,
        EnumDeclaration, EnumMember, Expression, ExpressionStatement, ForStatement,
        ForeachStatement, FunctionDeclaration, FunctionExpression, Identifier, IfStatement,
        LambdaExpression, LiteralValue, Location, Member, MemberExpression, MethodDefinition,
        MethodKind, Node, NodeData, NodeId, Pattern, PropertyDefinition, ReturnStatement,
        RootExpression, SourceFile, Statement, TableExpression, ThrowStatement, TryStatement,
        UnaryExpression, UnaryOperator, VariableDeclaration, VariableDeclarator, VariableKind,
        WhileStatement, YieldExpression,
    },
};

type ParseResult<T> = Result<T, AstError>;

/// Parses `source` into a fresh arena.
///
/// # Errors
///
/// Returns the first lexing or parsing error.
pub fn parse(source: &str) -> ParseResult<Ast> {
    Builder::new(source).build_ast()
}

pub struct Builder<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    prev_end: u32,
    nodes: Vec<Node>,
    lines: LineIndex,
}

impl<'a> Builder<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            pos: 0,
            prev_end: 0,
            nodes: Vec::new(),
            lines: LineIndex::new(source),
        }
    }

    /// Builds the arena for the whole source.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::Lex`] or [`AstError::Parse`] for the first problem found.
    pub fn build_ast(mut self) -> ParseResult<Ast> {
        let (tokens, docs) = crate::lexer::Lexer::new(self.source).tokenize()?;
        self.tokens = tokens;

        let mut body = Vec::new();
        loop {
            while self.eat_punct(";") {}
            if self.peek().kind == TokenKind::Eof {
                break;
            }
            body.push(self.parse_statement()?);
        }
        let end = crate::lexer::to_offset(self.source.len());
        let root = self.push_node(
            self.lines.location(0, end),
            NodeData::SourceFile(SourceFile { body }),
        );
        let comments = self.doc_comments(docs);
        Ok(Ast::new(self.nodes, root, comments, self.source))
    }

    fn doc_comments(&self, docs: Vec<RawDocComment>) -> Vec<DocComment> {
        docs.into_iter()
            .map(|doc| DocComment {
                location: self.lines.location(doc.start, doc.end),
                attributes: parse_doc_comment(&doc.text),
            })
            .collect()
    }

    // token cursor

    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
            self.prev_end = token.end;
        }
        token
    }

    fn at_punct(&self, punct: &str) -> bool {
        self.peek().is_punct(punct)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek().is_keyword(keyword)
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        let found = self.at_punct(punct);
        if found {
            self.advance();
        }
        found
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let found = self.at_keyword(keyword);
        if found {
            self.advance();
        }
        found
    }

    fn expect_punct(&mut self, punct: &str) -> ParseResult<Token> {
        if self.at_punct(punct) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected `{punct}`")))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> ParseResult<Token> {
        if self.at_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected `{keyword}`")))
        }
    }

    fn error(&self, message: impl Into<String>) -> AstError {
        let token = self.peek();
        let found = match &token.kind {
            TokenKind::Eof => "end of file".to_string(),
            _ => format!("`{}`", &self.source[token.start as usize..token.end as usize]),
        };
        AstError::Parse {
            message: format!("{}, found {found}", message.into()),
            location: self.lines.location(token.start, token.end),
        }
    }

    /// Statement or expression argument may be omitted here.
    fn at_terminator(&self) -> bool {
        let token = self.peek();
        token.newline_before
            || token.kind == TokenKind::Eof
            || token.is_punct(";")
            || token.is_punct("}")
            || token.is_punct(")")
    }

    // node allocation

    fn push_node(&mut self, location: Location, data: NodeData) -> NodeId {
        let id = NodeId(crate::lexer::to_offset(self.nodes.len()));
        self.nodes.push(Node { id, location, data });
        id
    }

    fn add(&mut self, start: u32, data: NodeData) -> NodeId {
        let end = self.prev_end.max(start);
        let location = self.lines.location(start, end);
        self.push_node(location, data)
    }

    fn start(&self, id: NodeId) -> u32 {
        self.nodes[id.index()].location.offset_start
    }

    fn identifier(&mut self) -> ParseResult<NodeId> {
        match self.peek().kind.clone() {
            TokenKind::Identifier(name) => {
                let token = self.advance();
                Ok(self.add(token.start, ident(name)))
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    /// Identifier position that also accepts keywords, as after `.`.
    fn property_name(&mut self) -> ParseResult<NodeId> {
        if let TokenKind::Keyword(keyword) = self.peek().kind {
            let token = self.advance();
            return Ok(self.add(token.start, ident(keyword.to_string())));
        }
        self.identifier()
    }

    // statements

    fn parse_statement(&mut self) -> ParseResult<NodeId> {
        let token = self.peek().clone();
        let statement = match &token.kind {
            TokenKind::Punct("{") => self.parse_block()?,
            TokenKind::Keyword("local") => self.parse_local()?,
            TokenKind::Keyword("const") => self.parse_const()?,
            TokenKind::Keyword("function") => self.parse_function_declaration(token.start)?,
            TokenKind::Keyword("class") => self.parse_class_declaration()?,
            TokenKind::Keyword("enum") => self.parse_enum()?,
            TokenKind::Keyword("return") => {
                self.advance();
                let argument = if self.at_terminator() {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.eat_punct(";");
                self.add(
                    token.start,
                    NodeData::Statement(Statement::Return(ReturnStatement { argument })),
                )
            }
            TokenKind::Keyword("if") => self.parse_if()?,
            TokenKind::Keyword("while") => {
                self.advance();
                let test = self.parse_condition()?;
                let body = self.parse_statement()?;
                self.add(
                    token.start,
                    NodeData::Statement(Statement::While(WhileStatement { test, body })),
                )
            }
            TokenKind::Keyword("do") => {
                self.advance();
                let body = self.parse_statement()?;
                self.expect_keyword("while")?;
                let test = self.parse_condition()?;
                self.eat_punct(";");
                self.add(
                    token.start,
                    NodeData::Statement(Statement::DoWhile(DoWhileStatement { body, test })),
                )
            }
            TokenKind::Keyword("for") => self.parse_for()?,
            TokenKind::Keyword("foreach") => self.parse_foreach()?,
            TokenKind::Keyword("try") => self.parse_try()?,
            TokenKind::Keyword("throw") => {
                self.advance();
                let argument = self.parse_expression()?;
                self.eat_punct(";");
                self.add(
                    token.start,
                    NodeData::Statement(Statement::Throw(ThrowStatement { argument })),
                )
            }
            TokenKind::Keyword(keyword @ ("break" | "continue")) => {
                self.advance();
                self.eat_punct(";");
                let statement = if *keyword == "break" {
                    Statement::Break
                } else {
                    Statement::Continue
                };
                self.add(token.start, NodeData::Statement(statement))
            }
            _ => {
                let expression = self.parse_expression()?;
                self.eat_punct(";");
                self.add(
                    token.start,
                    NodeData::Statement(Statement::Expression(ExpressionStatement { expression })),
                )
            }
        };
        Ok(statement)
    }

    fn parse_block(&mut self) -> ParseResult<NodeId> {
        let start = self.expect_punct("{")?.start;
        let mut body = Vec::new();
        loop {
            while self.eat_punct(";") {}
            if self.eat_punct("}") {
                break;
            }
            if self.peek().kind == TokenKind::Eof {
                return Err(self.error("expected `}`"));
            }
            body.push(self.parse_statement()?);
        }
        Ok(self.add(
            start,
            NodeData::Statement(Statement::Block(BlockStatement { body })),
        ))
    }

    fn parse_condition(&mut self) -> ParseResult<NodeId> {
        self.expect_punct("(")?;
        let test = self.parse_expression()?;
        self.expect_punct(")")?;
        Ok(test)
    }

    fn parse_if(&mut self) -> ParseResult<NodeId> {
        let start = self.expect_keyword("if")?.start;
        let test = self.parse_condition()?;
        let consequent = self.parse_statement()?;
        let alternate = if self.eat_keyword("else") {
            Some(self.parse_statement()?)
        } else {
            None
        };
        Ok(self.add(
            start,
            NodeData::Statement(Statement::If(IfStatement {
                test,
                consequent,
                alternate,
            })),
        ))
    }

    fn parse_for(&mut self) -> ParseResult<NodeId> {
        let start = self.expect_keyword("for")?.start;
        self.expect_punct("(")?;
        let init = if self.at_punct(";") {
            None
        } else if self.at_keyword("local") {
            Some(self.parse_variables(VariableKind::Local, false)?)
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punct(";")?;
        let test = if self.at_punct(";") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punct(";")?;
        let update = if self.at_punct(")") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punct(")")?;
        let body = self.parse_statement()?;
        Ok(self.add(
            start,
            NodeData::Statement(Statement::For(ForStatement {
                init,
                test,
                update,
                body,
            })),
        ))
    }

    fn parse_foreach(&mut self) -> ParseResult<NodeId> {
        let start = self.expect_keyword("foreach")?.start;
        self.expect_punct("(")?;
        let first = self.identifier()?;
        let (index, value) = if self.eat_punct(",") {
            (Some(first), self.identifier()?)
        } else {
            (None, first)
        };
        self.expect_keyword("in")?;
        let object = self.parse_expression()?;
        self.expect_punct(")")?;
        let body = self.parse_statement()?;
        Ok(self.add(
            start,
            NodeData::Statement(Statement::Foreach(ForeachStatement {
                index,
                value,
                object,
                body,
            })),
        ))
    }

    fn parse_try(&mut self) -> ParseResult<NodeId> {
        let start = self.expect_keyword("try")?.start;
        let block = self.parse_statement()?;
        let (param, handler) = if self.eat_keyword("catch") {
            self.expect_punct("(")?;
            let param = self.identifier()?;
            self.expect_punct(")")?;
            (Some(param), Some(self.parse_statement()?))
        } else {
            (None, None)
        };
        Ok(self.add(
            start,
            NodeData::Statement(Statement::Try(TryStatement {
                block,
                param,
                handler,
            })),
        ))
    }

    fn parse_local(&mut self) -> ParseResult<NodeId> {
        let start = self.peek().start;
        if self.peek_nth(1).is_keyword("function") {
            self.advance();
            return self.parse_function_declaration(start);
        }
        let declaration = self.parse_variables(VariableKind::Local, true)?;
        Ok(declaration)
    }

    fn parse_const(&mut self) -> ParseResult<NodeId> {
        self.parse_variables(VariableKind::Const, true)
    }

    /// `local a = 1, b` or `const A = 1`; the leading keyword is consumed here.
    fn parse_variables(&mut self, kind: VariableKind, statement: bool) -> ParseResult<NodeId> {
        let start = self.advance().start;
        let mut declarations = Vec::new();
        loop {
            let id = self.identifier()?;
            let init = if self.eat_punct("=") {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            let declarator_start = self.start(id);
            declarations.push(self.add(
                declarator_start,
                NodeData::Declaration(Declaration::Declarator(VariableDeclarator { id, init })),
            ));
            if kind == VariableKind::Const || !self.eat_punct(",") {
                break;
            }
        }
        if statement {
            self.eat_punct(";");
        }
        Ok(self.add(
            start,
            NodeData::Declaration(Declaration::Variable(VariableDeclaration {
                kind,
                declarations,
            })),
        ))
    }

    /// `function name(...)` or `function A::B::name(...)`; the node starts at `start`
    /// so that a preceding `local` is covered.
    fn parse_function_declaration(&mut self, start: u32) -> ParseResult<NodeId> {
        self.expect_keyword("function")?;
        let (qualifier, id) = self.parse_qualified_name("::")?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(self.add(
            start,
            NodeData::Declaration(Declaration::Function(FunctionDeclaration {
                qualifier,
                id,
                params,
                body,
            })),
        ))
    }

    /// Splits `A<sep>B<sep>name` into the owner expression `A.B` and `name`.
    fn parse_qualified_name(&mut self, separator: &str) -> ParseResult<(Option<NodeId>, NodeId)> {
        let mut id = self.identifier()?;
        let mut qualifier: Option<NodeId> = None;
        while self.eat_punct(separator) {
            let owner = match qualifier {
                Some(object) => {
                    let start = self.start(object);
                    self.add(
                        start,
                        NodeData::Expression(Expression::Member(MemberExpression {
                            object,
                            property: id,
                            computed: false,
                        })),
                    )
                }
                None => id,
            };
            qualifier = Some(owner);
            id = self.identifier()?;
        }
        Ok((qualifier, id))
    }

    fn parse_params(&mut self) -> ParseResult<Vec<NodeId>> {
        self.expect_punct("(")?;
        let mut params = Vec::new();
        while !self.at_punct(")") {
            if self.at_punct("...") {
                let start = self.advance().start;
                params.push(self.add(start, NodeData::Pattern(Pattern::Rest)));
            } else {
                let left = self.identifier()?;
                if self.eat_punct("=") {
                    let right = self.parse_assignment()?;
                    let start = self.start(left);
                    params.push(self.add(
                        start,
                        NodeData::Pattern(Pattern::Assignment(AssignmentPattern { left, right })),
                    ));
                } else {
                    params.push(left);
                }
            }
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;
        Ok(params)
    }

    fn parse_class_declaration(&mut self) -> ParseResult<NodeId> {
        let start = self.expect_keyword("class")?.start;
        let (qualifier, id) = self.parse_qualified_name(".")?;
        let superclass = self.parse_extends()?;
        let body = self.parse_class_body()?;
        Ok(self.add(
            start,
            NodeData::Declaration(Declaration::Class(ClassDeclaration {
                qualifier,
                id,
                superclass,
                body,
            })),
        ))
    }

    fn parse_extends(&mut self) -> ParseResult<Option<NodeId>> {
        if self.eat_keyword("extends") {
            Ok(Some(self.parse_unary()?))
        } else {
            Ok(None)
        }
    }

    fn parse_class_body(&mut self) -> ParseResult<NodeId> {
        let start = self.expect_punct("{")?.start;
        let mut body = Vec::new();
        loop {
            while self.eat_punct(";") || self.eat_punct(",") {}
            if self.eat_punct("}") {
                break;
            }
            body.push(self.parse_class_member()?);
        }
        Ok(self.add(start, NodeData::Member(Member::ClassBody(ClassBody { body }))))
    }

    fn parse_class_member(&mut self) -> ParseResult<NodeId> {
        let start = self.peek().start;
        let is_static = self.eat_keyword("static");
        if self.at_keyword("constructor") {
            let token = self.advance();
            let key = self.add(token.start, ident("constructor".to_string()));
            let value = self.parse_function_value()?;
            return Ok(self.add(
                start,
                NodeData::Member(Member::Method(MethodDefinition {
                    kind: MethodKind::Constructor,
                    is_static,
                    key,
                    value,
                })),
            ));
        }
        if self.eat_keyword("function") {
            let key = self.identifier()?;
            let value = self.parse_function_value()?;
            return Ok(self.add(
                start,
                NodeData::Member(Member::Method(MethodDefinition {
                    kind: MethodKind::Method,
                    is_static,
                    key,
                    value,
                })),
            ));
        }
        let (key, computed) = self.parse_slot_key()?;
        self.expect_punct("=")?;
        let value = Some(self.parse_assignment()?);
        Ok(self.add(
            start,
            NodeData::Member(Member::Property(PropertyDefinition {
                is_static,
                computed,
                key,
                value,
            })),
        ))
    }

    /// `name`, `[expr]` or `"name"`; the flag tells whether the key is computed.
    fn parse_slot_key(&mut self) -> ParseResult<(NodeId, bool)> {
        if self.eat_punct("[") {
            let key = self.parse_expression()?;
            self.expect_punct("]")?;
            return Ok((key, true));
        }
        if let TokenKind::String(value) = self.peek().kind.clone() {
            let token = self.advance();
            let key = self.add(
                token.start,
                NodeData::Expression(Expression::Literal(LiteralValue::String(value))),
            );
            return Ok((key, true));
        }
        Ok((self.property_name()?, false))
    }

    /// Parameter list and body of a method, as a function expression.
    fn parse_function_value(&mut self) -> ParseResult<NodeId> {
        let start = self.peek().start;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(self.add(
            start,
            NodeData::Expression(Expression::Function(FunctionExpression { params, body })),
        ))
    }

    fn parse_enum(&mut self) -> ParseResult<NodeId> {
        let start = self.expect_keyword("enum")?.start;
        let id = self.identifier()?;
        self.expect_punct("{")?;
        let mut members = Vec::new();
        loop {
            while self.eat_punct(",") || self.eat_punct(";") {}
            if self.eat_punct("}") {
                break;
            }
            let member_id = self.identifier()?;
            let init = if self.eat_punct("=") {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            let member_start = self.start(member_id);
            members.push(self.add(
                member_start,
                NodeData::Member(Member::EnumMember(EnumMember { id: member_id, init })),
            ));
        }
        Ok(self.add(
            start,
            NodeData::Declaration(Declaration::Enum(EnumDeclaration { id, members })),
        ))
    }

    // expressions

    fn parse_expression(&mut self) -> ParseResult<NodeId> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ParseResult<NodeId> {
        let left = self.parse_conditional()?;
        let operator = match self.peek().kind {
            TokenKind::Punct("=") => AssignmentOperator::Assign,
            TokenKind::Punct("<-") => AssignmentOperator::NewSlot,
            TokenKind::Punct("+=") => AssignmentOperator::Add,
            TokenKind::Punct("-=") => AssignmentOperator::Sub,
            TokenKind::Punct("*=") => AssignmentOperator::Mul,
            TokenKind::Punct("/=") => AssignmentOperator::Div,
            TokenKind::Punct("%=") => AssignmentOperator::Mod,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_assignment()?;
        let start = self.start(left);
        Ok(self.add(
            start,
            NodeData::Expression(Expression::Assignment(AssignmentExpression {
                operator,
                left,
                right,
            })),
        ))
    }

    fn parse_conditional(&mut self) -> ParseResult<NodeId> {
        let test = self.parse_binary(1)?;
        if !self.eat_punct("?") {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect_punct(":")?;
        let alternate = self.parse_assignment()?;
        let start = self.start(test);
        Ok(self.add(
            start,
            NodeData::Expression(Expression::Conditional(ConditionalExpression {
                test,
                consequent,
                alternate,
            })),
        ))
    }

    fn binary_operator(&self) -> Option<(BinaryOperator, u8)> {
        let operator = match self.peek().kind {
            TokenKind::Punct("||") => (BinaryOperator::Or, 1),
            TokenKind::Punct("&&") => (BinaryOperator::And, 2),
            TokenKind::Punct("|") => (BinaryOperator::BitOr, 3),
            TokenKind::Punct("^") => (BinaryOperator::BitXor, 4),
            TokenKind::Punct("&") => (BinaryOperator::BitAnd, 5),
            TokenKind::Punct("==") => (BinaryOperator::Eq, 6),
            TokenKind::Punct("!=") => (BinaryOperator::Ne, 6),
            TokenKind::Punct("<=>") => (BinaryOperator::Cmp, 6),
            TokenKind::Punct("<") => (BinaryOperator::Lt, 7),
            TokenKind::Punct("<=") => (BinaryOperator::Le, 7),
            TokenKind::Punct(">") => (BinaryOperator::Gt, 7),
            TokenKind::Punct(">=") => (BinaryOperator::Ge, 7),
            TokenKind::Keyword("in") => (BinaryOperator::In, 7),
            TokenKind::Keyword("instanceof") => (BinaryOperator::InstanceOf, 7),
            TokenKind::Punct("<<") => (BinaryOperator::Shl, 8),
            TokenKind::Punct(">>") => (BinaryOperator::Shr, 8),
            TokenKind::Punct(">>>") => (BinaryOperator::UShr, 8),
            TokenKind::Punct("+") => (BinaryOperator::Add, 9),
            TokenKind::Punct("-") => (BinaryOperator::Sub, 9),
            TokenKind::Punct("*") => (BinaryOperator::Mul, 10),
            TokenKind::Punct("/") => (BinaryOperator::Div, 10),
            TokenKind::Punct("%") => (BinaryOperator::Mod, 10),
            _ => return None,
        };
        Some(operator)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<NodeId> {
        let mut left = self.parse_unary()?;
        while let Some((operator, precedence)) = self.binary_operator() {
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary(precedence + 1)?;
            let start = self.start(left);
            left = self.add(
                start,
                NodeData::Expression(Expression::Binary(BinaryExpression {
                    operator,
                    left,
                    right,
                })),
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<NodeId> {
        let token = self.peek().clone();
        let operator = match token.kind {
            TokenKind::Punct("-") => UnaryOperator::Neg,
            TokenKind::Punct("!") => UnaryOperator::Not,
            TokenKind::Punct("~") => UnaryOperator::BitNot,
            TokenKind::Punct("++") => UnaryOperator::Increment,
            TokenKind::Punct("--") => UnaryOperator::Decrement,
            TokenKind::Keyword("typeof") => UnaryOperator::TypeOf,
            TokenKind::Keyword("clone") => UnaryOperator::Clone,
            TokenKind::Keyword("delete") => UnaryOperator::Delete,
            TokenKind::Keyword("resume") => UnaryOperator::Resume,
            TokenKind::Keyword("yield") => {
                self.advance();
                let argument = if self.at_terminator() {
                    None
                } else {
                    Some(self.parse_assignment()?)
                };
                return Ok(self.add(
                    token.start,
                    NodeData::Expression(Expression::Yield(YieldExpression { argument })),
                ));
            }
            _ => return self.parse_postfix(),
        };
        self.advance();
        let argument = self.parse_unary()?;
        Ok(self.add(
            token.start,
            NodeData::Expression(Expression::Unary(UnaryExpression {
                operator,
                prefix: true,
                argument,
            })),
        ))
    }

    fn parse_postfix(&mut self) -> ParseResult<NodeId> {
        let mut expression = self.parse_primary()?;
        let start = self.start(expression);
        loop {
            let data = if self.eat_punct(".") {
                let property = self.property_name()?;
                Expression::Member(MemberExpression {
                    object: expression,
                    property,
                    computed: false,
                })
            } else if self.at_punct("[") && !self.peek().newline_before {
                self.advance();
                let property = self.parse_expression()?;
                self.expect_punct("]")?;
                Expression::Member(MemberExpression {
                    object: expression,
                    property,
                    computed: true,
                })
            } else if self.at_punct("(") {
                let arguments = self.parse_arguments()?;
                Expression::Call(CallExpression {
                    callee: expression,
                    arguments,
                })
            } else if (self.at_punct("++") || self.at_punct("--")) && !self.peek().newline_before {
                let operator = if self.advance().is_punct("++") {
                    UnaryOperator::Increment
                } else {
                    UnaryOperator::Decrement
                };
                Expression::Unary(UnaryExpression {
                    operator,
                    prefix: false,
                    argument: expression,
                })
            } else {
                return Ok(expression);
            };
            expression = self.add(start, NodeData::Expression(data));
        }
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<NodeId>> {
        self.expect_punct("(")?;
        let mut arguments = Vec::new();
        while !self.at_punct(")") {
            arguments.push(self.parse_assignment()?);
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> ParseResult<NodeId> {
        let token = self.peek().clone();
        let literal = match &token.kind {
            TokenKind::Identifier(name) => {
                self.advance();
                return Ok(self.add(token.start, ident(name.clone())));
            }
            TokenKind::Integer(value) => LiteralValue::Integer(*value),
            TokenKind::Float(value) => LiteralValue::Float(*value),
            TokenKind::String(value) => LiteralValue::String(value.clone()),
            TokenKind::Keyword("true") => LiteralValue::Bool(true),
            TokenKind::Keyword("false") => LiteralValue::Bool(false),
            TokenKind::Keyword("null") => LiteralValue::Null,
            TokenKind::Keyword("this") => {
                self.advance();
                return Ok(self.add(token.start, NodeData::Expression(Expression::This)));
            }
            TokenKind::Keyword("base") => {
                self.advance();
                return Ok(self.add(token.start, NodeData::Expression(Expression::Base)));
            }
            TokenKind::Punct("::") => {
                self.advance();
                let property = self.property_name()?;
                return Ok(self.add(
                    token.start,
                    NodeData::Expression(Expression::Root(RootExpression { property })),
                ));
            }
            TokenKind::Punct("(") => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_punct(")")?;
                return Ok(inner);
            }
            TokenKind::Punct("{") => return self.parse_table(),
            TokenKind::Punct("[") => return self.parse_array(),
            TokenKind::Punct("@") => return self.parse_lambda(),
            TokenKind::Keyword("function") => {
                self.advance();
                let params = self.parse_params()?;
                let body = self.parse_block()?;
                return Ok(self.add(
                    token.start,
                    NodeData::Expression(Expression::Function(FunctionExpression { params, body })),
                ));
            }
            TokenKind::Keyword("class") => {
                self.advance();
                let superclass = self.parse_extends()?;
                let body = self.parse_class_body()?;
                return Ok(self.add(
                    token.start,
                    NodeData::Expression(Expression::Class(ClassExpression { superclass, body })),
                ));
            }
            _ => return Err(self.error("expected expression")),
        };
        self.advance();
        Ok(self.add(token.start, NodeData::Expression(Expression::Literal(literal))))
    }

    fn parse_lambda(&mut self) -> ParseResult<NodeId> {
        let start = self.expect_punct("@")?.start;
        let params = self.parse_params()?;
        let body = self.parse_assignment()?;
        Ok(self.add(
            start,
            NodeData::Expression(Expression::Lambda(LambdaExpression { params, body })),
        ))
    }

    fn parse_array(&mut self) -> ParseResult<NodeId> {
        let start = self.expect_punct("[")?.start;
        let mut elements = Vec::new();
        while !self.at_punct("]") {
            elements.push(self.parse_assignment()?);
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct("]")?;
        Ok(self.add(
            start,
            NodeData::Expression(Expression::Array(ArrayExpression { elements })),
        ))
    }

    fn parse_table(&mut self) -> ParseResult<NodeId> {
        let start = self.expect_punct("{")?.start;
        let mut properties = Vec::new();
        loop {
            while self.eat_punct(",") || self.eat_punct(";") {}
            if self.eat_punct("}") {
                break;
            }
            properties.push(self.parse_table_slot()?);
        }
        Ok(self.add(
            start,
            NodeData::Expression(Expression::Table(TableExpression { properties })),
        ))
    }

    fn parse_table_slot(&mut self) -> ParseResult<NodeId> {
        let start = self.peek().start;
        if self.eat_keyword("function") {
            let key = self.identifier()?;
            let value = self.parse_function_value()?;
            return Ok(self.add(
                start,
                NodeData::Member(Member::Method(MethodDefinition {
                    kind: MethodKind::Method,
                    is_static: false,
                    key,
                    value,
                })),
            ));
        }
        let (key, computed) = self.parse_slot_key()?;
        if !self.eat_punct("=") {
            self.expect_punct(":")?;
        }
        let value = Some(self.parse_assignment()?);
        Ok(self.add(
            start,
            NodeData::Member(Member::Property(PropertyDefinition {
                is_static: false,
                computed,
                key,
                value,
            })),
        ))
    }
}

fn ident(name: String) -> NodeData {
    NodeData::Expression(Expression::Identifier(Identifier { name }))
}
