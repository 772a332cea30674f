//! Symbol Table Builder
//!
//! A single depth-first pass over a freshly parsed unit. For every declaring
//! construct it records a declaration entry keyed by the name node, a coarse
//! token, a lexical scope entry and a node in the hierarchical symbol tree.
//! Literal string keys are normalized on the side so that `obj["x"]` resolves
//! like `obj.x` without touching the tree.
//!
//! The pass also fills worklists that a fixed finishing pipeline consumes,
//! exactly once and in order:
//!
//! 1. call-based inference of import hints,
//! 2. documentation attachment (see [`documentation`]),
//! 3. namespace re-parenting. This step needs the resolver and the other
//!    units, so the builder only hands its worklist over and
//!    [`Analysis`](crate::analysis::Analysis) runs it.

mod documentation;

use rustc_hash::FxHashMap;
use squirrel_ast::{
    arena::Ast,
    branch::Branch,
    fields::FieldTable,
    nodes::{
        AssignmentExpression, AssignmentOperator, Declaration, Expression, LiteralValue, Member,
        MethodKind, Node, NodeData, NodeId, NodeKind, PropertyDefinition, Statement, UnitId,
        VariableDeclarator, VariableKind,
    },
};
use tracing::{debug, trace};

use crate::{
    config::AnalysisConfig,
    symbols::{Symbol, SymbolKind, TokenKind},
    tables::{DeclarationEntry, ImportHint, ScopedName, SideTables},
    unit::Unit,
};

/// Nodes that own a lexical scope.
pub(crate) fn is_scope(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::SourceFile
            | NodeKind::BlockStatement
            | NodeKind::FunctionDeclaration
            | NodeKind::FunctionExpression
            | NodeKind::LambdaExpression
            | NodeKind::ForStatement
            | NodeKind::ForeachStatement
            | NodeKind::TryStatement
    )
}

pub(crate) struct SymbolTableBuilder<'a> {
    config: &'a AnalysisConfig,
    ast: Ast,
    tables: SideTables,
    /// Branch of the node being visited.
    path: Branch,
    symbols: Vec<Symbol>,
    /// Symbols whose subtree is still being visited, innermost last.
    open: Vec<Symbol>,
    calls: Vec<Branch>,
    namespaced: Vec<Branch>,
    literal_strings: Vec<NodeId>,
    references: Vec<NodeId>,
    /// First token registered for each declared name.
    name_tokens: FxHashMap<String, TokenKind>,
}

impl<'a> SymbolTableBuilder<'a> {
    pub(crate) fn new(config: &'a AnalysisConfig, mut ast: Ast, unit: UnitId) -> Self {
        ast.set_unit(unit);
        let path = Branch::root(&ast);
        Self {
            config,
            ast,
            tables: SideTables::default(),
            path,
            symbols: Vec::new(),
            open: Vec::new(),
            calls: Vec::new(),
            namespaced: Vec::new(),
            literal_strings: Vec::new(),
            references: Vec::new(),
            name_tokens: FxHashMap::default(),
        }
    }

    /// Runs the main pass and the first two finishing steps.
    pub(crate) fn build(mut self) -> Unit {
        let unit = self.ast.unit();
        debug!(%unit, nodes = self.ast.len(), "building symbol table");
        let root = self.ast.root();
        self.visit(root);
        self.assign_reference_tokens();

        let hints = self.infer_from_calls();
        debug!(%unit, calls = self.calls.len(), hints = hints.len(), "call-based inference done");

        self.attach_documentation();
        debug!(
            %unit,
            comments = self.ast.comments().len(),
            namespaced = self.namespaced.len(),
            "documentation attached"
        );

        Unit {
            id: unit,
            ast: self.ast,
            tables: self.tables,
            symbols: self.symbols,
            hints,
            literal_strings: self.literal_strings,
            pending_namespaces: self.namespaced,
        }
    }

    fn visit(&mut self, id: NodeId) {
        let Some(node) = self.ast.get(id).cloned() else {
            return;
        };
        let opened = self.register(&node);
        for child in node.children(FieldTable::Full) {
            self.path.push(child);
            self.visit(child);
            self.path.pop();
        }
        if opened {
            self.close_symbol();
        }
    }

    /// Records what `node` declares. Returns whether a symbol was opened for it.
    fn register(&mut self, node: &Node) -> bool {
        match &node.data {
            NodeData::Declaration(Declaration::Declarator(declarator)) => {
                self.register_declarator(node, declarator)
            }
            NodeData::Declaration(Declaration::Function(function)) => {
                self.declare_params(&function.params);
                self.register_named(
                    node,
                    function.id,
                    (TokenKind::Function, SymbolKind::Function),
                    None,
                    function.qualifier.is_some(),
                )
            }
            NodeData::Declaration(Declaration::Class(class)) => self.register_named(
                node,
                class.id,
                (TokenKind::Class, SymbolKind::Class),
                None,
                class.qualifier.is_some(),
            ),
            NodeData::Declaration(Declaration::Enum(declaration)) => self.register_named(
                node,
                declaration.id,
                (TokenKind::Enum, SymbolKind::Enum),
                None,
                false,
            ),
            NodeData::Member(Member::EnumMember(member)) => {
                self.declare_name(member.id, node.id, TokenKind::EnumMember);
                self.open_symbol(node, member.id, SymbolKind::EnumMember, member.init)
            }
            NodeData::Member(Member::Method(method)) => {
                let kind = match method.kind {
                    MethodKind::Constructor => SymbolKind::Constructor,
                    MethodKind::Method => SymbolKind::Method,
                };
                self.declare_name(method.key, node.id, TokenKind::Method);
                self.open_symbol(node, method.key, kind, Some(method.value))
            }
            NodeData::Member(Member::Property(property)) => self.register_property(node, property),
            NodeData::Expression(Expression::Function(function)) => {
                self.declare_params(&function.params);
                false
            }
            NodeData::Expression(Expression::Lambda(lambda)) => {
                self.declare_params(&lambda.params);
                false
            }
            NodeData::Statement(Statement::Foreach(foreach)) => {
                for binding in foreach.index.into_iter().chain([foreach.value]) {
                    self.declare_binding(binding);
                }
                false
            }
            NodeData::Statement(Statement::Try(statement)) => {
                if let Some(param) = statement.param {
                    self.declare_binding(param);
                }
                false
            }
            NodeData::Expression(Expression::Assignment(assignment))
                if assignment.operator == AssignmentOperator::NewSlot =>
            {
                self.register_newslot(node, assignment)
            }
            NodeData::Expression(Expression::Member(member)) => {
                if member.computed {
                    self.normalize_key(member.property);
                }
                false
            }
            NodeData::Expression(Expression::Call(_)) => {
                self.calls.push(self.path.clone());
                false
            }
            NodeData::Expression(Expression::Literal(LiteralValue::String(_))) => {
                self.literal_strings.push(node.id);
                false
            }
            NodeData::Expression(Expression::Identifier(_)) => {
                if !self.tables.declarations.contains(node.id) {
                    self.references.push(node.id);
                }
                false
            }
            _ => false,
        }
    }

    fn register_declarator(&mut self, node: &Node, declarator: &VariableDeclarator) -> bool {
        let constant = self
            .path
            .parent()
            .and_then(|parent| self.ast.get(parent))
            .is_some_and(|parent| {
                matches!(
                    &parent.data,
                    NodeData::Declaration(Declaration::Variable(declaration))
                        if declaration.kind == VariableKind::Const
                )
            });
        let kinds = match self.value_kinds(declarator.init) {
            (TokenKind::Variable, SymbolKind::Variable) if constant => {
                (TokenKind::Variable, SymbolKind::Constant)
            }
            kinds => kinds,
        };
        self.register_named(node, declarator.id, kinds, declarator.init, false)
    }

    /// Declares a named construct in its enclosing scope, or queues it for
    /// namespace re-parenting when the name is qualified.
    fn register_named(
        &mut self,
        node: &Node,
        name_node: NodeId,
        (token, kind): (TokenKind, SymbolKind),
        value: Option<NodeId>,
        namespaced: bool,
    ) -> bool {
        self.declare_name(name_node, node.id, token);
        if namespaced {
            self.namespaced.push(self.path.clone());
        } else if let Some(name) = self.ast.identifier_name(name_node).map(str::to_string) {
            let scope = self
                .path
                .ancestors()
                .find(|(_, id)| self.ast.kind(*id).is_some_and(is_scope))
                .map_or(self.ast.root(), |(_, id)| id);
            self.add_scoped(scope, name, self.path.clone());
        }
        self.open_symbol(node, name_node, kind, value)
    }

    fn register_property(&mut self, node: &Node, property: &PropertyDefinition) -> bool {
        if property.computed && !self.normalize_key(property.key) {
            return false;
        }
        let kinds = match self.value_kinds(property.value) {
            (TokenKind::Function, _) => (TokenKind::Method, SymbolKind::Method),
            (TokenKind::Class, kind) => (TokenKind::Class, kind),
            _ => (TokenKind::Property, SymbolKind::Property),
        };
        self.declare_name(property.key, node.id, kinds.0);
        self.open_symbol(node, property.key, kinds.1, property.value)
    }

    fn register_newslot(&mut self, node: &Node, assignment: &AssignmentExpression) -> bool {
        let Some(left) = self.ast.get(assignment.left).cloned() else {
            return false;
        };
        let (token, kind) = self.value_kinds(Some(assignment.right));
        let name_node = match &left.data {
            NodeData::Expression(Expression::Identifier(_)) => left.id,
            NodeData::Expression(Expression::Root(root)) => root.property,
            NodeData::Expression(Expression::Member(member)) => {
                if member.computed && !self.normalize_key(member.property) {
                    return false;
                }
                let (token, kind) = match token {
                    TokenKind::Function => (TokenKind::Method, SymbolKind::Method),
                    TokenKind::Class => (TokenKind::Class, SymbolKind::Class),
                    _ => (TokenKind::Property, SymbolKind::Property),
                };
                self.declare_name(member.property, node.id, token);
                self.namespaced.push(self.path.clone());
                return self.open_symbol(node, member.property, kind, Some(assignment.right));
            }
            _ => return false,
        };
        // A plain or `::` newslot creates a slot in the root table.
        self.declare_name(name_node, node.id, token);
        if let Some(name) = self.ast.identifier_name(name_node).map(str::to_string) {
            self.add_scoped(self.ast.root(), name, self.path.clone());
        }
        self.open_symbol(node, name_node, kind, Some(assignment.right))
    }

    /// Registers the parameters of the callable being visited in its own scope.
    fn declare_params(&mut self, params: &[NodeId]) {
        let scope = self.path.target();
        for param in params {
            let Some(param_node) = self.ast.get(*param) else {
                continue;
            };
            let name_node = match param_node.kind() {
                NodeKind::Identifier => *param,
                NodeKind::AssignmentPattern => match param_node.name_node() {
                    Some(left) => left,
                    None => continue,
                },
                _ => continue,
            };
            let Some(name) = self.ast.identifier_name(name_node).map(str::to_string) else {
                continue;
            };
            self.declare_name(name_node, *param, TokenKind::Parameter);
            self.add_scoped(scope, name, self.path.child(*param));
        }
    }

    /// Loop and catch variables: the identifier declares itself.
    fn declare_binding(&mut self, binding: NodeId) {
        let Some(name) = self.ast.identifier_name(binding).map(str::to_string) else {
            return;
        };
        self.declare_name(binding, binding, TokenKind::Variable);
        self.add_scoped(self.path.target(), name, self.path.child(binding));
    }

    fn declare_name(&mut self, name_node: NodeId, declaring: NodeId, token: TokenKind) {
        self.tables.declarations.insert(
            name_node,
            DeclarationEntry { declaring, token },
        );
        self.tables.tokens.insert(name_node, token);
        if let Some(name) = self.tables.key_name(&self.ast, name_node).map(str::to_string) {
            self.name_tokens.entry(name).or_insert(token);
        }
    }

    fn add_scoped(&mut self, scope: NodeId, name: String, declaration: Branch) {
        self.tables
            .scopes
            .entry(scope)
            .or_default()
            .push(ScopedName { name, declaration });
    }

    /// Records a literal string key as a plain name. Returns whether `key`
    /// was such a literal.
    fn normalize_key(&mut self, key: NodeId) -> bool {
        let Some(name) = self
            .ast
            .get(key)
            .and_then(Node::literal)
            .and_then(LiteralValue::as_str)
            .map(str::to_string)
        else {
            return false;
        };
        self.tables.normalized_keys.insert(key, name);
        true
    }

    fn value_kinds(&self, value: Option<NodeId>) -> (TokenKind, SymbolKind) {
        match value.and_then(|value| self.ast.kind(value)) {
            Some(kind) if kind.is_function() => (TokenKind::Function, SymbolKind::Function),
            Some(kind) if kind.is_class() => (TokenKind::Class, SymbolKind::Class),
            _ => (TokenKind::Variable, SymbolKind::Variable),
        }
    }

    fn open_symbol(
        &mut self,
        node: &Node,
        name_node: NodeId,
        kind: SymbolKind,
        value: Option<NodeId>,
    ) -> bool {
        let Some(name) = self.tables.key_name(&self.ast, name_node).map(str::to_string) else {
            return false;
        };
        let Some(selection) = self.ast.location(name_node) else {
            return false;
        };
        if !node.location.contains(&selection) {
            trace!(node = %node.id, name, "name outside of its declaration, symbol skipped");
            return false;
        }
        self.open.push(Symbol {
            name,
            kind,
            location: node.location,
            selection,
            node: node.id,
            value,
            children: Vec::new(),
        });
        true
    }

    fn close_symbol(&mut self) {
        let Some(symbol) = self.open.pop() else {
            return;
        };
        match self.open.last_mut() {
            Some(parent) => parent.children.push(symbol),
            None => self.symbols.push(symbol),
        }
    }

    fn assign_reference_tokens(&mut self) {
        for id in std::mem::take(&mut self.references) {
            let token = self
                .ast
                .identifier_name(id)
                .and_then(|name| self.name_tokens.get(name))
                .copied();
            if let Some(token) = token {
                self.tables.tokens.insert(id, token);
            }
        }
    }

    /// Finishing step 1: import-like calls with a literal first argument.
    fn infer_from_calls(&self) -> Vec<ImportHint> {
        self.calls
            .iter()
            .filter_map(|branch| {
                let call_id = branch.target();
                let call = self.ast.get(call_id)?.as_call()?;
                let callee = self.ast.get(call.callee)?;
                let function = match &callee.data {
                    NodeData::Expression(Expression::Identifier(identifier)) => {
                        identifier.name.as_str()
                    }
                    NodeData::Expression(Expression::Root(root)) => {
                        self.ast.identifier_name(root.property)?
                    }
                    _ => return None,
                };
                if !self.config.is_import_function(function) {
                    return None;
                }
                let path = self
                    .ast
                    .get(*call.arguments.first()?)?
                    .literal()?
                    .as_str()?;
                Some(ImportHint {
                    function: function.to_string(),
                    path: path.to_string(),
                    call: call_id,
                    location: self.ast.location(call_id)?,
                })
            })
            .collect()
    }
}
