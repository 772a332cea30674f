use crate::{
    doc::DocComment,
    fields::FieldTable,
    lexer::{LineIndex, to_offset},
    nodes::{Location, Node, NodeData, NodeId, NodeKind, UnitId},
};

/// Index-based node storage for one parsed unit.
///
/// A node's [`NodeId`] is its position in the arena. Parsed nodes are stored
/// children-first, so every child id is smaller than its parent's. Nodes are
/// never removed; synthetic nodes appended after parsing are reported by
/// [`Ast::is_synthetic`].
#[derive(Clone, Debug)]
pub struct Ast {
    unit: UnitId,
    nodes: Vec<Node>,
    root: NodeId,
    comments: Vec<DocComment>,
    lines: LineIndex,
    parsed_len: usize,
}

impl Ast {
    /// Wraps nodes produced by a parser. `nodes[i].id` must be `NodeId(i)` and
    /// `root` must be a `SourceFile` node.
    #[must_use]
    pub fn new(nodes: Vec<Node>, root: NodeId, comments: Vec<DocComment>, source: &str) -> Self {
        let parsed_len = nodes.len();
        Self {
            unit: UnitId::default(),
            nodes,
            root,
            comments,
            lines: LineIndex::new(source),
            parsed_len,
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn unit(&self) -> UnitId {
        self.unit
    }

    pub fn set_unit(&mut self, unit: UnitId) {
        self.unit = unit;
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this arena.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(Node::kind)
    }

    #[must_use]
    pub fn location(&self, id: NodeId) -> Option<Location> {
        self.get(id).map(|node| node.location)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn filter_nodes<T: Fn(&Node) -> bool>(&self, fn_predicate: T) -> Vec<&Node> {
        self.nodes.iter().filter(|node| fn_predicate(node)).collect()
    }

    /// Appends a synthetic node that no parsed node refers to.
    pub fn alloc(&mut self, location: Location, data: NodeData) -> NodeId {
        let id = NodeId(to_offset(self.nodes.len()));
        self.nodes.push(Node { id, location, data });
        id
    }

    #[must_use]
    pub fn is_synthetic(&self, id: NodeId) -> bool {
        id.index() >= self.parsed_len
    }

    /// Children of `id` through the given field table, in document order.
    /// Unknown ids have no children.
    pub fn children(&self, id: NodeId, table: FieldTable) -> impl Iterator<Item = NodeId> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(move |node| node.children(table))
    }

    #[must_use]
    pub fn comments(&self) -> &[DocComment] {
        &self.comments
    }

    #[must_use]
    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(Node::identifier_name)
    }

    /// Converts a 1-based line and column into a byte offset.
    #[must_use]
    pub fn offset_at(&self, line: u32, column: u32) -> Option<u32> {
        self.lines.offset(line, column)
    }
}
