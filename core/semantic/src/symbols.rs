use serde::{Deserialize, Serialize};
use squirrel_ast::nodes::{Location, NodeId};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Class,
    Method,
    Constructor,
    Property,
    Enum,
    EnumMember,
    Function,
    Variable,
    Constant,
}

/// Coarse category of an identifier, assigned by name during the build pass.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    Function,
    Class,
    Enum,
    EnumMember,
    Parameter,
    Variable,
    Property,
    Method,
}

/// Entry of the hierarchical document outline.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Range of the whole declaration.
    pub location: Location,
    /// Range of the name.
    pub selection: Location,
    pub node: NodeId,
    /// Initializer of the declaration, when it has one.
    #[serde(skip)]
    pub value: Option<NodeId>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<Symbol>,
}

impl Symbol {
    /// Whether this symbol stands for `node`, either as declaration or as its value.
    #[must_use]
    pub fn describes(&self, node: NodeId) -> bool {
        self.node == node || self.value == Some(node)
    }
}

/// Depth-first search through a symbol forest.
pub(crate) fn find_mut(symbols: &mut [Symbol], node: NodeId) -> Option<&mut Symbol> {
    for symbol in symbols {
        if symbol.describes(node) {
            return Some(symbol);
        }
        if let Some(found) = find_mut(&mut symbol.children, node) {
            return Some(found);
        }
    }
    None
}

/// Detaches the symbol declared by `node` from wherever it sits.
pub(crate) fn take(symbols: &mut Vec<Symbol>, node: NodeId) -> Option<Symbol> {
    if let Some(index) = symbols.iter().position(|symbol| symbol.node == node) {
        return Some(symbols.remove(index));
    }
    symbols
        .iter_mut()
        .find_map(|symbol| take(&mut symbol.children, node))
}
