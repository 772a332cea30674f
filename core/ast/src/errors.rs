//! Error types for the AST crate.
//!
//! Only the reference [`Builder`](crate::builder::Builder) produces these;
//! every query over an already built [`Ast`](crate::arena::Ast) is infallible.

use thiserror::Error;

use crate::nodes::Location;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[must_use = "errors must not be silently ignored"]
pub enum AstError {
    /// Source text the lexer cannot turn into a token.
    #[error("{location}: {message}")]
    Lex { message: String, location: Location },

    /// Token stream that does not form a valid construct.
    #[error("{location}: {message}")]
    Parse { message: String, location: Location },
}

impl AstError {
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            AstError::Lex { location, .. } | AstError::Parse { location, .. } => *location,
        }
    }
}
