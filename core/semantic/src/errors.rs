//! Error types for analysis setup.
//!
//! Queries never fail: an unresolved reference is reported as `None`. Only
//! building an analysis (parsing sources, reading configuration, addressing
//! units) can go wrong.

use squirrel_ast::{errors::AstError, nodes::UnitId};
use thiserror::Error;

#[derive(Debug, Error)]
#[must_use = "errors must not be silently ignored"]
pub enum AnalysisError {
    #[error("{0} is not part of this analysis")]
    UnknownUnit(UnitId),

    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("failed to parse source: {0}")]
    Parse(#[from] AstError),
}
