#![warn(clippy::pedantic)]
//! Semantic resolution for Squirrel sources.
//!
//! This crate answers the questions an editor asks about a dynamically typed
//! scripting language: where a name is declared, what value an expression
//! ultimately stands for, which members a value exposes and what type to
//! display for it. Every answer is best effort; an unresolved reference is
//! `None`, never an error.
//!
//! ## Core Features
//!
//! **Symbol tables** (built once per unit):
//! - Declaration entries keyed by name nodes, lexical scopes with arity
//!   variations for overloaded functions
//! - A hierarchical document outline and coarse semantic tokens
//! - Literal string keys normalized so `obj["x"]` reads like `obj.x`
//! - Import hints from configured call names (`require("a.nut")`)
//! - Documentation comments attached to declarations, with type, return,
//!   alias, augments, getter/setter and property annotations
//!
//! **Resolution** (on demand, memoized):
//! - Definitions through lexical scopes, class bodies, superclass chains,
//!   qualified namespaces and statically imported units
//! - Values through initializers, calls, constructors, `this`/`base`,
//!   meta getters and documented return types
//! - Display types from annotations or from value shapes
//!
//! ## Cycle Safety
//!
//! Scripts routinely contain reference cycles (`a = b; b = a`, classes
//! extending each other, tables holding themselves). Each query carries a
//! [`resolver::Walk`] that tracks the `(query, unit, node)` frames on the
//! current path and the nesting depth. Re-entering a frame or exceeding
//! [`config::AnalysisConfig::max_depth`] aborts that path, and results that
//! depend on an aborted path are not memoized.
//!
//! ## Build Pipeline
//!
//! Each unit goes through a single traversal followed by three finishing
//! steps, always in this order:
//!
//! 1. **Call inference** - import hints from import-like calls
//! 2. **Documentation** - comments attached, annotations recorded, synthetic
//!    meta properties created
//! 3. **Namespaces** - qualified declarations (`function A::f()`,
//!    `A.f <- ...`) recorded under the resolved owner and, within a unit,
//!    moved under the owner in the outline
//!
//! Step 3 resolves owner expressions, so it runs only once every unit of a
//! batch has finished its first two steps.
//!
//! ## Quick Start
//!
//! ```
//! use squirrel_semantic::{AnalysisBuilder, type_info::TypeLabel};
//!
//! let source = "local abc = 123; abc;";
//! let analysis = AnalysisBuilder::new()
//!     .add_source(source)?
//!     .build()
//!     .analysis();
//!
//! let unit = analysis.units().next().map(|unit| unit.id()).unwrap();
//! let branch = analysis.branch_at(unit, 17).unwrap();
//! assert!(analysis.resolve_definition(&branch).is_some());
//! assert_eq!(analysis.infer_type(&branch), TypeLabel::Integer);
//! # Ok::<(), squirrel_semantic::errors::AnalysisError>(())
//! ```
//!
//! ## Public Modules
//!
//! - [`analysis`] - the [`Analysis`](analysis::Analysis) facade and its queries
//! - [`config`] - tunables, loadable from JSON
//! - [`resolver`] - resolution results ([`resolver::Value`]) and walk state
//! - [`tables`] - per-unit side tables
//! - [`type_info`] - display types

use std::marker::PhantomData;

use squirrel_ast::{arena::Ast, builder::parse};
use tracing::debug;

use crate::{
    analysis::Analysis, config::AnalysisConfig, errors::AnalysisError, imports::ImportResolver,
};

pub mod analysis;
pub mod config;
pub mod errors;
pub mod imports;
pub mod resolver;
pub(crate) mod symbol_table;
pub mod symbols;
pub mod tables;
pub mod type_info;
pub mod unit;

/// Marker state: units are still being collected.
pub struct AnalysisInitState;

/// Marker state: every unit went through the whole pipeline.
pub struct AnalysisCompleteState;

pub type CompletedAnalysisBuilder = AnalysisBuilder<AnalysisCompleteState>;

/// Builder for analysing a batch of units together.
///
/// Uses the typestate pattern so that the analysis can only be taken out once
/// cross-unit namespaces have been resolved for the whole batch.
pub struct AnalysisBuilder<S> {
    analysis: Analysis,
    pending: Vec<Ast>,
    _state: PhantomData<S>,
}

impl Default for AnalysisBuilder<AnalysisInitState> {
    fn default() -> Self {
        AnalysisBuilder::new()
    }
}

impl AnalysisBuilder<AnalysisInitState> {
    #[must_use]
    pub fn new() -> Self {
        AnalysisBuilder {
            analysis: Analysis::default(),
            pending: Vec::new(),
            _state: PhantomData,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.analysis.config = config;
        self
    }

    /// Sets the import relation. Unit ids are assigned in the order units
    /// are added, starting at zero.
    #[must_use]
    pub fn with_import_resolver(mut self, imports: impl ImportResolver + 'static) -> Self {
        self.analysis.set_import_resolver(imports);
        self
    }

    #[must_use]
    pub fn add_ast(mut self, ast: Ast) -> Self {
        self.pending.push(ast);
        self
    }

    /// # Errors
    ///
    /// Returns [`AnalysisError::Parse`] when the source does not parse.
    pub fn add_source(self, source: &str) -> Result<Self, AnalysisError> {
        Ok(self.add_ast(parse(source)?))
    }

    /// Runs the main pass and the first two finishing steps on every unit,
    /// then namespace resolution on every unit.
    #[must_use = "returns builder with the finished analysis, extract with .analysis()"]
    pub fn build(self) -> AnalysisBuilder<AnalysisCompleteState> {
        let AnalysisBuilder {
            mut analysis,
            pending,
            ..
        } = self;
        debug!(units = pending.len(), "building analysis");
        let ids: Vec<_> = pending
            .into_iter()
            .map(|ast| analysis.insert_unit(ast))
            .collect();
        for id in ids {
            analysis.resolve_namespaces(id, true);
        }
        AnalysisBuilder {
            analysis,
            pending: Vec::new(),
            _state: PhantomData,
        }
    }
}

impl AnalysisBuilder<AnalysisCompleteState> {
    /// Consume the builder and return the analysis.
    #[must_use = "consumes builder and returns the analysis"]
    pub fn analysis(self) -> Analysis {
        self.analysis
    }
}
