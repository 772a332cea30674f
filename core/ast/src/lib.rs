#![warn(clippy::pedantic)]
//! Arena AST for Squirrel sources.
//!
//! Nodes live in an index-based [`arena::Ast`] and carry no parent pointers;
//! ancestry is expressed with [`branch::Branch`] paths. Child enumeration goes
//! through the static tables in [`fields`]. The [`builder`] module is a
//! reference parser producing this arena from source text, with `/** */`
//! comments read into [`doc::DocAttribute`] lists.
pub mod arena;
pub mod branch;
pub mod builder;
pub mod doc;
pub mod errors;
pub mod fields;
pub mod lexer;
pub mod nodes;
pub(crate) mod nodes_impl;
