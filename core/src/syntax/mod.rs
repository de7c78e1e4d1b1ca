#![deny(missing_docs)]

//! # Go Syntax
//!
//! Parsing, traversal and writing of Go source files.
//!
//! - **source**: `SourceUnit`, pending text edits and the file backend.
//! - **walk**: pre-order traversal with per-node pruning.
//! - **decl**: typed views over struct and field declarations.

/// Struct and field declaration views.
pub mod decl;

/// Source units, edits and the parse/write backend.
pub mod source;

/// Depth-first traversal.
pub mod walk;

pub use decl::{FieldDecl, RecordDecl, TagLiteral, TagQuoting};
pub use source::{parse_source, GoFileBackend, SourceBackend, SourceUnit, TextEdit};
pub use walk::{walk, SyntaxVisitor, Visit};
