#![deny(missing_docs)]

//! # Tagsmith Core
//!
//! Rewrites, injects and hides Go struct field tags (`json:"..."` and
//! friends) while leaving the rest of the source untouched.
//!
//! ```no_run
//! use tagsmith_core::{RecordTags, TagWriter, WriterConfig};
//! use std::path::Path;
//!
//! let writer = TagWriter::new(&WriterConfig::default()).unwrap();
//! let mut tags = RecordTags::new().with("User", "Email", "email,omitempty");
//! writer.overwrite_tags(Path::new("models/user.go"), &mut tags).unwrap();
//! ```

/// Shared error types.
pub mod error;

/// Writer settings and batch manifests.
pub mod config;

/// Go parsing, traversal and writing.
pub mod syntax;

/// Struct tag rewriting.
pub mod tags;

pub use config::{load_hide_manifest, load_tag_manifest, WriterConfig};
pub use error::{AppError, AppResult};
pub use tags::{
    DiagnosticsSink, FieldSet, FieldTags, FileFieldSets, FileTags, MissingSegment, RecordFieldSets,
    RecordTags, TagRule, TagWriter, OMIT,
};
