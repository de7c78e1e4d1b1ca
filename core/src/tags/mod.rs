#![deny(missing_docs)]

//! # Struct Tags
//!
//! Rewriting Go struct field tags.
//!
//! - **mapping**: obligation maps (struct -> field -> value) and hide sets.
//! - **rule**: the per-key text rewrite of a tag literal.
//! - **writer**: the file-level rewrite, hide and batch operations.
//! - **diagnostics**: advisory events emitted while rewriting.

/// Advisory rewrite events.
pub mod diagnostics;

/// Obligation and field-set maps.
pub mod mapping;

/// Tag segment matching and rewriting.
pub mod rule;

/// File-level tag operations.
pub mod writer;

pub use diagnostics::{DiagnosticsSink, NoopSink, TracingSink};
pub use mapping::{FieldSet, FieldTags, FileFieldSets, FileTags, RecordFieldSets, RecordTags};
pub use rule::{MissingSegment, TagRule, OMIT};
pub use writer::TagWriter;
