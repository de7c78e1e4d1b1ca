//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the crate.

use derive_more::{Display, From};
use std::path::PathBuf;

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// A required input (syntax tree, manifest entry) was absent.
    #[from(ignore)]
    #[display("Missing input: {_0}")]
    MissingInput(String),

    /// A source file or manifest could not be read.
    #[from(ignore)]
    #[display("Failed to read '{}': {source}", path.display())]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying IO failure.
        source: std::io::Error,
    },

    /// The source file could not be turned into a syntax tree.
    #[from(ignore)]
    #[display("Failed to parse '{}': {message}", path.display())]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// Some requested fields were never found, so nothing was written.
    #[from(ignore)]
    #[display("Failed to update all structs in '{}': missing {}", path.display(), missing.join(", "))]
    IncompleteRewrite {
        /// File being rewritten.
        path: PathBuf,
        /// Unmatched obligations as `Record.Field` (or `Record` when it had no fields).
        missing: Vec<String>,
    },

    /// The rewritten source could not be persisted.
    #[from(ignore)]
    #[display("Failed to write '{}': {source}", path.display())]
    Write {
        /// Destination file.
        path: PathBuf,
        /// Underlying IO failure.
        source: std::io::Error,
    },

    /// A targeted struct name is declared more than once in the file.
    #[from(ignore)]
    #[display("Struct '{record}' is declared more than once in '{}'", path.display())]
    DuplicateRecord {
        /// File being rewritten.
        path: PathBuf,
        /// The ambiguous struct name.
        record: String,
    },

    /// A requested tag value cannot be written into a Go tag literal.
    #[from(ignore)]
    #[display("Invalid tag value {value:?} for field '{record}.{field}'")]
    InvalidTagValue {
        /// Struct name.
        record: String,
        /// Field name.
        field: String,
        /// Offending value.
        value: String,
    },

    /// Bad configuration or manifest contents.
    #[from(ignore)]
    #[display("Config Error: {_0}")]
    Config(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Io(e)
            | AppError::Read { source: e, .. }
            | AppError::Write { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
