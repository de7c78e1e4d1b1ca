//! # Source Units
//!
//! A parsed Go file together with the text edits queued against it.
//! The tree is never re-printed: edits are spliced into the original text, so
//! comments and formatting outside the edited ranges survive byte for byte.

use crate::error::{AppError, AppResult};
use std::fs;
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tree_sitter::{Parser, Tree};

/// A replacement of `range` (byte offsets into the original text).
///
/// An empty range is an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Byte range in the original source.
    pub range: Range<usize>,
    /// Text to put in its place.
    pub replacement: String,
}

impl TextEdit {
    /// Replaces `range` with `replacement`.
    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    /// Inserts `text` at byte offset `at`.
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at..at, text)
    }
}

/// A parsed Go source file plus its pending edits.
#[derive(Debug)]
pub struct SourceUnit {
    path: PathBuf,
    text: String,
    tree: Tree,
    edits: Vec<TextEdit>,
}

impl SourceUnit {
    /// The path this unit was read from and will be written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The original source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The syntax tree of the original text.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Edits queued so far.
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Queues edits to be applied by [`SourceUnit::render`].
    pub fn extend_edits(&mut self, edits: impl IntoIterator<Item = TextEdit>) {
        self.edits.extend(edits);
    }

    /// Produces the edited source text.
    ///
    /// Fails if two queued edits overlap, or if an edit range is reversed,
    /// out of bounds or splits a UTF-8 character.
    pub fn render(&self) -> AppResult<String> {
        let mut ordered: Vec<&TextEdit> = self.edits.iter().collect();
        ordered.sort_by_key(|e| (e.range.start, e.range.end));

        let mut out = String::with_capacity(self.text.len());
        let mut cursor = 0;
        for edit in ordered {
            let (start, end) = (edit.range.start, edit.range.end);
            if start < cursor
                || start > end
                || !self.text.is_char_boundary(start)
                || !self.text.is_char_boundary(end)
            {
                return Err(AppError::General(format!(
                    "Overlapping or invalid edit at {:?} in '{}'",
                    edit.range,
                    self.path.display()
                )));
            }
            out.push_str(&self.text[cursor..edit.range.start]);
            out.push_str(&edit.replacement);
            cursor = edit.range.end;
        }
        out.push_str(&self.text[cursor..]);
        Ok(out)
    }
}

/// Parses Go source text held in memory.
///
/// Source containing syntax errors is rejected, mirroring `go/parser`.
pub fn parse_source(path: impl Into<PathBuf>, text: String) -> AppResult<SourceUnit> {
    let path = path.into();
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| AppError::Parse {
            path: path.clone(),
            message: format!("Go grammar unavailable: {}", e),
        })?;

    let tree = parser.parse(&text, None).ok_or_else(|| AppError::Parse {
        path: path.clone(),
        message: "parser produced no tree".into(),
    })?;

    let root = tree.root_node();
    if root.has_error() {
        let position = first_error_position(&tree)
            .map(|(row, col)| format!(" at {}:{}", row + 1, col + 1))
            .unwrap_or_default();
        return Err(AppError::Parse {
            path,
            message: format!("syntax error{}", position),
        });
    }

    Ok(SourceUnit {
        path,
        text,
        tree,
        edits: Vec::new(),
    })
}

fn first_error_position(tree: &Tree) -> Option<(usize, usize)> {
    let mut cursor = tree.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            let p = node.start_position();
            return Some((p.row, p.column));
        }
        // Only descend into subtrees known to contain the error.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Reads and writes Go files for the tag writer.
pub trait SourceBackend {
    /// Reads and parses the file at `path`.
    fn parse_file(&self, path: &Path) -> AppResult<SourceUnit>;

    /// Persists `unit` (with its edits applied) back to its path.
    fn write_file(&self, unit: &SourceUnit) -> AppResult<()>;
}

/// Filesystem backend.
///
/// Writes go to a temporary file next to the target which then replaces it,
/// so a failed write never leaves a truncated file behind.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoFileBackend;

impl SourceBackend for GoFileBackend {
    fn parse_file(&self, path: &Path) -> AppResult<SourceUnit> {
        let text = fs::read_to_string(path).map_err(|source| AppError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        parse_source(path, text)
    }

    fn write_file(&self, unit: &SourceUnit) -> AppResult<()> {
        let path = unit.path();
        let rendered = unit.render()?;
        let write_err = |source| AppError::Write {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(rendered.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;

        // Keep the original permissions on the replacement.
        if let Ok(meta) = fs::metadata(path) {
            fs::set_permissions(tmp.path(), meta.permissions()).map_err(write_err)?;
        }

        tmp.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SRC: &str = "package models\n\n// User is a user.\ntype User struct {\n\tName string\n}\n";

    #[test]
    fn test_parse_valid_source() {
        let unit = parse_source("user.go", SRC.to_string()).unwrap();
        assert_eq!(unit.tree().root_node().kind(), "source_file");
        assert_eq!(unit.text(), SRC);
        assert!(unit.edits().is_empty());
    }

    #[test]
    fn test_parse_rejects_syntax_errors() {
        let err = parse_source("broken.go", "package x\ntype User struct {".to_string()).unwrap_err();
        match err {
            AppError::Parse { path, message } => {
                assert_eq!(path, PathBuf::from("broken.go"));
                assert!(message.starts_with("syntax error"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_render_applies_edits_in_order() {
        let mut unit = parse_source("user.go", SRC.to_string()).unwrap();
        let name_end = SRC.find("Name string").unwrap() + "Name string".len();
        unit.extend_edits([
            TextEdit::insert(name_end, " `json:\"name\"`"),
            TextEdit::replace(0..14, "package model"),
        ]);
        let out = unit.render().unwrap();
        assert_eq!(
            out,
            "package model\n\n// User is a user.\ntype User struct {\n\tName string `json:\"name\"`\n}\n"
        );
    }

    #[test]
    fn test_render_rejects_overlap() {
        let mut unit = parse_source("user.go", SRC.to_string()).unwrap();
        unit.extend_edits([TextEdit::replace(0..10, "a"), TextEdit::replace(5..12, "b")]);
        assert!(unit.render().is_err());
    }

    #[test]
    fn test_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.go");
        fs::write(&path, SRC).unwrap();

        let backend = GoFileBackend;
        let mut unit = backend.parse_file(&path).unwrap();
        let at = SRC.find("string").unwrap();
        unit.extend_edits([TextEdit::replace(at..at + 6, "int")]);
        backend.write_file(&unit).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\tName int\n"));
        assert!(written.contains("// User is a user."));
    }

    #[test]
    fn test_backend_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.go");
        let err = GoFileBackend.parse_file(&missing).unwrap_err();
        assert!(err.to_string().contains("nope.go"));
        match err {
            AppError::Read { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected read error, got {other:?}"),
        }
    }

    #[test]
    fn test_render_rejects_reversed_range() {
        let mut unit = parse_source("user.go", SRC.to_string()).unwrap();
        unit.extend_edits([TextEdit::replace(10..3, "x")]);
        assert!(matches!(unit.render(), Err(AppError::General(_))));
    }

    #[test]
    fn test_render_rejects_split_char() {
        let src = "package m\n\n// héllo\ntype A struct{ X int }\n";
        let mut unit = parse_source("a.go", src.to_string()).unwrap();
        let inside = src.find('é').unwrap() + 1;
        unit.extend_edits([TextEdit::insert(inside, "x")]);
        assert!(matches!(unit.render(), Err(AppError::General(_))));

        let mut unit = parse_source("a.go", src.to_string()).unwrap();
        unit.extend_edits([TextEdit::insert(src.find('é').unwrap(), "e")]);
        assert!(unit.render().unwrap().contains("// eéllo"));
    }
}
