//! # Tag Writer
//!
//! Applies tag obligations to Go files: parse, walk the struct declarations,
//! rewrite or inject tags, and write the file back only if every requested
//! field was found.

use crate::config::WriterConfig;
use crate::error::{AppError, AppResult};
use crate::syntax::{
    walk, FieldDecl, GoFileBackend, RecordDecl, SourceBackend, SyntaxVisitor, TagQuoting,
    TextEdit, Visit,
};
use crate::tags::diagnostics::{DiagnosticsSink, TracingSink};
use crate::tags::mapping::{FileFieldSets, FileTags, RecordFieldSets, RecordTags};
use crate::tags::rule::TagRule;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tree_sitter::Node;

/// Rewrites struct field tags in Go files.
pub struct TagWriter<B = GoFileBackend> {
    backend: B,
    rule: TagRule,
    sink: Arc<dyn DiagnosticsSink>,
}

impl TagWriter<GoFileBackend> {
    /// A writer over the filesystem using `config`.
    pub fn new(config: &WriterConfig) -> AppResult<Self> {
        Self::with_backend(GoFileBackend, config)
    }
}

impl<B: SourceBackend> TagWriter<B> {
    /// A writer reading and writing through `backend`.
    pub fn with_backend(backend: B, config: &WriterConfig) -> AppResult<Self> {
        Ok(Self {
            backend,
            rule: config.rule()?,
            sink: Arc::new(TracingSink),
        })
    }

    /// Replaces the diagnostics sink (defaults to [`TracingSink`]).
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The tag rule in use.
    pub fn rule(&self) -> &TagRule {
        &self.rule
    }

    /// Applies `obligations` to the structs of the file at `path`.
    ///
    /// Satisfied entries are removed from `obligations`. If anything is left
    /// afterwards the file is not written and [`AppError::IncompleteRewrite`]
    /// lists the leftovers, which also remain in `obligations`.
    pub fn overwrite_tags(&self, path: &Path, obligations: &mut RecordTags) -> AppResult<()> {
        if let Some((record, field, value)) = obligations
            .iter()
            .find(|(_, _, value)| !self.rule.accepts_value(value))
        {
            return Err(AppError::InvalidTagValue {
                record: record.to_string(),
                field: field.to_string(),
                value: value.to_string(),
            });
        }

        let mut unit = self.backend.parse_file(path)?;

        let mut visitor = RewriteVisitor {
            path,
            source: unit.text(),
            rule: &self.rule,
            sink: self.sink.as_ref(),
            obligations: &mut *obligations,
            matched: HashSet::new(),
            edits: Vec::new(),
        };
        walk(Some(unit.tree().root_node()), &mut visitor)?;
        let edits = visitor.edits;

        if !obligations.is_empty() {
            for (record, fields) in obligations.pending_by_record() {
                self.sink.fields_not_updated(record, &fields);
            }
            return Err(AppError::IncompleteRewrite {
                path: path.to_path_buf(),
                missing: obligations.pending(),
            });
        }

        let count = edits.len();
        unit.extend_edits(edits);
        self.backend.write_file(&unit)?;
        info!(path = %path.display(), edits = count, key = self.rule.key(), "rewrote struct tags");
        Ok(())
    }

    /// Sets the tag of every listed field to the omit sentinel `-`.
    ///
    /// A field whose tag has no segment for the configured key (e.g.
    /// `` `db:"pw"` `` when hiding `json`) is left as is under
    /// [`MissingSegment::Keep`](crate::tags::MissingSegment::Keep) and still
    /// counts as handled, so it stays serializable. Configure
    /// [`MissingSegment::Append`](crate::tags::MissingSegment::Append) to hide
    /// such fields too.
    pub fn hide_fields(&self, path: &Path, fields: &RecordFieldSets) -> AppResult<()> {
        let mut obligations = RecordTags::hidden(fields);
        self.overwrite_tags(path, &mut obligations)
    }

    /// Runs [`TagWriter::hide_fields`] for each file, stopping at the first
    /// failure. Files already rewritten stay rewritten.
    pub fn hide_across_files(&self, work: &FileFieldSets) -> AppResult<()> {
        for (path, fields) in work {
            debug!(path = %path.display(), structs = fields.len(), "hiding fields");
            self.hide_fields(path, fields)?;
        }
        Ok(())
    }

    /// Runs [`TagWriter::overwrite_tags`] for each file, stopping at the first
    /// failure. Files already rewritten stay rewritten.
    pub fn overwrite_across_files(&self, work: FileTags) -> AppResult<()> {
        for (path, mut obligations) in work {
            debug!(path = %path.display(), structs = obligations.len(), "overwriting tags");
            self.overwrite_tags(&path, &mut obligations)?;
        }
        Ok(())
    }
}

struct RewriteVisitor<'a, 't> {
    path: &'a Path,
    source: &'t str,
    rule: &'a TagRule,
    sink: &'a dyn DiagnosticsSink,
    obligations: &'a mut RecordTags,
    matched: HashSet<&'t str>,
    edits: Vec<TextEdit>,
}

impl<'t> SyntaxVisitor<'t> for RewriteVisitor<'_, 't> {
    fn visit(&mut self, node: Node<'t>) -> AppResult<Visit> {
        let Some(record) = RecordDecl::from_node(node, self.source) else {
            return Ok(Visit::Descend);
        };
        let name = record.name();

        if self.matched.contains(name) {
            return Err(AppError::DuplicateRecord {
                path: self.path.to_path_buf(),
                record: name.to_string(),
            });
        }
        if !self.obligations.contains_record(name) {
            return Ok(Visit::Descend);
        }
        self.matched.insert(name);

        for field in record.fields() {
            self.rewrite_field(name, &field);
        }

        if self.obligations.retire_if_satisfied(name) {
            Ok(Visit::Skip)
        } else {
            Ok(Visit::Descend)
        }
    }
}

impl<'t> RewriteVisitor<'_, 't> {
    /// Folds every requested name of one declaration into a single tag edit.
    fn rewrite_field(&mut self, record: &str, field: &FieldDecl<'t>) {
        let mut content: Option<(String, TagQuoting)> = field
            .tag()
            .map(|tag| (tag.content().to_string(), tag.quoting()));

        for name in field.names() {
            let Some(value) = self.obligations.take(record, name) else {
                continue;
            };
            self.sink.field_detected(record, name);

            content = Some(match content {
                Some((text, quoting)) => match self.rule.rewrite_content(&text, quoting, &value) {
                    Some(updated) => (updated, quoting),
                    None => {
                        warn!(
                            record,
                            field = *name,
                            key = self.rule.key(),
                            "tag has no segment for key, left unchanged"
                        );
                        (text, quoting)
                    }
                },
                None => self.rule.synthesize(&value),
            });
        }

        match (field.tag(), content) {
            (Some(tag), Some((text, quoting))) if text != tag.content() => {
                self.edits
                    .push(TextEdit::replace(tag.range(), quoting.wrap(&text)));
            }
            (None, Some((text, quoting))) => {
                self.edits.push(TextEdit::insert(
                    field.tag_insertion_point(),
                    format!(" {}", quoting.wrap(&text)),
                ));
            }
            _ => {}
        }
    }
}
