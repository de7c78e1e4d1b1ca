//! # Tag Mappings
//!
//! The obligation model: which (struct, field) pairs still need a new tag
//! value. Entries are removed as they are applied, so whatever is left after
//! a rewrite is exactly what could not be found.

use crate::tags::rule::OMIT;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Field name -> desired tag value.
pub type FieldTags = HashMap<String, String>;

/// Ordered field names of one struct.
pub type FieldSet = Vec<String>;

/// Struct name -> fields to hide.
pub type RecordFieldSets = IndexMap<String, FieldSet>;

/// Go file -> structs and fields to hide.
pub type FileFieldSets = IndexMap<PathBuf, RecordFieldSets>;

/// Go file -> explicit tag obligations.
pub type FileTags = IndexMap<PathBuf, RecordTags>;

/// Struct name -> field obligations.
///
/// # Examples
/// ```
/// use tagsmith_core::tags::RecordTags;
///
/// let mut tags = RecordTags::new().with("User", "Email", "email");
/// assert_eq!(tags.take("User", "Email").as_deref(), Some("email"));
/// assert!(tags.retire_if_satisfied("User"));
/// assert!(tags.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordTags(HashMap<String, FieldTags>);

impl RecordTags {
    /// An empty obligation set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps every listed field to the omit sentinel `-`.
    pub fn hidden(fields: &RecordFieldSets) -> Self {
        let mut tags = Self::new();
        for (record, names) in fields {
            let entry = tags.0.entry(record.clone()).or_default();
            for name in names {
                entry.insert(name.clone(), OMIT.to_string());
            }
        }
        tags
    }

    /// Builder form of [`RecordTags::insert`].
    pub fn with(mut self, record: &str, field: &str, value: &str) -> Self {
        self.insert(record, field, value);
        self
    }

    /// Requests `value` for `record.field`, replacing any earlier request.
    pub fn insert(&mut self, record: &str, field: &str, value: &str) {
        self.0
            .entry(record.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
    }

    /// Registers `record` without field obligations, so the struct must
    /// still be declared in the file.
    pub fn require_record(&mut self, record: &str) {
        self.0.entry(record.to_string()).or_default();
    }

    /// True once every obligation has been consumed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of structs with outstanding obligations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether `record` still has an entry.
    pub fn contains_record(&self, record: &str) -> bool {
        self.0.contains_key(record)
    }

    /// Outstanding field obligations of `record`.
    pub fn record(&self, record: &str) -> Option<&FieldTags> {
        self.0.get(record)
    }

    /// Consumes the obligation for `record.field`, returning its value.
    pub fn take(&mut self, record: &str, field: &str) -> Option<String> {
        self.0.get_mut(record)?.remove(field)
    }

    /// Drops `record` if it has no fields left. Returns whether it was dropped.
    pub fn retire_if_satisfied(&mut self, record: &str) -> bool {
        match self.0.get(record) {
            Some(fields) if fields.is_empty() => {
                self.0.remove(record);
                true
            }
            _ => false,
        }
    }

    /// Iterates `(record, field, value)` triples in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.0.iter().flat_map(|(record, fields)| {
            fields
                .iter()
                .map(move |(field, value)| (record.as_str(), field.as_str(), value.as_str()))
        })
    }

    /// Outstanding fields grouped by struct, both sorted by name.
    pub fn pending_by_record(&self) -> Vec<(&str, Vec<&str>)> {
        let mut out: Vec<(&str, Vec<&str>)> = self
            .0
            .iter()
            .map(|(record, fields)| {
                let mut names: Vec<&str> = fields.keys().map(String::as_str).collect();
                names.sort_unstable();
                (record.as_str(), names)
            })
            .collect();
        out.sort_unstable_by_key(|(record, _)| *record);
        out
    }

    /// Outstanding obligations as sorted `Record.Field` labels.
    ///
    /// A struct left with no fields (it was never found) is listed by name.
    pub fn pending(&self) -> Vec<String> {
        self.pending_by_record()
            .into_iter()
            .flat_map(|(record, fields)| {
                if fields.is_empty() {
                    vec![record.to_string()]
                } else {
                    fields
                        .into_iter()
                        .map(|f| format!("{}.{}", record, f))
                        .collect()
                }
            })
            .collect()
    }
}

impl From<HashMap<String, FieldTags>> for RecordTags {
    fn from(map: HashMap<String, FieldTags>) -> Self {
        Self(map)
    }
}

impl<R, F, V> FromIterator<(R, F, V)> for RecordTags
where
    R: AsRef<str>,
    F: AsRef<str>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (R, F, V)>>(iter: I) -> Self {
        let mut tags = Self::new();
        for (record, field, value) in iter {
            tags.insert(record.as_ref(), field.as_ref(), value.as_ref());
        }
        tags
    }
}
