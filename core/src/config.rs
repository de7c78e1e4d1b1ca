#![deny(missing_docs)]

//! # Configuration
//!
//! Writer settings and batch manifests.
//!
//! Settings come from defaults, optionally a JSON/YAML file, then environment
//! overrides (`TAGSMITH_TAG_KEY`, `TAGSMITH_MISSING_SEGMENT`). Manifests map
//! Go files to the structs and fields to process; relative paths in a manifest
//! are resolved against the manifest's own directory.

use crate::error::{AppError, AppResult};
use crate::tags::mapping::{FieldSet, FileFieldSets, FileTags, RecordFieldSets, RecordTags};
use crate::tags::rule::{MissingSegment, TagRule};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding [`WriterConfig::tag_key`].
pub const ENV_TAG_KEY: &str = "TAGSMITH_TAG_KEY";

/// Environment variable overriding [`WriterConfig::missing_segment`].
pub const ENV_MISSING_SEGMENT: &str = "TAGSMITH_MISSING_SEGMENT";

/// Settings for a [`crate::tags::TagWriter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriterConfig {
    /// Tag key to rewrite (e.g. `json`, `yaml`, `bson`).
    pub tag_key: String,
    /// Behaviour for tags lacking a segment for `tag_key`.
    pub missing_segment: MissingSegment,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            tag_key: "json".to_string(),
            missing_segment: MissingSegment::Keep,
        }
    }
}

impl WriterConfig {
    /// Loads settings from a `.json`, `.yaml` or `.yml` file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let text = read_document(path)?;
        parse_document(path, &text)
    }

    /// Applies overrides looked up by variable name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        if let Some(key) = lookup(ENV_TAG_KEY) {
            self.tag_key = key.trim().to_string();
        }
        if let Some(policy) = lookup(ENV_MISSING_SEGMENT) {
            self.missing_segment = policy.parse()?;
        }
        Ok(self)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> AppResult<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Compiles the tag rule described by these settings.
    pub fn rule(&self) -> AppResult<TagRule> {
        Ok(TagRule::new(&self.tag_key)?.with_missing_segment(self.missing_segment))
    }
}

/// Loads a hide manifest: `file -> struct -> [field, ...]`.
///
/// ```yaml
/// models/user.go:
///   User: [Password, Token]
/// ```
pub fn load_hide_manifest(path: &Path) -> AppResult<FileFieldSets> {
    let text = read_document(path)?;
    let raw: IndexMap<PathBuf, Option<IndexMap<String, Option<FieldSet>>>> =
        parse_document(path, &text)?;

    let base = manifest_base(path);
    let mut work = FileFieldSets::new();
    for (file, records) in raw {
        let records = records.ok_or_else(|| missing_entry(&file, None))?;
        let mut sets = RecordFieldSets::new();
        for (record, fields) in records {
            let fields = fields.ok_or_else(|| missing_entry(&file, Some(record.as_str())))?;
            sets.insert(record, fields);
        }
        work.insert(base.join(&file), sets);
    }
    Ok(work)
}

/// Loads a tag manifest: `file -> struct -> field -> value`.
///
/// ```yaml
/// models/user.go:
///   User:
///     Email: email,omitempty
/// ```
pub fn load_tag_manifest(path: &Path) -> AppResult<FileTags> {
    let text = read_document(path)?;
    let raw: IndexMap<PathBuf, Option<IndexMap<String, Option<IndexMap<String, String>>>>> =
        parse_document(path, &text)?;

    let base = manifest_base(path);
    let mut work = FileTags::new();
    for (file, records) in raw {
        let records = records.ok_or_else(|| missing_entry(&file, None))?;
        let mut tags = RecordTags::new();
        for (record, fields) in records {
            let fields = fields.ok_or_else(|| missing_entry(&file, Some(record.as_str())))?;
            tags.require_record(&record);
            for (field, value) in fields {
                tags.insert(&record, &field, &value);
            }
        }
        work.insert(base.join(&file), tags);
    }
    Ok(work)
}

fn manifest_base(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn missing_entry(file: &Path, record: Option<&str>) -> AppError {
    match record {
        Some(record) => AppError::MissingInput(format!(
            "no fields given for struct '{}' in '{}'",
            record,
            file.display()
        )),
        None => AppError::MissingInput(format!("no structs given for '{}'", file.display())),
    }
}

fn read_document(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_document<T: DeserializeOwned>(path: &Path, text: &str) -> AppResult<T> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json") => serde_json::from_str(text)
            .map_err(|e| AppError::Config(format!("Invalid JSON in {:?}: {}", path, e))),
        Some("yaml") | Some("yml") => serde_yaml::from_str(text)
            .map_err(|e| AppError::Config(format!("Invalid YAML in {:?}: {}", path, e))),
        _ => Err(AppError::Config(format!(
            "Unsupported config format {:?} (expected .json, .yaml or .yml)",
            path
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = WriterConfig::default();
        assert_eq!(config.tag_key, "json");
        assert_eq!(config.missing_segment, MissingSegment::Keep);
        assert_eq!(config.rule().unwrap().key(), "json");
    }

    #[test]
    fn test_from_yaml_and_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("tagsmith.yaml");
        fs::write(&yaml, "tag_key: bson\nmissing_segment: append\n").unwrap();
        let config = WriterConfig::from_file(&yaml).unwrap();
        assert_eq!(config.tag_key, "bson");
        assert_eq!(config.missing_segment, MissingSegment::Append);

        let json = dir.path().join("tagsmith.json");
        fs::write(&json, r#"{"tag_key": "yaml"}"#).unwrap();
        let config = WriterConfig::from_file(&json).unwrap();
        assert_eq!(config.tag_key, "yaml");
        assert_eq!(config.missing_segment, MissingSegment::Keep);
    }

    #[test]
    fn test_rejects_unknown_fields_and_formats() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("bad.yml");
        fs::write(&yaml, "tag: json\n").unwrap();
        assert!(matches!(WriterConfig::from_file(&yaml), Err(AppError::Config(_))));

        let toml = dir.path().join("tagsmith.toml");
        fs::write(&toml, "tag_key = 'json'\n").unwrap();
        assert!(matches!(WriterConfig::from_file(&toml), Err(AppError::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> =
            [(ENV_TAG_KEY, " xml "), (ENV_MISSING_SEGMENT, "append")].into();
        let config = WriterConfig::default()
            .with_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.tag_key, "xml");
        assert_eq!(config.missing_segment, MissingSegment::Append);

        let err = WriterConfig::default()
            .with_overrides(|k| (k == ENV_MISSING_SEGMENT).then(|| "sometimes".to_string()))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_invalid_key_fails_rule() {
        let config = WriterConfig {
            tag_key: "bad key".into(),
            ..Default::default()
        };
        assert!(config.rule().is_err());
    }

    #[test]
    fn test_load_hide_manifest_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("hide.yaml");
        fs::write(
            &manifest,
            "models/user.go:\n  User: [Password, Token]\n/abs/post.go:\n  Post: [Draft]\n",
        )
        .unwrap();

        let work = load_hide_manifest(&manifest).unwrap();
        let paths: Vec<_> = work.keys().cloned().collect();
        assert_eq!(
            paths,
            vec![dir.path().join("models/user.go"), PathBuf::from("/abs/post.go")]
        );
        assert_eq!(
            work[&dir.path().join("models/user.go")]["User"],
            vec!["Password".to_string(), "Token".to_string()]
        );
    }

    #[test]
    fn test_load_hide_manifest_rejects_null_entries() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("hide.json");
        fs::write(&manifest, r#"{"user.go": null}"#).unwrap();
        assert!(matches!(load_hide_manifest(&manifest), Err(AppError::MissingInput(_))));

        fs::write(&manifest, r#"{"user.go": {"User": null}}"#).unwrap();
        assert!(matches!(load_hide_manifest(&manifest), Err(AppError::MissingInput(_))));
    }

    #[test]
    fn test_unreadable_manifest_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("absent.yaml");
        let err = load_tag_manifest(&manifest).unwrap_err();
        assert!(matches!(err, AppError::Read { ref path, .. } if *path == manifest));
        assert!(WriterConfig::from_file(&manifest)
            .unwrap_err()
            .to_string()
            .contains("absent.yaml"));
    }

    #[test]
    fn test_load_tag_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("tags.yaml");
        fs::write(
            &manifest,
            "user.go:\n  User:\n    Email: email,omitempty\n    Name: name\n  Empty: {}\n",
        )
        .unwrap();

        let work = load_tag_manifest(&manifest).unwrap();
        let tags = &work[&dir.path().join("user.go")];
        assert_eq!(
            tags.pending(),
            vec!["Empty", "User.Email", "User.Name"]
        );
        assert_eq!(
            tags.record("User").unwrap().get("Email").map(String::as_str),
            Some("email,omitempty")
        );
    }
}
