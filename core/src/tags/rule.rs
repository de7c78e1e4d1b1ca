//! # Tag Rule
//!
//! Text-level rewriting of one tag key (e.g. `json`) inside a field tag.
//! Only `key:"value"` segments are touched; every other byte of the tag is
//! kept as written.

use crate::error::{AppError, AppResult};
use crate::syntax::TagQuoting;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag value meaning "omit this field from serialization".
pub const OMIT: &str = "-";

/// What to do with a field whose tag has no segment for the configured key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSegment {
    /// Leave the tag unchanged.
    #[default]
    Keep,
    /// Append a `key:"value"` segment to the existing tag.
    Append,
}

impl FromStr for MissingSegment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(MissingSegment::Keep),
            "append" => Ok(MissingSegment::Append),
            other => Err(AppError::Config(format!(
                "Unknown missing-segment policy '{}' (expected 'keep' or 'append')",
                other
            ))),
        }
    }
}

impl fmt::Display for MissingSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingSegment::Keep => write!(f, "keep"),
            MissingSegment::Append => write!(f, "append"),
        }
    }
}

/// Precompiled matcher and writer for a single tag key.
#[derive(Debug, Clone)]
pub struct TagRule {
    key: String,
    raw_segment: Regex,
    escaped_segment: Regex,
    missing: MissingSegment,
}

impl TagRule {
    /// Builds a rule for `key`.
    ///
    /// Keys follow the `reflect.StructTag` convention: non-empty, no spaces,
    /// quotes, colons or control characters.
    pub fn new(key: &str) -> AppResult<Self> {
        if !is_valid_key(key) {
            return Err(AppError::Config(format!("Invalid tag key '{}'", key)));
        }
        let k = regex::escape(key);

        // Inside backquotes the value may carry its own escapes.
        let raw_segment = Regex::new(&format!(r#"(?P<lead>^|\s){k}:"(?:[^"\\]|\\.)*""#))
            .map_err(|e| AppError::Config(format!("Invalid tag pattern: {}", e)))?;
        // Inside a double-quoted literal the segment quotes appear as \".
        let escaped_segment = Regex::new(&format!(r#"(?P<lead>^|\s){k}:\\"(?:[^"\\]|\\\\)*\\""#))
            .map_err(|e| AppError::Config(format!("Invalid tag pattern: {}", e)))?;

        Ok(Self {
            key: key.to_string(),
            raw_segment,
            escaped_segment,
            missing: MissingSegment::Keep,
        })
    }

    /// Sets the policy for tags lacking a segment for this key.
    pub fn with_missing_segment(mut self, missing: MissingSegment) -> Self {
        self.missing = missing;
        self
    }

    /// The tag key this rule rewrites.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The configured missing-segment policy.
    pub fn missing_segment(&self) -> MissingSegment {
        self.missing
    }

    /// Whether `value` can be written verbatim between the segment quotes.
    pub fn accepts_value(&self, value: &str) -> bool {
        !value
            .chars()
            .any(|c| c == '"' || c == '\\' || c == '`' || c.is_control())
    }

    /// A fresh segment, e.g. `json:"name"`.
    pub fn segment(&self, value: &str) -> String {
        format!(r#"{}:"{}""#, self.key, value)
    }

    /// Content for a brand new raw tag literal holding only this key.
    pub fn synthesize(&self, value: &str) -> (String, TagQuoting) {
        (self.segment(value), TagQuoting::Raw)
    }

    /// Rewrites the literal content of an existing tag.
    ///
    /// Every segment for the key gets `value`. Returns `None` when the tag
    /// has no such segment and the policy is [`MissingSegment::Keep`].
    pub fn rewrite_content(&self, content: &str, quoting: TagQuoting, value: &str) -> Option<String> {
        let (pattern, segment) = match quoting {
            TagQuoting::Raw => (&self.raw_segment, self.segment(value)),
            TagQuoting::Interpreted => (
                &self.escaped_segment,
                format!(r#"{}:\"{}\""#, self.key, value),
            ),
        };

        if pattern.is_match(content) {
            let replaced = pattern.replace_all(content, |caps: &Captures| {
                format!("{}{}", &caps["lead"], segment)
            });
            return Some(replaced.into_owned());
        }

        match self.missing {
            MissingSegment::Keep => None,
            MissingSegment::Append => {
                let sep = if content.is_empty() || content.ends_with(char::is_whitespace) {
                    ""
                } else {
                    " "
                };
                Some(format!("{content}{sep}{segment}"))
            }
        }
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key
            .chars()
            .any(|c| c == ':' || c == '"' || c == '`' || c.is_whitespace() || c.is_control())
}
