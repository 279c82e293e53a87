//! Key/value metadata pair attached to a resource.
//!
//! # Invariants
//! - `key` must not be blank; `value` may be empty.
//! - Within one reconciled tag set no two tags share a key.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One resource tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Validates fields required before the tag is sent to a provider.
    ///
    /// # Errors
    /// - Returns `BlankKey` when `key` is empty or whitespace only.
    pub fn validate(&self) -> Result<(), TagValidationError> {
        if self.key.trim().is_empty() {
            return Err(TagValidationError::BlankKey);
        }
        Ok(())
    }
}

/// Validation failures for caller-supplied tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValidationError {
    BlankKey,
}

impl Display for TagValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankKey => write!(f, "tag key cannot be blank"),
        }
    }
}

impl Error for TagValidationError {}

/// Reconciles desired tags with the tags a resource currently carries.
///
/// Rules:
/// - Desired tags come first, in caller order. A key repeated inside
///   `desired` keeps its first occurrence.
/// - Current tags whose key is not desired are appended in provider order.
/// - Current tags whose key is desired are replaced by the desired value.
pub fn merge_tags(desired: &[Tag], current: &[Tag]) -> Vec<Tag> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(desired.len());
    let mut merged = Vec::with_capacity(desired.len() + current.len());

    for tag in desired {
        if seen.insert(tag.key.as_str()) {
            merged.push(tag.clone());
        }
    }
    for tag in current {
        if seen.insert(tag.key.as_str()) {
            merged.push(tag.clone());
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::{merge_tags, Tag, TagValidationError};

    fn tag(key: &str, value: &str) -> Tag {
        Tag::new(key, value)
    }

    #[test]
    fn desired_value_overwrites_current_value() {
        let merged = merge_tags(&[tag("env", "new")], &[tag("env", "old")]);
        assert_eq!(merged, vec![tag("env", "new")]);
    }

    #[test]
    fn untouched_current_tags_are_kept_after_desired_tags() {
        let merged = merge_tags(
            &[tag("owner", "team-x")],
            &[tag("env", "prod"), tag("cost", "42")],
        );
        assert_eq!(
            merged,
            vec![tag("owner", "team-x"), tag("env", "prod"), tag("cost", "42")]
        );
    }

    #[test]
    fn repeated_desired_key_keeps_first_occurrence() {
        let merged = merge_tags(&[tag("env", "a"), tag("env", "b")], &[]);
        assert_eq!(merged, vec![tag("env", "a")]);
    }

    #[test]
    fn empty_desired_returns_current_unchanged() {
        let current = vec![tag("env", "prod"), tag("team", "")];
        assert_eq!(merge_tags(&[], &current), current);
    }

    #[test]
    fn validate_rejects_blank_key_but_allows_empty_value() {
        assert_eq!(tag("  ", "x").validate(), Err(TagValidationError::BlankKey));
        assert!(tag("env", "").validate().is_ok());
    }
}
