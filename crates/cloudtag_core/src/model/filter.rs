//! Opaque listing predicate forwarded to adapters.
//!
//! The core never evaluates filters. Adapters translate the ones they
//! support into provider query parameters and declare the rest through
//! `FilterSupport`.

use serde::{Deserialize, Serialize};

/// Comparison requested by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    StartsWith,
}

/// One provider-specific listing predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Provider field name, e.g. `tag:env` or `instance-state-name`.
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Equals, value)
    }
}

/// How an adapter treats filters passed to `list_resources`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSupport {
    /// Filters are forwarded to the provider and narrow the listing.
    Supported,
    /// Filters are accepted but not applied; listings are unfiltered.
    Ignored,
}
