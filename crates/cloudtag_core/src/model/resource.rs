//! Listed cloud resource descriptor.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One resource returned by an adapter listing.
///
/// The core only relies on `name` being unique within the adapter's
/// service; anything richer stays with the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
