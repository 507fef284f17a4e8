//! Deterministic resource naming
//!
//! Every resource HostKit declares is identified by a `ResourceName` built
//! from the deployment prefix plus a fixed suffix. Composing the same
//! configuration twice yields byte-identical names, which is what makes the
//! resource graph deterministic and lets the external apply engine diff runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical identity of a declared resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    /// Build a name from the deployment prefix and a fixed suffix.
    pub fn scoped(prefix: &str, suffix: &str) -> Self {
        Self(format!("{prefix}{suffix}"))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
