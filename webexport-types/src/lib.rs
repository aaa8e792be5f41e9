//! Shared types for webexport
//!
//! This crate provides the vocabulary used across the webexport crates:
//! node identifiers, contribution keys, placements and overwrite policies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Full dotted name of a node in the model tree (e.g. `.modulation.Ramp`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier of a child called `name` below this node
    pub fn child(&self, name: &str) -> Self {
        Self(format!("{}.{}", self.0, name))
    }

    /// Last segment of the dotted name
    pub fn name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

/// Slot identity of a contribution: the owning node plus a local id.
///
/// The emitted name of an attribute is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContributionKey {
    pub owner: NodeId,
    pub local_id: String,
}

impl ContributionKey {
    pub fn new(owner: NodeId, local_id: impl Into<String>) -> Self {
        Self {
            owner,
            local_id: local_id.into(),
        }
    }
}

impl fmt::Display for ContributionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.owner, self.local_id)
    }
}

/// Target region of the assembled document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Placement {
    Head,
    BodyStart,
    BodyEnd,
    NamedRegion(String),
}

impl Placement {
    /// Parse a position token. `head`, `start` and `end` are reserved;
    /// anything else names a region.
    pub fn from_position(position: &str) -> Self {
        match position.trim() {
            "head" | "header" => Placement::Head,
            "start" => Placement::BodyStart,
            "end" => Placement::BodyEnd,
            other => Placement::NamedRegion(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Placement::Head => "head",
            Placement::BodyStart => "start",
            Placement::BodyEnd => "end",
            Placement::NamedRegion(name) => name,
        }
    }
}

impl From<String> for Placement {
    fn from(position: String) -> Self {
        Placement::from_position(&position)
    }
}

impl From<Placement> for String {
    fn from(placement: Placement) -> Self {
        placement.as_str().to_string()
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge rule applied when an attribute slot is registered again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    /// Last writer wins
    Replace,
    /// First writer wins
    KeepExisting,
    /// Whitespace-separated token set, duplicates ignored
    AppendToken,
}
