//! Error types for export sessions.

use thiserror::Error;
use webexport_types::NodeId;

/// Failure raised by a contributor while providing content
#[derive(Error, Debug)]
pub enum ContributorError {
    #[error("Unknown parameter '{name}' referenced in {context}")]
    UnknownParameter { name: String, context: String },

    #[error("Empty link target")]
    EmptyHref,

    #[error("Invalid content: {0}")]
    InvalidContent(String),
}

/// Failure of a whole export session
#[derive(Error, Debug)]
pub enum ExportError {
    /// A contributor failed; the session is aborted and its output discarded
    #[error("Contributor '{contributor}' on {node} failed: {source}")]
    Contributor {
        node: NodeId,
        contributor: String,
        #[source]
        source: ContributorError,
    },

    #[error("Node not found in model: {0}")]
    UnknownRoot(NodeId),
}

impl ExportError {
    /// Node whose contributor caused the failure, if any
    pub fn node(&self) -> &NodeId {
        match self {
            ExportError::Contributor { node, .. } => node,
            ExportError::UnknownRoot(node) => node,
        }
    }
}
