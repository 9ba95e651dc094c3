//! Error types for the core library.

use thiserror::Error;

use crate::node::NodeIndex;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Index does not refer to a node in the topology
    #[error("node index {index} out of range (topology holds {len} nodes)")]
    IndexOutOfRange { index: NodeIndex, len: usize },
    /// Both nodes exist but the transfer is not currently legal
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Reasons a transfer between two existing nodes is rejected.
///
/// Rejections never change node state; the caller may fix the precondition
/// (activate a node, add a connection) and retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The sending node is inactive
    #[error("source node {0} is not active")]
    NotActive(String),
    /// The receiving node is inactive
    #[error("target node {0} is not active")]
    TargetNotActive(String),
    /// The target identifier is missing from the source's outbound connections
    #[error("node {from} is not connected to {to}")]
    NotConnected { from: String, to: String },
}

impl TransferError {
    /// Short label used for metrics and log fields.
    pub fn label(&self) -> &'static str {
        match self {
            TransferError::NotActive(_) => "source_inactive",
            TransferError::TargetNotActive(_) => "target_inactive",
            TransferError::NotConnected { .. } => "not_connected",
        }
    }
}
