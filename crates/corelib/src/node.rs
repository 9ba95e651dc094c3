//! Node abstractions for the simulated network.
//!
//! Nodes are addressable endpoints with a liveness flag and a list of
//! outbound connections. They are addressed by a `NodeIndex`, the position
//! they were assigned when added to a topology.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TransferError;

/// Stable handle for a node within a topology.
///
/// Newtype over `usize`; index `i` always refers to the `i`-th node added.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for NodeIndex {
    fn from(index: usize) -> Self {
        NodeIndex(index)
    }
}

/// Wire input carries signed integers; negative values never name a node.
impl TryFrom<i64> for NodeIndex {
    type Error = std::num::TryFromIntError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        usize::try_from(raw).map(NodeIndex)
    }
}

/// An endpoint in the simulated network.
///
/// Identity, kind and address are fixed at construction. `active` changes
/// only through [`activate`](Node::activate) / [`deactivate`](Node::deactivate),
/// and the outbound list only grows via [`add_connection`](Node::add_connection).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    identifier: String,
    /// Free-form tag such as "server", "router" or "client".
    kind: String,
    /// Free-form address; not validated as an IP.
    address: String,
    active: bool,
    /// Identifiers this node may send to, in insertion order. Duplicates kept.
    outbound_connections: Vec<String>,
}

impl Node {
    /// Construct an inactive node with no connections.
    pub fn new(
        identifier: impl Into<String>,
        kind: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            kind: kind.into(),
            address: address.into(),
            active: false,
            outbound_connections: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn outbound_connections(&self) -> &[String] {
        &self.outbound_connections
    }

    /// Mark the node active. Idempotent.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Mark the node inactive. Idempotent.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Append `target` to the outbound connections.
    ///
    /// The target is not required to exist anywhere.
    pub fn add_connection(&mut self, target: impl Into<String>) {
        self.outbound_connections.push(target.into());
    }

    /// Whether `target` appears in the outbound connections.
    pub fn is_connected_to(&self, target: &str) -> bool {
        self.outbound_connections.iter().any(|c| c == target)
    }

    /// Check whether a transfer from `self` to `target` is currently legal.
    ///
    /// Checks run in a fixed order: source liveness, target liveness, then
    /// (only when `connectivity_required`) the outbound connection list.
    /// Pure predicate: neither node is touched.
    pub fn can_send(&self, target: &Node, connectivity_required: bool) -> Result<(), TransferError> {
        if !self.active {
            return Err(TransferError::NotActive(self.identifier.clone()));
        }
        if !target.active {
            return Err(TransferError::TargetNotActive(target.identifier.clone()));
        }
        if connectivity_required && !self.is_connected_to(&target.identifier) {
            return Err(TransferError::NotConnected {
                from: self.identifier.clone(),
                to: target.identifier.clone(),
            });
        }
        Ok(())
    }

    /// Snapshot of the externally visible fields.
    pub fn info(&self) -> NodeInfo {
        NodeInfo {
            identifier: self.identifier.clone(),
            kind: self.kind.clone(),
            address: self.address.clone(),
            active: self.active,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.identifier, self.address)
    }
}

/// Point-in-time view of a node, as reported to callers.
///
/// Serialized with the wire names `id`, `type`, `ip`, `active`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(rename = "id")]
    pub identifier: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "ip")]
    pub address: String,
    pub active: bool,
}
