//! Network topology: the owned, append-only collection of nodes.
//!
//! Every operation addresses nodes by [`NodeIndex`]. Indices are assigned in
//! insertion order and never move, since nodes are never removed. Invalid
//! indices are reported as failure values, never panics.

use tracing::{debug, trace};

use crate::config::TopologyConfig;
use crate::error::{Error, Result};
use crate::node::{Node, NodeIndex, NodeInfo};

/// An ordered, index-stable collection of nodes forming one simulation.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    nodes: Vec<Node>,
    config: TopologyConfig,
}

impl Topology {
    /// Create an empty topology with the default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty topology with the given config.
    pub fn with_config(config: TopologyConfig) -> Self {
        Self {
            nodes: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    /// Number of nodes ever added.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a new inactive node and return its index.
    ///
    /// No uniqueness check is made on `identifier`.
    pub fn add_node(
        &mut self,
        identifier: impl Into<String>,
        kind: impl Into<String>,
        address: impl Into<String>,
    ) -> NodeIndex {
        let index = NodeIndex(self.nodes.len());
        let node = Node::new(identifier, kind, address);
        debug!(%index, node = %node, kind = node.kind(), "node added");
        self.nodes.push(node);
        metrics::counter!("netsim_nodes_added_total").increment(1);
        index
    }

    /// Look up a node by index.
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0)
    }

    fn node_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        self.nodes.get_mut(index.0)
    }

    /// Iterate over nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    /// Activate the node at `index`. Returns `false` if out of range.
    pub fn activate_node(&mut self, index: NodeIndex) -> bool {
        match self.node_mut(index) {
            Some(node) => {
                node.activate();
                debug!(%index, node = %node, "node activated");
                true
            }
            None => false,
        }
    }

    /// Deactivate the node at `index`. Returns `false` if out of range.
    pub fn deactivate_node(&mut self, index: NodeIndex) -> bool {
        match self.node_mut(index) {
            Some(node) => {
                node.deactivate();
                debug!(%index, node = %node, "node deactivated");
                true
            }
            None => false,
        }
    }

    /// Declare that the node at `source` may send to `target`.
    ///
    /// Only `source` is bounds-checked; `target` is an identifier and need not
    /// name an existing node.
    pub fn add_connection(&mut self, source: NodeIndex, target: impl Into<String>) -> bool {
        match self.node_mut(source) {
            Some(node) => {
                let target = target.into();
                debug!(%source, node = %node, %target, "connection added");
                node.add_connection(target);
                true
            }
            None => false,
        }
    }

    /// Validate a transfer of `payload` from `source` to `target`.
    ///
    /// The payload is neither inspected nor retained.
    pub fn try_send_data(&self, source: NodeIndex, target: NodeIndex, payload: &str) -> Result<()> {
        let from = self.checked(source)?;
        let to = self.checked(target)?;

        let outcome = from.can_send(to, self.config.connectivity_required);
        let label = match &outcome {
            Ok(()) => "accepted",
            Err(e) => e.label(),
        };
        trace!(%source, %target, payload_len = payload.len(), outcome = label, "transfer validated");
        metrics::counter!("netsim_transfers_total", "outcome" => label).increment(1);

        outcome.map_err(Error::from)
    }

    /// Boolean form of [`try_send_data`](Self::try_send_data).
    pub fn send_data(&self, source: NodeIndex, target: NodeIndex, payload: &str) -> bool {
        self.try_send_data(source, target, payload).is_ok()
    }

    /// Snapshot of the node at `index`, or `None` if out of range.
    pub fn get_node_info(&self, index: NodeIndex) -> Option<NodeInfo> {
        self.node(index).map(Node::info)
    }

    /// Snapshots of every node in index order.
    pub fn snapshots(&self) -> Vec<NodeInfo> {
        self.nodes.iter().map(Node::info).collect()
    }

    fn checked(&self, index: NodeIndex) -> Result<&Node> {
        self.node(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.nodes.len(),
        })
    }
}

/// Builder for a pre-populated topology.
///
/// ```rust
/// use corelib::TopologyBuilder;
///
/// let topology = TopologyBuilder::new()
///     .require_connectivity(true)
///     .add_node("server-1", "server", "192.168.1.1")
///     .add_node("client-1", "client", "192.168.1.100")
///     .build();
/// assert_eq!(topology.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    config: TopologyConfig,
    nodes: Vec<(String, String, String)>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: TopologyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn require_connectivity(mut self, required: bool) -> Self {
        self.config.connectivity_required = required;
        self
    }

    /// Queue a node; indices follow call order.
    pub fn add_node(
        mut self,
        identifier: impl Into<String>,
        kind: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        self.nodes
            .push((identifier.into(), kind.into(), address.into()));
        self
    }

    pub fn build(self) -> Topology {
        let mut topology = Topology::with_config(self.config);
        for (identifier, kind, address) in self.nodes {
            topology.add_node(identifier, kind, address);
        }
        topology
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransferError;

    #[test]
    fn test_checked_reports_len() {
        let mut topology = Topology::new();
        topology.add_node("a", "client", "1");
        assert_eq!(
            topology.try_send_data(NodeIndex(0), NodeIndex(5), "x"),
            Err(Error::IndexOutOfRange {
                index: NodeIndex(5),
                len: 1
            })
        );
    }

    #[test]
    fn test_source_bounds_checked_before_target() {
        let topology = Topology::new();
        assert_eq!(
            topology.try_send_data(NodeIndex(2), NodeIndex(9), "x"),
            Err(Error::IndexOutOfRange {
                index: NodeIndex(2),
                len: 0
            })
        );
    }

    #[test]
    fn test_domain_error_surfaces_transfer_reason() {
        let mut topology = Topology::new();
        let a = topology.add_node("a", "client", "1");
        let b = topology.add_node("b", "client", "2");
        topology.activate_node(a);

        let err = topology.try_send_data(a, b, "x").unwrap_err();
        assert_eq!(err, Error::Transfer(TransferError::TargetNotActive("b".into())));
        assert_eq!(err.to_string(), "target node b is not active");
    }

    #[test]
    fn test_builder_applies_config() {
        let topology = TopologyBuilder::new()
            .require_connectivity(true)
            .add_node("a", "server", "1")
            .build();
        assert!(topology.config().connectivity_required);
        assert_eq!(topology.get_node_info(NodeIndex(0)).unwrap().identifier, "a");
    }
}
