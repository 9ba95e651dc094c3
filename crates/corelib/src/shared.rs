//! Thread-safe handle over a single topology.
//!
//! All operations take one exclusive lock, so appends are serialized and
//! indices stay stable across threads.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::TopologyConfig;
use crate::error::Result;
use crate::node::{NodeIndex, NodeInfo};
use crate::topology::Topology;

/// Cloneable, lock-guarded topology for long-running services.
#[derive(Debug, Clone, Default)]
pub struct SharedTopology {
    inner: Arc<Mutex<Topology>>,
}

impl SharedTopology {
    pub fn new(topology: Topology) -> Self {
        Self {
            inner: Arc::new(Mutex::new(topology)),
        }
    }

    pub fn with_config(config: TopologyConfig) -> Self {
        Self::new(Topology::with_config(config))
    }

    pub fn add_node(
        &self,
        identifier: impl Into<String>,
        kind: impl Into<String>,
        address: impl Into<String>,
    ) -> NodeIndex {
        self.inner.lock().add_node(identifier, kind, address)
    }

    pub fn activate_node(&self, index: NodeIndex) -> bool {
        self.inner.lock().activate_node(index)
    }

    pub fn deactivate_node(&self, index: NodeIndex) -> bool {
        self.inner.lock().deactivate_node(index)
    }

    pub fn add_connection(&self, source: NodeIndex, target: impl Into<String>) -> bool {
        self.inner.lock().add_connection(source, target)
    }

    pub fn send_data(&self, source: NodeIndex, target: NodeIndex, payload: &str) -> bool {
        self.inner.lock().send_data(source, target, payload)
    }

    pub fn try_send_data(&self, source: NodeIndex, target: NodeIndex, payload: &str) -> Result<()> {
        self.inner.lock().try_send_data(source, target, payload)
    }

    pub fn get_node_info(&self, index: NodeIndex) -> Option<NodeInfo> {
        self.inner.lock().get_node_info(index)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Run `f` with exclusive access to the underlying topology.
    pub fn with<R>(&self, f: impl FnOnce(&mut Topology) -> R) -> R {
        f(&mut *self.inner.lock())
    }
}
