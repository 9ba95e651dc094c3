//! Topology configuration.

use serde::{Deserialize, Serialize};

/// Settings that change how a [`Topology`](crate::Topology) validates transfers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyConfig {
    /// When set, a transfer additionally requires the target's identifier to
    /// appear in the source's outbound connections.
    ///
    /// Off by default: liveness of both endpoints is the only check.
    #[serde(default)]
    pub connectivity_required: bool,
}

impl TopologyConfig {
    /// Config that enforces declared connectivity.
    pub fn connected() -> Self {
        Self {
            connectivity_required: true,
        }
    }
}
