//! File-driven batch runner.
//!
//! Reads `{"nodes": [...], "actions": [...]}`, builds a topology from the
//! node list, auto-activates nodes by identifier keyword, replays the
//! actions in order and reports final node snapshots plus one outcome per
//! action.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use corelib::{NodeIndex, NodeInfo, Topology, TopologyConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fatal batch failures. Each names the file involved.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A node declaration in the batch input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub ip: String,
    /// Outbound connection identifiers, applied before any action.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<String>,
}

/// One replayed action. Indices are signed so that negative values are
/// reported as failed actions instead of rejecting the whole file.
///
/// Any other `type` parses as [`Action::Unknown`] and is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Activate {
        #[serde(rename = "nodeIndex")]
        node_index: i64,
    },
    Deactivate {
        #[serde(rename = "nodeIndex")]
        node_index: i64,
    },
    SendData {
        #[serde(rename = "sourceIndex")]
        source_index: i64,
        #[serde(rename = "targetIndex")]
        target_index: i64,
        data: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInput {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// An action echoed back with its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    #[serde(flatten)]
    pub action: Action,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub nodes: Vec<NodeInfo>,
    pub actions: Vec<ActionOutcome>,
}

/// Activation applied to freshly built nodes before actions run.
///
/// A node is activated when its identifier contains any keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoActivation {
    keywords: Vec<String>,
}

impl AutoActivation {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    pub fn disabled() -> Self {
        Self { keywords: Vec::new() }
    }

    pub fn matches(&self, identifier: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && identifier.contains(k.as_str()))
    }
}

impl Default for AutoActivation {
    fn default() -> Self {
        Self::new(["server", "router"])
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    config: TopologyConfig,
    auto_activation: AutoActivation,
}

impl BatchRunner {
    pub fn new(config: TopologyConfig, auto_activation: AutoActivation) -> Self {
        Self {
            config,
            auto_activation,
        }
    }

    /// Build, activate and replay.
    pub fn run(&self, input: BatchInput) -> BatchReport {
        let mut topology = Topology::with_config(self.config);
        for spec in input.nodes {
            let index = topology.add_node(spec.id, spec.kind, spec.ip);
            for target in spec.connections {
                topology.add_connection(index, target);
            }
        }

        let auto: Vec<NodeIndex> = topology
            .nodes()
            .enumerate()
            .filter(|(_, node)| self.auto_activation.matches(node.identifier()))
            .map(|(i, _)| NodeIndex(i))
            .collect();
        for index in auto {
            topology.activate_node(index);
        }

        let actions: Vec<ActionOutcome> = input
            .actions
            .into_iter()
            .enumerate()
            .filter_map(|(position, action)| {
                if action == Action::Unknown {
                    warn!(position, "skipping action of unknown type");
                    return None;
                }
                let success = apply(&mut topology, &action);
                Some(ActionOutcome { action, success })
            })
            .collect();

        let succeeded = actions.iter().filter(|a| a.success).count();
        info!(
            nodes = topology.len(),
            actions = actions.len(),
            succeeded,
            "batch replayed"
        );

        BatchReport {
            nodes: topology.snapshots(),
            actions,
        }
    }

    /// Read `input`, run it, and write the pretty-printed report to `output`.
    pub fn run_file(&self, input: &Path, output: &Path) -> Result<BatchReport, BatchError> {
        let raw = fs::read_to_string(input).map_err(|source| BatchError::Read {
            path: input.to_path_buf(),
            source,
        })?;
        let parsed: BatchInput = serde_json::from_str(&raw).map_err(|source| BatchError::Parse {
            path: input.to_path_buf(),
            source,
        })?;

        let report = self.run(parsed);

        let write_err = |source: std::io::Error| BatchError::Write {
            path: output.to_path_buf(),
            source,
        };
        let file = File::create(output).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &report)
            .map_err(|e| write_err(e.into()))?;
        writer.flush().map_err(write_err)?;

        Ok(report)
    }
}

fn apply(topology: &mut Topology, action: &Action) -> bool {
    let index = |raw: i64| NodeIndex::try_from(raw).ok();
    match action {
        Action::Activate { node_index } => {
            index(*node_index).is_some_and(|i| topology.activate_node(i))
        }
        Action::Deactivate { node_index } => {
            index(*node_index).is_some_and(|i| topology.deactivate_node(i))
        }
        Action::SendData {
            source_index,
            target_index,
            data,
        } => match (index(*source_index), index(*target_index)) {
            (Some(s), Some(t)) => match topology.try_send_data(s, t, data) {
                Ok(()) => {
                    debug!(source = %s, target = %t, %data, "data sent");
                    true
                }
                Err(err) => {
                    debug!(source = %s, target = %t, error = %err, "send rejected");
                    false
                }
            },
            _ => false,
        },
        Action::Unknown => false,
    }
}
