//! Subcommands of the `netsim` binary.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use corelib::{NodeIndex, Topology, TopologyConfig};
use tracing::{info, warn};

use crate::batch::{AutoActivation, BatchRunner};
use crate::session::Session;

/// Result of running a subcommand.
pub type CommandResult = anyhow::Result<()>;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Answer requests from stdin, one JSON response per line on stdout
    Serve,

    /// Build a topology from a JSON file, replay its actions, write a report
    Batch {
        /// Input document: {"nodes": [...], "actions": [...]}
        input: PathBuf,

        /// Where to write the report
        output: PathBuf,

        /// Identifier keywords that activate a node before actions run
        #[arg(long, value_delimiter = ',', default_values_t = [String::from("server"), String::from("router")])]
        auto_activate: Vec<String>,

        /// Do not activate any node automatically
        #[arg(long, conflicts_with = "auto_activate")]
        no_auto_activate: bool,
    },

    /// Run a scripted four-node traffic scenario and log each step
    Demo,
}

impl Command {
    pub fn execute(self, config: TopologyConfig) -> CommandResult {
        match self {
            Command::Serve => {
                let mut session = Session::new(config);
                let stdin = io::stdin();
                let stdout = io::stdout();
                session
                    .run(stdin.lock(), stdout.lock())
                    .context("request loop failed")?;
                Ok(())
            }
            Command::Batch {
                input,
                output,
                auto_activate,
                no_auto_activate,
            } => {
                let auto = if no_auto_activate {
                    AutoActivation::disabled()
                } else {
                    AutoActivation::new(auto_activate)
                };
                let report = BatchRunner::new(config, auto).run_file(&input, &output)?;
                info!(
                    output = %output.display(),
                    nodes = report.nodes.len(),
                    actions = report.actions.len(),
                    "report written"
                );
                Ok(())
            }
            Command::Demo => {
                run_demo(config);
                Ok(())
            }
        }
    }
}

/// Client/server exchange across a router, then a send to a downed server.
///
/// Returns the final topology.
pub fn run_demo(config: TopologyConfig) -> Topology {
    let mut topology = Topology::with_config(config);
    let server = topology.add_node("server-1", "server", "192.168.1.1");
    let router = topology.add_node("router-1", "router", "192.168.1.254");
    let client_a = topology.add_node("client-1", "client", "192.168.1.100");
    let client_b = topology.add_node("client-2", "client", "192.168.1.101");

    for index in [server, router, client_a, client_b] {
        topology.activate_node(index);
    }
    if config.connectivity_required {
        for (client, id) in [(client_a, "client-1"), (client_b, "client-2")] {
            topology.add_connection(client, "server-1");
            topology.add_connection(server, id);
        }
    }

    let send = |topology: &Topology, from: NodeIndex, to: NodeIndex, data: &str| {
        match topology.try_send_data(from, to, data) {
            Ok(()) => info!(from = %from, to = %to, data, "data sent"),
            Err(err) => warn!(from = %from, to = %to, error = %err, "send rejected"),
        }
    };

    send(&topology, client_a, server, "GET /api/data");
    send(&topology, server, client_a, r#"200 OK: {"data": [1, 2, 3]}"#);
    send(&topology, client_b, server, "POST /api/update");
    send(&topology, server, client_b, "201 Created");

    topology.deactivate_node(server);
    send(&topology, client_a, server, "GET /api/status");

    for node in topology.snapshots() {
        info!(id = %node.identifier, ip = %node.address, active = node.active, "final state");
    }
    topology
}
