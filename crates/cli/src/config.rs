//! Command-line configuration.

use clap::Parser;
use corelib::TopologyConfig;

use crate::commands::{Command, CommandResult};
use crate::logging;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "netsim",
    about = "Simulated network nodes with transfer validation",
    version
)]
pub struct CliConfig {
    /// Require the target to be in the source's connection list for a send
    #[arg(long, global = true)]
    pub require_connectivity: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn topology_config(&self) -> TopologyConfig {
        TopologyConfig {
            connectivity_required: self.require_connectivity,
        }
    }

    /// Effective `-v` count. The demo narrates at info level, so it never
    /// starts below that.
    pub fn log_verbosity(&self) -> u8 {
        match self.command {
            Command::Demo => self.verbose.max(1),
            _ => self.verbose,
        }
    }

    pub fn run(self) -> CommandResult {
        logging::init(self.log_verbosity())?;
        let config = self.topology_config();
        self.command.execute(config)
    }
}
