//! Front-ends for the network simulation.
//!
//! Provides:
//! - A line-oriented request/response loop over stdin/stdout
//! - A file-driven batch runner
//! - A scripted demo scenario

pub mod batch;
pub mod commands;
pub mod config;
pub mod logging;
pub mod protocol;
pub mod session;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
