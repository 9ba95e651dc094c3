//! Core library for the network simulation.
//!
//! This crate provides the node and topology model:
//! - Nodes with identity, address, liveness and outbound connections
//! - An append-only topology addressed by stable indices
//! - Transfer validation between two nodes
//! - A lock-guarded handle for sharing one topology across threads

pub mod config;
pub mod error;
pub mod node;
pub mod shared;
pub mod topology;

pub use config::TopologyConfig;
pub use error::{Error, Result, TransferError};
pub use node::{Node, NodeIndex, NodeInfo};
pub use shared::SharedTopology;
pub use topology::{Topology, TopologyBuilder};
