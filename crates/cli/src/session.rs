//! Interactive request loop.
//!
//! A [`Session`] owns one topology for its whole lifetime and answers one
//! request line with exactly one response line. Bad input is answered with
//! an error record and the loop moves on; only stream I/O failures stop it.

use std::io::{self, BufRead, Write};

use corelib::{Topology, TopologyConfig};
use tracing::{debug, info, warn};

use crate::protocol::{ProtocolError, Reply, Request, Response};

/// What the loop should do after a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Reply(Response),
    Exit,
}

/// One interactive simulation session.
#[derive(Debug, Default)]
pub struct Session {
    topology: Topology,
}

impl Session {
    pub fn new(config: TopologyConfig) -> Self {
        Self {
            topology: Topology::with_config(config),
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Parse and answer a single line.
    pub fn handle_line(&mut self, line: &str) -> Flow {
        match line.parse::<Request>() {
            Ok(request) => self.dispatch(request),
            Err(err) => {
                warn!(error = %err, "rejected request");
                Flow::Reply(Response::error(err))
            }
        }
    }

    /// Apply a parsed request to the topology.
    pub fn dispatch(&mut self, request: Request) -> Flow {
        debug!(?request, "dispatch");
        let reply = match request {
            Request::AddNode { id, kind, ip } => Reply::Index(self.topology.add_node(id, kind, ip)),
            Request::ActivateNode { index } => {
                Reply::Success(index.0.is_some_and(|i| self.topology.activate_node(i)))
            }
            Request::DeactivateNode { index } => {
                Reply::Success(index.0.is_some_and(|i| self.topology.deactivate_node(i)))
            }
            Request::SendData { source, target, data } => {
                let sent = match (source.0, target.0) {
                    (Some(s), Some(t)) => self.topology.send_data(s, t, &data),
                    _ => false,
                };
                Reply::Success(sent)
            }
            Request::GetNodeInfo { index } => {
                Reply::Node(index.0.and_then(|i| self.topology.get_node_info(i)))
            }
            Request::AddConnection { source, target } => Reply::Success(
                source.0.is_some_and(|s| self.topology.add_connection(s, target)),
            ),
            Request::Exit => return Flow::Exit,
        };
        Flow::Reply(Response::Result(reply))
    }

    /// Serve requests from `input` until EOF or `exit`.
    ///
    /// Lines are read as raw bytes; a line that is not UTF-8 is answered
    /// with an error like any other malformed request. Returns the number of
    /// responses written.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> io::Result<usize> {
        let mut answered = 0;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let flow = match std::str::from_utf8(&buf) {
                Ok(line) => self.handle_line(line),
                Err(_) => {
                    warn!(len = buf.len(), "rejected non-UTF-8 request");
                    Flow::Reply(Response::error(ProtocolError::InvalidUtf8))
                }
            };
            match flow {
                Flow::Exit => {
                    debug!("exit requested");
                    break;
                }
                Flow::Reply(response) => {
                    serde_json::to_writer(&mut output, &response)?;
                    output.write_all(b"\n")?;
                    output.flush()?;
                    answered += 1;
                }
            }
        }
        info!(answered, nodes = self.topology.len(), "session finished");
        Ok(answered)
    }
}
