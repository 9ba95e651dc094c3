//! Request and response records for the line-oriented interface.
//!
//! A request line is either a JSON object tagged by `command`:
//!
//! ```text
//! {"command":"addNode","id":"a","type":"server","ip":"1.2.3.4"}
//! ```
//!
//! or whitespace-delimited tokens with the same command names:
//!
//! ```text
//! sendData 0 1 GET /api/data
//! ```
//!
//! Every answered request produces one `{"result": ...}` or `{"error": ...}`.

use std::fmt::{self, Display};
use std::str::FromStr;

use corelib::{NodeIndex, NodeInfo};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A node index as written on the wire.
///
/// Any integer is accepted. Values that do not fit a `usize` (negative or
/// too large) name no node, so they are answered with `false`, not a parse
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireIndex(pub Option<NodeIndex>);

impl From<i64> for WireIndex {
    fn from(raw: i64) -> Self {
        WireIndex(NodeIndex::try_from(raw).ok())
    }
}

impl From<u64> for WireIndex {
    fn from(raw: u64) -> Self {
        WireIndex(usize::try_from(raw).ok().map(NodeIndex))
    }
}

impl FromStr for WireIndex {
    type Err = ();

    /// Optional `-` followed by ASCII digits, of any length.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value.strip_prefix('-').unwrap_or(value);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(());
        }
        Ok(WireIndex(value.parse::<usize>().ok().map(NodeIndex)))
    }
}

impl<'de> Deserialize<'de> for WireIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IndexVisitor;

        impl<'de> Visitor<'de> for IndexVisitor {
            type Value = WireIndex;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer node index")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<WireIndex, E> {
                Ok(WireIndex::from(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<WireIndex, E> {
                Ok(WireIndex::from(v))
            }

            // Integers beyond u64 arrive as floats.
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<WireIndex, E> {
                if !v.is_finite() || v.fract() != 0.0 {
                    return Err(E::invalid_type(de::Unexpected::Float(v), &self));
                }
                if v >= 0.0 && v < usize::MAX as f64 {
                    Ok(WireIndex(Some(NodeIndex(v as usize))))
                } else {
                    Ok(WireIndex(None))
                }
            }
        }

        deserializer.deserialize_any(IndexVisitor)
    }
}

/// One parsed request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Request {
    AddNode {
        id: String,
        #[serde(rename = "type")]
        kind: String,
        ip: String,
    },
    ActivateNode {
        index: WireIndex,
    },
    DeactivateNode {
        index: WireIndex,
    },
    SendData {
        source: WireIndex,
        target: WireIndex,
        data: String,
    },
    GetNodeInfo {
        index: WireIndex,
    },
    /// `target` is a node identifier, not an index.
    AddConnection {
        source: WireIndex,
        target: String,
    },
    Exit,
}

/// Errors raised while turning a line into a [`Request`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("empty request")]
    Empty,
    #[error("request is not valid UTF-8")]
    InvalidUtf8,
    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("{command}: missing argument `{argument}`")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("{argument}: expected an integer, got `{value}`")]
    InvalidIndex {
        argument: &'static str,
        value: String,
    },
}

impl FromStr for Request {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }
        if line.starts_with('{') {
            return Ok(serde_json::from_str(line)?);
        }
        parse_tokens(line)
    }
}

fn parse_tokens(line: &str) -> Result<Request, ProtocolError> {
    let mut tokens = Tokens { rest: line };
    let command = tokens.next().unwrap_or_default();

    let request = match command {
        "addNode" => Request::AddNode {
            id: tokens.required("addNode", "id")?.to_string(),
            kind: tokens.required("addNode", "type")?.to_string(),
            ip: tokens.required("addNode", "ip")?.to_string(),
        },
        "activateNode" => Request::ActivateNode {
            index: tokens.index("activateNode", "index")?,
        },
        "deactivateNode" => Request::DeactivateNode {
            index: tokens.index("deactivateNode", "index")?,
        },
        "getNodeInfo" => Request::GetNodeInfo {
            index: tokens.index("getNodeInfo", "index")?,
        },
        "sendData" => {
            let source = tokens.index("sendData", "source")?;
            let target = tokens.index("sendData", "target")?;
            let data = tokens.remainder();
            if data.is_empty() {
                return Err(ProtocolError::MissingArgument {
                    command: "sendData",
                    argument: "data",
                });
            }
            Request::SendData {
                source,
                target,
                data: data.to_string(),
            }
        }
        "addConnection" => Request::AddConnection {
            source: tokens.index("addConnection", "source")?,
            target: tokens.required("addConnection", "target")?.to_string(),
        },
        "exit" => Request::Exit,
        other => return Err(ProtocolError::UnknownCommand(other.to_string())),
    };
    Ok(request)
}

struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest.trim_start();
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (token, rest) = rest.split_at(end);
        self.rest = rest;
        Some(token)
    }

    fn remainder(&mut self) -> &'a str {
        std::mem::take(&mut self.rest).trim()
    }

    fn required(&mut self, command: &'static str, argument: &'static str) -> Result<&'a str, ProtocolError> {
        self.next()
            .ok_or(ProtocolError::MissingArgument { command, argument })
    }

    fn index(&mut self, command: &'static str, argument: &'static str) -> Result<WireIndex, ProtocolError> {
        let value = self.required(command, argument)?;
        value.parse().map_err(|_| ProtocolError::InvalidIndex {
            argument,
            value: value.to_string(),
        })
    }
}

/// Value carried by a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Index(NodeIndex),
    Success(bool),
    /// `None` serializes as `null` for an invalid index.
    Node(Option<NodeInfo>),
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Result(Reply),
    Error(String),
}

impl Response {
    pub fn error(err: impl Display) -> Self {
        Response::Error(err.to_string())
    }
}
