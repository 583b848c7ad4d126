//! Network protocol message types
//!
//! All messages are JSON-serialized and length-prefixed on the wire.
//! Requests carry an HTTP-style verb and optional JSON body; responses carry
//! an HTTP-style status and a JSON body.

use std::fmt;
use std::str::FromStr;

use oche_core::Match;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Verbs understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Current match snapshot
    Get,
    /// Record a throw
    Post,
    /// Reset the match
    Put,
    /// Undo the last throw
    Delete,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::Get, Method::Post, Method::Put, Method::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as sent by a client. The verb stays a string so unsupported
/// verbs reach the server and get a 405.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: method.into(),
            body,
        }
    }
}

/// A response to one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    /// 200 with the full match snapshot
    pub fn snapshot(game: &Match) -> Self {
        match serde_json::to_value(game) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::error(500, format!("Failed to encode match: {}", e)),
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    /// 405 listing the verbs that are supported
    pub fn method_not_allowed(method: &str) -> Self {
        let allow: Vec<&str> = Method::ALL.iter().map(|m| m.as_str()).collect();
        Self {
            status: 405,
            body: json!({
                "error": format!("Method {} Not Allowed", method),
                "allow": allow,
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as a match snapshot
    pub fn into_match(self) -> Result<Match, serde_json::Error> {
        serde_json::from_value(self.body)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

/// Network protocol messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    Request(Request),
    Response(Response),

    /// Ping to keep connection alive
    Ping,

    /// Pong response to ping
    Pong,
}

impl Message {
    /// Serialize message to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize message from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
