//! Errors raised while talking to a match server

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Transport-level failures. Rejected requests are not errors here; they
/// come back as a [`Response`](crate::Response) with a non-200 status.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The peer closed the stream between frames
    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Protocol error: {0}")]
    Protocol(String),
}
