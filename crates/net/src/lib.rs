//! Oche Network Library
//!
//! TCP request/response mirror of the match engine.
//!
//! # Architecture
//!
//! - **Server**: Owns one match and answers requests against it
//! - **Client**: Sends requests and reads the responses
//! - **Protocol**: Length-prefixed JSON messages carrying HTTP-style verbs
//!   (`GET`, `POST`, `PUT`, `DELETE`) and status codes
//!
//! # Usage
//!
//! ```ignore
//! let server = Server::start(DEFAULT_PORT, Match::default()).await?;
//!
//! let mut client = Client::connect(server.addr()).await?;
//! let response = client.record_throw(1, 100).await?;
//! assert_eq!(response.status, 200);
//! ```

pub mod client;
pub mod error;
mod frame;
pub mod handler;
pub mod protocol;
pub mod server;

pub use client::Client;
pub use error::{Error, Result};
pub use protocol::{Message, Method, Request, Response};
pub use server::Server;

pub use oche_core::config::DEFAULT_PORT;
