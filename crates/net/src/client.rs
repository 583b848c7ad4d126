//! TCP client for a match server
//!
//! Requests are answered strictly in order on one connection, so the client
//! simply writes a request and reads the next response.

use std::net::SocketAddr;

use oche_core::Match;
use serde_json::json;
use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tracing::info;

use crate::error::{Error, Result};
use crate::frame::{read_frame, write_frame};
use crate::protocol::{Message, Request, Response};

/// Client handle for network operations
pub struct Client {
    reader: ReadHalf<TcpStream>,
    writer: WriteHalf<TcpStream>,
}

impl Client {
    /// Connect to a match server
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        info!(addr = %addr, "Connecting to server");

        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = tokio::io::split(stream);

        Ok(Client { reader, writer })
    }

    /// Send a request and wait for its response
    pub async fn request(&mut self, request: Request) -> Result<Response> {
        write_frame(&mut self.writer, &Message::Request(request)).await?;
        match read_frame(&mut self.reader).await? {
            Message::Response(response) => Ok(response),
            other => Err(Error::Protocol(format!(
                "Expected Response, got {:?}",
                other
            ))),
        }
    }

    /// Current match
    pub async fn get(&mut self) -> Result<Response> {
        self.request(Request::new("GET", None)).await
    }

    /// Record a throw of `points` for `team_id`
    pub async fn record_throw(&mut self, team_id: u8, points: i64) -> Result<Response> {
        self.request(Request::new(
            "POST",
            Some(json!({ "teamId": team_id, "points": points })),
        ))
        .await
    }

    /// Start a fresh match
    pub async fn reset(&mut self) -> Result<Response> {
        self.request(Request::new("PUT", None)).await
    }

    /// Undo the last throw
    pub async fn undo(&mut self) -> Result<Response> {
        self.request(Request::new("DELETE", None)).await
    }

    /// Fetch and decode the current match
    pub async fn snapshot(&mut self) -> Result<Match> {
        self.get()
            .await?
            .into_match()
            .map_err(|e| Error::Protocol(format!("Invalid match snapshot: {}", e)))
    }

    /// Round-trip a ping
    pub async fn ping(&mut self) -> Result<()> {
        write_frame(&mut self.writer, &Message::Ping).await?;
        match read_frame(&mut self.reader).await? {
            Message::Pong => Ok(()),
            other => Err(Error::Protocol(format!("Expected Pong, got {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::Server;
    use oche_core::TeamId;

    async fn connect(server: &Server) -> Client {
        let addr = SocketAddr::from(([127, 0, 0, 1], server.addr().port()));
        Client::connect(addr).await.unwrap()
    }

    #[tokio::test]
    async fn test_client_plays_against_server() {
        let server = Server::start(0, Match::default()).await.unwrap();
        let mut changes = server.subscribe();
        let mut client = connect(&server).await;

        client.ping().await.unwrap();

        let response = client.record_throw(1, 100).await.unwrap();
        assert_eq!(response.status, 200);
        let game = response.into_match().unwrap();
        assert_eq!(game.team(TeamId::ONE).score, 401);
        assert_eq!(game.active_team_id, TeamId::TWO);

        let published = changes.recv().await.unwrap();
        assert_eq!(published.team(TeamId::ONE).score, 401);

        let response = client.record_throw(2, 60).await.unwrap();
        assert_eq!(response.status, 200);

        let response = client.undo().await.unwrap();
        let game = response.into_match().unwrap();
        assert_eq!(game.team(TeamId::TWO).score, 501);
        assert_eq!(game.active_team_id, TeamId::TWO);
        assert_eq!(game.throws.len(), 1);

        assert_eq!(server.snapshot().await, client.snapshot().await.unwrap());
        server.shutdown();
    }

    #[tokio::test]
    async fn test_client_error_statuses() {
        let server = Server::start(0, Match::default()).await.unwrap();
        let mut client = connect(&server).await;

        assert_eq!(client.record_throw(9, 60).await.unwrap().status, 404);
        assert_eq!(client.record_throw(1, 200).await.unwrap().status, 400);
        assert_eq!(
            client
                .request(Request::new("PATCH", None))
                .await
                .unwrap()
                .status,
            405
        );

        client.record_throw(1, 60).await.unwrap();
        let game = client.reset().await.unwrap().into_match().unwrap();
        assert!(game.throws.is_empty());
        assert_eq!(server.requests_served().await, 5);
        server.shutdown();
    }
}
