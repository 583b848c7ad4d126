//! TCP server mirroring the match engine
//!
//! Each server owns one match. Clients send requests and receive the full
//! match snapshot back; every change is also published to subscribers so the
//! host can persist it.

use std::net::SocketAddr;
use std::sync::Arc;

use oche_core::Match;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::frame::{read_frame, write_frame};
use crate::handler::handle;
use crate::protocol::Message;

/// Capacity of the change feed; slow subscribers skip to the newest snapshot
const CHANGE_FEED_CAPACITY: usize = 16;

/// Server state shared across tasks
struct ServerState {
    game: Match,
    requests_served: u64,
}

/// Match server handle
pub struct Server {
    addr: SocketAddr,
    state: Arc<RwLock<ServerState>>,
    shutdown_tx: broadcast::Sender<()>,
    changes_tx: broadcast::Sender<Match>,
}

impl Server {
    /// Start a new server on the given port, serving `game`
    pub async fn start(port: u16, game: Match) -> Result<Self> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await?;
        let bound_addr = listener.local_addr()?;

        info!(addr = %bound_addr, "Server started");

        let (shutdown_tx, _) = broadcast::channel(1);
        let (changes_tx, _) = broadcast::channel(CHANGE_FEED_CAPACITY);

        let state = Arc::new(RwLock::new(ServerState {
            game,
            requests_served: 0,
        }));

        // Spawn accept loop
        let shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(accept_loop(
            listener,
            state.clone(),
            changes_tx.clone(),
            shutdown_rx,
        ));

        Ok(Server {
            addr: bound_addr,
            state,
            shutdown_tx,
            changes_tx,
        })
    }

    /// Get the server's bound address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Current match snapshot
    pub async fn snapshot(&self) -> Match {
        self.state.read().await.game.clone()
    }

    /// Number of requests answered so far
    pub async fn requests_served(&self) -> u64 {
        self.state.read().await.requests_served
    }

    /// Receive a snapshot after every change to the match
    pub fn subscribe(&self) -> broadcast::Receiver<Match> {
        self.changes_tx.subscribe()
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        info!("Server shutdown initiated");
    }
}

/// Accept incoming connections
async fn accept_loop(
    listener: TcpListener,
    state: Arc<RwLock<ServerState>>,
    changes_tx: broadcast::Sender<Match>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, addr)) => {
                        debug!(addr = %addr, "New connection");
                        let state = state.clone();
                        let changes_tx = changes_tx.clone();
                        tokio::spawn(handle_connection(stream, addr, state, changes_tx));
                    }
                    Err(e) => {
                        error!(error = %e, "Accept failed");
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Accept loop shutting down");
                break;
            }
        }
    }
}

/// Serve requests from a single client until it disconnects
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<RwLock<ServerState>>,
    changes_tx: broadcast::Sender<Match>,
) {
    let (mut reader, mut writer) = tokio::io::split(stream);

    loop {
        let reply = match read_frame(&mut reader).await {
            Ok(Message::Request(request)) => {
                let (handled, snapshot) = {
                    let mut s = state.write().await;
                    s.requests_served += 1;
                    let handled = handle(&mut s.game, &request);
                    let snapshot = handled.mutated.then(|| s.game.clone());
                    (handled, snapshot)
                };

                debug!(
                    addr = %addr,
                    method = %request.method,
                    status = handled.response.status,
                    "Request handled"
                );

                if let Some(snapshot) = snapshot {
                    // No subscribers is fine
                    let _ = changes_tx.send(snapshot);
                }
                Message::Response(handled.response)
            }
            Ok(Message::Ping) => Message::Pong,
            Ok(other) => {
                debug!(addr = %addr, message = ?other, "Ignoring unexpected message type");
                continue;
            }
            Err(Error::ConnectionClosed) => {
                debug!(addr = %addr, "Connection closed");
                break;
            }
            Err(e) => {
                warn!(addr = %addr, error = %e, "Read error");
                break;
            }
        };

        if let Err(e) = write_frame(&mut writer, &reply).await {
            debug!(addr = %addr, error = %e, "Write failed");
            break;
        }
    }

    info!(addr = %addr, "Client disconnected");
}
