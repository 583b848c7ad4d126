//! Oche - 501 darts scorekeeper
//!
//! Runs the scoreboard in the terminal, or with `serve [port]` mirrors the
//! match over TCP so other devices can score it.

use std::io;

use oche_core::AppConfig;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod console;
mod mirror;
mod state;
mod viewmodel;

use mirror::MirrorLog;
use state::AppState;
use viewmodel::Scoreboard;

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Oche");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(config);
    if let Some(dir) = app_state.data_dir() {
        tracing::info!(path = %dir.display(), "Using data directory");
    }
    let mut args = std::env::args().skip(1);

    let result = match args.next().as_deref() {
        Some("serve") => {
            let port = match args.next().map(|p| p.parse::<u16>()) {
                Some(Ok(port)) => port,
                Some(Err(e)) => {
                    tracing::error!("Invalid port: {}", e);
                    std::process::exit(2);
                }
                None => app_state.config.port,
            };
            serve(&app_state, port)
        }
        Some(other) => {
            eprintln!("Unknown command '{}'. Usage: oche [serve [port]]", other);
            std::process::exit(2);
        }
        None => {
            let mut board = Scoreboard::restore(
                app_state.open_store(),
                app_state.config.team_names.clone(),
            );
            let stdin = io::stdin();
            console::run(&mut board, stdin.lock(), &mut io::stdout())
        }
    };

    if let Err(e) = result {
        tracing::error!("Exited with error: {}", e);
        std::process::exit(1);
    }
}

/// Run the network mirror until Ctrl-C, saving every change
fn serve(app_state: &AppState, port: u16) -> io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let mut log = MirrorLog::restore(app_state.open_store(), app_state.config.team_names.clone());
    let game = log.starting_match();

    runtime.block_on(async {
        let server = oche_net::Server::start(port, game)
            .await
            .map_err(io::Error::other)?;
        let mut changes = server.subscribe();
        tracing::info!(
            addr = %server.addr(),
            history = log.bundle().history.len(),
            "Serving match, press Ctrl-C to stop"
        );

        loop {
            tokio::select! {
                change = changes.recv() => match change {
                    Ok(game) => log.record(&game),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Change feed lagged, saving latest state");
                        log.record(&server.snapshot().await);
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted");
                    break;
                }
            }
        }

        server.shutdown();
        Ok::<(), io::Error>(())
    })
}
