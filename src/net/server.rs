//! WebSocket Front End
//!
//! Accepts connections, decodes JSON client messages, dispatches them
//! to the round engine, and writes JSON replies. All protocol decisions
//! live in the engine; this layer only translates.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, instrument, warn};

use crate::core::clock::{Clock, SystemClock};
use crate::ledger::{InMemoryLedger, LedgerClient, TimedLedger};
use crate::net::protocol::{ClientMessage, ServerMessage, WireError};
use crate::protocol::engine::RoundEngine;

/// Engine type hosted by the stock server: an in-memory ledger behind
/// the timeout decorator, driven by the wall clock.
pub type ServerEngine = RoundEngine<TimedLedger<InMemoryLedger>, SystemClock>;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
}

/// Front-end errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind or accept.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Failed to encode a reply.
    #[error("failed to encode reply: {0}")]
    Encode(#[from] serde_json::Error),
}

/// WebSocket server fronting one round engine.
pub struct ContestServer {
    engine: Arc<ServerEngine>,
    config: ServerConfig,
}

impl ContestServer {
    /// Create a server for `engine`.
    pub fn new(engine: ServerEngine, config: ServerConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            config,
        }
    }

    /// Accept connections until the process is stopped.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!("listening on {}", self.config.bind_addr);

        loop {
            let (stream, addr) = listener.accept().await?;
            let engine = Arc::clone(&self.engine);
            tokio::spawn(async move {
                if let Err(err) = handle_connection(engine, stream, addr).await {
                    warn!(%addr, "connection ended with error: {err}");
                }
            });
        }
    }
}

#[instrument(skip(engine, stream))]
async fn handle_connection(
    engine: Arc<ServerEngine>,
    stream: TcpStream,
    addr: SocketAddr,
) -> Result<(), ServerError> {
    let ws = accept_async(stream).await?;
    let (mut write, mut read) = ws.split();
    debug!("connection established");

    while let Some(msg) = read.next().await {
        match msg? {
            Message::Text(text) => {
                let reply = match ClientMessage::from_json(&text) {
                    Ok(request) => dispatch(engine.as_ref(), request).await,
                    Err(err) => ServerMessage::Error(WireError::malformed(err)),
                };
                write.send(Message::Text(reply.to_json()?)).await?;
            }
            Message::Ping(payload) => write.send(Message::Pong(payload)).await?,
            Message::Close(_) => break,
            _ => {}
        }
    }

    debug!("connection closed");
    Ok(())
}

/// Translate one client message into one server message.
///
/// Generic over the engine so tests can drive it with a manual clock.
pub async fn dispatch<L: LedgerClient, C: Clock>(
    engine: &RoundEngine<L, C>,
    request: ClientMessage,
) -> ServerMessage {
    match request {
        ClientMessage::Commit(req) => {
            match engine
                .submit_commit(&req.participant_id, req.value, &req.nonce)
                .await
            {
                Ok(receipt) => ServerMessage::CommitAccepted(receipt),
                Err(err) => ServerMessage::Error(WireError::from_engine(&err)),
            }
        }
        ClientMessage::Reveal(req) => {
            match engine
                .submit_reveal(&req.participant_id, req.value, &req.nonce)
                .await
            {
                Ok(report) => ServerMessage::RevealRecorded(report),
                Err(err) => ServerMessage::Error(WireError::from_engine(&err)),
            }
        }
        ClientMessage::FetchLedger { table } => match engine.fetch_ledger(table).await {
            Ok(view) => ServerMessage::Ledger(view),
            Err(err) => ServerMessage::Error(WireError::from_engine(&err)),
        },
        ClientMessage::Ping { timestamp } => ServerMessage::Pong {
            timestamp,
            server_time: engine.now().timestamp_millis().max(0) as u64,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::ledger::LedgerTable;
    use crate::net::protocol::{ErrorCode, SubmissionRequest};
    use crate::protocol::engine::LedgerView;
    use crate::protocol::phase::RoundSchedule;
    use crate::protocol::validate::ValueBounds;
    use crate::protocol::verify::RevealOutcome;
    use chrono::{Duration, TimeZone, Utc};

    fn test_engine() -> (RoundEngine<InMemoryLedger, ManualClock>, ManualClock) {
        let deadline = Utc.with_ymd_and_hms(2025, 10, 21, 21, 59, 59).unwrap();
        let reveal = Utc.with_ymd_and_hms(2025, 10, 21, 22, 0, 0).unwrap();
        let schedule = RoundSchedule::new(deadline, reveal).unwrap();
        let clock = ManualClock::new(deadline - Duration::hours(1));
        let engine = RoundEngine::new(
            schedule,
            ValueBounds::default(),
            InMemoryLedger::new(),
            clock.clone(),
        );
        (engine, clock)
    }

    fn commit_msg(id: &str, value: i64, nonce: &str) -> ClientMessage {
        ClientMessage::Commit(SubmissionRequest {
            participant_id: id.into(),
            value,
            nonce: nonce.into(),
        })
    }

    fn reveal_msg(id: &str, value: i64, nonce: &str) -> ClientMessage {
        ClientMessage::Reveal(SubmissionRequest {
            participant_id: id.into(),
            value,
            nonce: nonce.into(),
        })
    }

    #[tokio::test]
    async fn test_dispatch_full_round() {
        let (engine, clock) = test_engine();

        let reply = dispatch(&engine, commit_msg("u1", 42, "abc123")).await;
        let ServerMessage::CommitAccepted(receipt) = reply else {
            panic!("expected commit acceptance, got {reply:?}");
        };
        assert_eq!(receipt.preimage, "u1|42|abc123");

        clock.set(engine.schedule().reveal_open());
        let reply = dispatch(&engine, reveal_msg("u1", 42, "abc123")).await;
        let ServerMessage::RevealRecorded(report) = reply else {
            panic!("expected reveal record, got {reply:?}");
        };
        assert_eq!(report.outcome, RevealOutcome::Match);

        let reply = dispatch(
            &engine,
            ClientMessage::FetchLedger {
                table: LedgerTable::Reveals,
            },
        )
        .await;
        let ServerMessage::Ledger(LedgerView::Reveals(reveals)) = reply else {
            panic!("expected reveal table");
        };
        assert_eq!(reveals.len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_maps_engine_errors() {
        let (engine, clock) = test_engine();

        let reply = dispatch(&engine, commit_msg("u1", 101, "abc123")).await;
        let ServerMessage::Error(err) = reply else {
            panic!("expected error");
        };
        assert_eq!(err.code, ErrorCode::OutOfRange);
        assert!(err.message.contains("101"));

        clock.set(engine.schedule().commit_deadline() + Duration::seconds(1));
        let reply = dispatch(&engine, commit_msg("u1", 42, "abc123")).await;
        let ServerMessage::Error(err) = reply else {
            panic!("expected error");
        };
        assert_eq!(err.code, ErrorCode::PhaseViolation);
    }

    #[tokio::test]
    async fn test_dispatch_pong_echoes_timestamp() {
        let (engine, _clock) = test_engine();
        let reply = dispatch(&engine, ClientMessage::Ping { timestamp: 777 }).await;
        let ServerMessage::Pong {
            timestamp,
            server_time,
        } = reply
        else {
            panic!("expected pong");
        };
        assert_eq!(timestamp, 777);
        assert!(server_time > 0);
    }
}
