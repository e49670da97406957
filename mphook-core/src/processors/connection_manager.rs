//! ConnectionManager processor.
//!
//! The ConnectionManager is responsible for:
//! - Opening the feed websocket and sending one `want` request per distinct
//!   event kind referenced by the trigger rules
//! - Decoding inbound frames, classifying them into `FeedEvent`s and handing
//!   each one to the `TriggerEngine`
//! - Reconnecting after a fixed delay whenever the connection closes
//!
//! State machine: `Disconnected -> Connecting -> Connected -> Disconnected`,
//! repeated until shutdown. The subscription set belongs to one connection
//! generation and is reset on every new connection.

use crate::config::MonitorConfig;
use crate::events::classify;
use crate::processors::trigger_engine::TriggerEngine;
use futures_util::{Sink, SinkExt, StreamExt};
use mphook_sdk::objects::{EventKind, SubscribeRequest};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::watch;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, warn};
use url::Url;

/// Lifecycle state of the feed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

/// How a single connection generation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Closed,
    Shutdown,
}

/// Owns the feed socket lifecycle and drives the trigger engine.
pub struct ConnectionManager {
    feed_url: Url,
    reconnect_delay: Duration,
    /// Distinct rule event kinds, in first-appearance order.
    wanted: Vec<EventKind>,
    engine: TriggerEngine,
    subscriptions: HashSet<EventKind>,
    state: ConnectionState,
    generation: u64,
}

impl ConnectionManager {
    /// Create a new ConnectionManager.
    ///
    /// The subscribed event kinds are derived from `config.triggers`.
    pub fn new(config: &MonitorConfig, engine: TriggerEngine) -> Self {
        Self {
            feed_url: config.feed_url.clone(),
            reconnect_delay: config.reconnect_delay,
            wanted: config.subscribed_kinds(),
            engine,
            subscriptions: HashSet::new(),
            state: ConnectionState::Disconnected,
            generation: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Event kinds subscribed on the current connection.
    pub fn subscriptions(&self) -> &HashSet<EventKind> {
        &self.subscriptions
    }

    /// Number of connections opened so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run the connect / receive / reconnect loop until shutdown is signaled.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            url = %self.feed_url,
            reconnect_delay = ?self.reconnect_delay,
            events = ?self.wanted,
            "ConnectionManager started"
        );

        loop {
            if self.serve_connection(&mut shutdown_rx).await == SessionEnd::Shutdown {
                break;
            }
            self.transition(ConnectionState::Disconnected);

            info!(delay = ?self.reconnect_delay, "Reconnecting to feed after delay");
            tokio::select! {
                biased;

                _ = shutdown_requested(&mut shutdown_rx) => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        self.transition(ConnectionState::Disconnected);
        info!("ConnectionManager shutdown complete");
    }

    /// Classify one decoded text frame and route every resulting event
    /// through the trigger engine.
    ///
    /// Returns the number of matched rules. Malformed JSON is dropped.
    pub fn route_text(&self, text: &str) -> usize {
        let message: serde_json::Value = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "Dropping malformed feed message");
                return 0;
            }
        };

        let mut matched = 0;
        for event in classify(&message) {
            matched += self.engine.handle(&event);
        }
        matched
    }

    /// Connect, subscribe and receive until the connection ends.
    async fn serve_connection(&mut self, shutdown_rx: &mut watch::Receiver<bool>) -> SessionEnd {
        self.transition(ConnectionState::Connecting);
        info!(url = %self.feed_url, "Connecting to feed");

        let ws_stream = tokio::select! {
            biased;

            _ = shutdown_requested(shutdown_rx) => return SessionEnd::Shutdown,
            result = connect_async(self.feed_url.as_str()) => match result {
                Ok((ws_stream, _)) => ws_stream,
                Err(e) => {
                    warn!(url = %self.feed_url, error = %e, "Feed connection failed");
                    return SessionEnd::Closed;
                }
            },
        };

        let (mut write, mut read) = ws_stream.split();

        if let Err(e) = self.on_open(&mut write).await {
            warn!(error = %e, "Failed to send subscription request");
            return SessionEnd::Closed;
        }

        loop {
            tokio::select! {
                biased;

                _ = shutdown_requested(shutdown_rx) => {
                    let _ = write.send(Message::Close(None)).await;
                    return SessionEnd::Shutdown;
                }

                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        self.route_text(&text);
                    }
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => {
                            self.route_text(text);
                        }
                        Err(_) => debug!(len = bytes.len(), "Dropping non-UTF-8 binary frame"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        info!(?frame, "Feed closed by server");
                        return SessionEnd::Closed;
                    }
                    // Pings are answered by tungstenite itself.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "Feed transport error");
                        return SessionEnd::Closed;
                    }
                    None => {
                        info!("Feed stream ended");
                        return SessionEnd::Closed;
                    }
                },
            }
        }
    }

    /// Start a new connection generation and subscribe to every wanted kind.
    async fn on_open<S>(&mut self, write: &mut S) -> Result<(), tungstenite::Error>
    where
        S: Sink<Message, Error = tungstenite::Error> + Unpin,
    {
        self.generation += 1;
        self.subscriptions.clear();
        self.transition(ConnectionState::Connected);
        info!(generation = self.generation, "Connected to feed");

        let wanted = self.wanted.clone();
        for kind in wanted {
            self.subscribe(write, kind).await?;
        }
        Ok(())
    }

    async fn subscribe<S>(
        &mut self,
        write: &mut S,
        kind: EventKind,
    ) -> Result<(), tungstenite::Error>
    where
        S: Sink<Message, Error = tungstenite::Error> + Unpin,
    {
        if self.subscriptions.contains(&kind) {
            return Ok(());
        }

        let request = match serde_json::to_string(&SubscribeRequest::want(kind)) {
            Ok(request) => request,
            Err(e) => {
                warn!(event = %kind, error = %e, "Failed to encode subscription request");
                return Ok(());
            }
        };

        write.send(Message::Text(request)).await?;
        self.subscriptions.insert(kind);
        info!(event = %kind, "Subscribed");
        Ok(())
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "Connection state changed");
            self.state = next;
        }
    }
}

/// Resolves once shutdown is signaled or the shutdown sender is gone.
async fn shutdown_requested(shutdown_rx: &mut watch::Receiver<bool>) {
    let _ = shutdown_rx.wait_for(|stop| *stop).await;
}
