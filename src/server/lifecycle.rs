//! Server lifecycle and shutdown coordination.

use std::fmt;

use tokio::sync::broadcast;

/// Where the server is in its life.
///
/// ```text
/// Starting → Listening → Draining → Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Socket bound, not yet accepting
    Starting,
    /// Accepting connections one at a time
    Listening,
    /// Shutdown requested; finishing the current connection
    Draining,
    Stopped,
}

impl ServerState {
    /// Whether `next` may follow `self`.
    ///
    /// A server that fails before listening may stop straight away.
    pub fn can_transition_to(self, next: ServerState) -> bool {
        matches!(
            (self, next),
            (ServerState::Starting, ServerState::Listening)
                | (ServerState::Starting, ServerState::Stopped)
                | (ServerState::Listening, ServerState::Draining)
                | (ServerState::Listening, ServerState::Stopped)
                | (ServerState::Draining, ServerState::Stopped)
        )
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerState::Starting => "starting",
            ServerState::Listening => "listening",
            ServerState::Draining => "draining",
            ServerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Coordinator for graceful shutdown.
///
/// The accept loop holds a receiver and checks it between connections.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
