use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

use crate::config::Config;
use crate::error::{Result, ServerError};
use crate::http::connection::Connection;
use crate::routing::Dispatcher;
use crate::server::lifecycle::ServerState;

/// Owns the listening socket and serves connections strictly one at a time.
pub struct Server {
    listener: TcpListener,
    dispatcher: Dispatcher,
    read_timeout: Duration,
    write_timeout: Duration,
    state: ServerState,
}

impl Server {
    /// Binds the listening socket. Failure here is fatal.
    pub async fn bind(cfg: &Config) -> Result<Self> {
        let dispatcher = Dispatcher::from_config(cfg)?;

        let listener = TcpListener::bind(&cfg.server.listen_addr)
            .await
            .map_err(|source| ServerError::ListenSetupFailed {
                addr: cfg.server.listen_addr.clone(),
                source,
            })?;

        Ok(Self {
            listener,
            dispatcher,
            read_timeout: cfg.server.read_timeout(),
            write_timeout: cfg.server.write_timeout(),
            state: ServerState::Starting,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    fn transition(&mut self, next: ServerState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {} -> {}",
            self.state,
            next
        );
        info!(from = %self.state, to = %next, "Server state changed");
        self.state = next;
    }

    /// Accepts and serves connections until `shutdown` fires.
    ///
    /// The signal is observed between connections, so the connection in
    /// flight is always finished. Per-connection errors are logged and never
    /// stop the loop; an accept failure does.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let addr = self.local_addr()?;
        self.transition(ServerState::Listening);
        info!("Listening on {}", addr);

        loop {
            let (socket, peer) = tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    self.transition(ServerState::Draining);
                    break;
                }

                accepted = self.listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        tracing::error!(error = %e, "Accept failed");
                        self.transition(ServerState::Stopped);
                        return Err(ServerError::AcceptFailed(e));
                    }
                },
            };

            info!("Accepted connection from {}", peer);

            let conn = Connection::new(
                socket,
                peer,
                &self.dispatcher,
                self.read_timeout,
                self.write_timeout,
            );

            if let Err(e) = conn.run().await {
                tracing::warn!(%peer, error = %e, "Connection error");
            }
        }

        self.transition(ServerState::Stopped);
        Ok(())
    }
}
