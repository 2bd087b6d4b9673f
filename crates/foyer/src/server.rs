//! `FoyerServer` builder and server loop.
//!
//! This is the entry point for running a Foyer lobby. It ties together all
//! the layers: transport → protocol → session → room, plus the HTTP
//! registration endpoint.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use foyer_protocol::{Codec, JsonCodec};
use foyer_room::{ChatLog, RoomController};
use foyer_session::{Authenticator, PlayerDirectory, Registrar, SessionConfig, StoreAuthenticator};
use foyer_store::DocumentStore;
use foyer_transport::{PendingConnection, Transport, WebSocketTransport};
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::handler::handle_connection;
use crate::http::registration_router;
use crate::FoyerError;

/// Shared server state passed to each connection handler task.
///
/// Every component holds its own clone of the one store handle; nothing
/// here needs a lock.
pub(crate) struct ServerState<S: DocumentStore, A: Authenticator, C: Codec> {
    pub(crate) registrar: Arc<Registrar<S>>,
    pub(crate) players: PlayerDirectory<S>,
    pub(crate) rooms: RoomController<S>,
    pub(crate) chat: ChatLog<S>,
    pub(crate) auth: A,
    pub(crate) codec: C,
    pub(crate) config: SessionConfig,
}

impl<S: DocumentStore, A: Authenticator, C: Codec> ServerState<S, A, C> {
    pub(crate) fn new(store: Arc<S>, auth: A, codec: C, config: SessionConfig) -> Self {
        Self {
            registrar: Arc::new(Registrar::new(Arc::clone(&store), &config)),
            players: PlayerDirectory::new(Arc::clone(&store)),
            rooms: RoomController::new(Arc::clone(&store)),
            chat: ChatLog::new(store),
            auth,
            codec,
            config,
        }
    }
}

/// Builder for configuring and starting a Foyer server.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use foyer::prelude::*;
///
/// # async fn run() -> Result<(), FoyerError> {
/// let server = FoyerServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .registration_addr("0.0.0.0:8081")
///     .build(Arc::new(MemoryStore::new()))
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct FoyerServerBuilder {
    bind_addr: String,
    registration_addr: Option<String>,
    session_config: SessionConfig,
}

impl FoyerServerBuilder {
    /// Creates a new builder with default settings and no registration
    /// endpoint.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            registration_addr: None,
            session_config: SessionConfig::default(),
        }
    }

    /// Sets the address the WebSocket listener binds to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Serves the HTTP registration endpoint on `addr`.
    pub fn registration_addr(mut self, addr: &str) -> Self {
        self.registration_addr = Some(addr.to_string());
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Binds the listeners, authenticating logins against player records
    /// in `store`.
    pub async fn build<S: DocumentStore>(
        self,
        store: Arc<S>,
    ) -> Result<FoyerServer<S, StoreAuthenticator<S>, JsonCodec>, FoyerError> {
        let auth = StoreAuthenticator::new(Arc::clone(&store));
        self.build_with_auth(store, auth).await
    }

    /// Binds the listeners with a custom authenticator.
    pub async fn build_with_auth<S: DocumentStore, A: Authenticator>(
        self,
        store: Arc<S>,
        auth: A,
    ) -> Result<FoyerServer<S, A, JsonCodec>, FoyerError> {
        let transport = WebSocketTransport::bind(&self.bind_addr)
            .await?
            .with_max_message_size(self.session_config.max_message_size);

        let registration = match self.registration_addr {
            Some(addr) => {
                let bound = TcpListener::bind(&addr).await;
                match bound {
                    Ok(listener) => {
                        tracing::info!(%addr, "registration endpoint listening");
                        Some(listener)
                    }
                    Err(source) => return Err(FoyerError::Http { addr, source }),
                }
            }
            None => None,
        };

        let state = Arc::new(ServerState::new(store, auth, JsonCodec, self.session_config));
        Ok(FoyerServer {
            transport,
            registration,
            state,
        })
    }
}

impl Default for FoyerServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Foyer server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct FoyerServer<S: DocumentStore, A: Authenticator, C: Codec> {
    transport: WebSocketTransport,
    registration: Option<TcpListener>,
    state: Arc<ServerState<S, A, C>>,
}

impl<S, A, C> FoyerServer<S, A, C>
where
    S: DocumentStore,
    A: Authenticator,
    C: Codec,
{
    /// Returns the address the WebSocket listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the address of the registration endpoint, if one is served.
    pub fn registration_local_addr(&self) -> Option<std::io::Result<SocketAddr>> {
        self.registration.as_ref().map(TcpListener::local_addr)
    }

    /// Runs the server until the process is terminated.
    pub async fn run(self) -> Result<(), FoyerError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the server until `shutdown` completes.
    ///
    /// Stops accepting connections and drains the registration endpoint
    /// on shutdown. Connections already being served keep running on
    /// their own tasks.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()> + Send,
    ) -> Result<(), FoyerError> {
        let (stop_tx, stop_rx) = watch::channel(false);
        let http = self.registration.take().map(|listener| {
            let router = registration_router(Arc::clone(&self.state.registrar));
            let mut stop = stop_rx.clone();
            tokio::spawn(async move {
                axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        let _ = stop.wait_for(|stopped| *stopped).await;
                    })
                    .await
            })
        });

        tracing::info!("Foyer server running");
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                accepted = self.transport.accept() => match accepted {
                    Ok(pending) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            let addr = pending.peer_addr();
                            let conn = match pending.establish().await {
                                Ok(conn) => conn,
                                Err(e) => {
                                    tracing::debug!(%addr, error = %e, "handshake failed");
                                    return;
                                }
                            };
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        tracing::info!("Foyer server shutting down");
        let _ = stop_tx.send(true);
        if let Some(task) = http {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "registration endpoint failed"),
                Err(e) => tracing::error!(error = %e, "registration endpoint task panicked"),
            }
        }
        Ok(())
    }
}
