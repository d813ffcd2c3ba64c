//! `HexfrontServer` builder and server loop.
//!
//! This is the entry point for running a hexfront server. It ties the
//! layers together: transport → protocol → player → hub → room.

use hexfront_protocol::JsonCodec;
use hexfront_room::{RoomConfig, spawn_hub};
use hexfront_sim::MatchConfig;
use hexfront_transport::{Transport, WebSocketTransport};

use crate::player::handle_connection;
use crate::{HexfrontError, ServerConfig};

/// Builder for configuring and starting a hexfront server.
///
/// # Example
///
/// ```rust,no_run
/// use hexfront::prelude::*;
///
/// # async fn start() -> Result<(), HexfrontError> {
/// let server = HexfrontServer::builder()
///     .bind("0.0.0.0:8000")
///     .match_config(MatchConfig::basic())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct HexfrontServerBuilder {
    bind_addr: String,
    match_config: MatchConfig,
    room_config: RoomConfig,
}

impl HexfrontServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            match_config: MatchConfig::basic(),
            room_config: RoomConfig::default(),
        }
    }

    /// Starts from loaded settings. The scenario is read separately, see
    /// [`ServerConfig::load_match_config`].
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new()
            .bind(&config.addr)
            .room_config(config.room.clone())
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the scenario every match on this server plays.
    pub fn match_config(mut self, config: MatchConfig) -> Self {
        self.match_config = config;
        self
    }

    /// Sets the channel sizes of the registry and its matches.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Validates the scenario and binds the listener.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    ///
    /// # Errors
    /// [`HexfrontError::Scenario`] for an unplayable scenario,
    /// [`HexfrontError::Transport`] if the address cannot be bound.
    pub async fn build(self) -> Result<HexfrontServer, HexfrontError> {
        self.match_config.validate()?;
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        Ok(HexfrontServer {
            transport,
            match_config: self.match_config,
            room_config: self.room_config,
            codec: JsonCodec,
        })
    }
}

impl Default for HexfrontServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound hexfront server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct HexfrontServer {
    transport: WebSocketTransport,
    match_config: MatchConfig,
    room_config: RoomConfig,
    codec: JsonCodec,
}

impl HexfrontServer {
    /// Creates a new builder.
    pub fn builder() -> HexfrontServerBuilder {
        HexfrontServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Starts the room registry, then accepts incoming connections and
    /// spawns a connection actor for each. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), HexfrontError> {
        let (hub, _registry) = spawn_hub(self.match_config, self.room_config.clone());
        tracing::info!("hexfront server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let hub = hub.clone();
                    let codec = self.codec;
                    let link_buffer = self.room_config.link_buffer;
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, hub, codec, link_buffer).await {
                            tracing::warn!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
