//! Top-level real-time hub tying registry, gateway, and handshake together.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::info;

use notify_auth::jwt::JwtDecoder;
use notify_core::config::RealtimeConfig;
use notify_service::NotificationEngine;

use crate::connection::{ConnectionRegistry, WsAuthenticator};
use crate::gateway::RealtimeGateway;

/// Shared real-time state handed to the WebSocket handler.
#[derive(Debug, Clone)]
pub struct RealtimeHub {
    /// Live sessions.
    pub registry: Arc<ConnectionRegistry>,
    /// Event processing.
    pub gateway: RealtimeGateway,
    /// Handshake validation.
    pub authenticator: WsAuthenticator,
    config: RealtimeConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl RealtimeHub {
    /// Creates a hub. `registry` must be the same instance the engine pushes
    /// through.
    pub fn new(
        config: RealtimeConfig,
        registry: Arc<ConnectionRegistry>,
        engine: Arc<NotificationEngine>,
        decoder: Arc<JwtDecoder>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let gateway = RealtimeGateway::new(engine, registry.clone(), config.max_message_bytes);

        info!("Real-time hub initialized");

        Self {
            registry,
            gateway,
            authenticator: WsAuthenticator::new(decoder),
            config,
            shutdown_tx,
        }
    }

    /// Interval between server pings.
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.config.ping_interval_seconds.max(1))
    }

    /// Receiver fired once on shutdown.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal shutdown and close every session.
    pub fn shutdown(&self) {
        info!("Shutting down real-time hub");
        let _ = self.shutdown_tx.send(());
        self.registry.close_all();
    }
}
