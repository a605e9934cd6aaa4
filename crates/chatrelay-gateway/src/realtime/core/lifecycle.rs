//! Lifecycle handler: per-connection state machine.
//!
//! `Connected-Unannounced -> Connected-Announced -> Disconnected`. Every
//! transition updates the presence registry first, then fans out.

use chatrelay_core::error::{RelayError, Result};
use chatrelay_core::protocol::{BroadcastEvent, ClientFrame, DirectFrame};

use crate::realtime::core::{Broadcaster, ConnectionSet, PresenceRegistry};
use crate::realtime::types::{ConnId, Connection, DeliveryReport, QoS};

/// Events a connection can drive after transport connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Join { name: String },
    Message { text: String },
    Disconnect,
}

impl From<ClientFrame> for RelayEvent {
    fn from(frame: ClientFrame) -> Self {
        match frame {
            ClientFrame::Join { name } => RelayEvent::Join { name },
            ClientFrame::Message { text } => RelayEvent::Message { text },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RelayOptions {
    pub qos: QoS,
    /// Emit `peer-joined` again when an announced connection joins again.
    pub rebroadcast_rejoin: bool,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            qos: QoS::Lossy,
            rebroadcast_rejoin: true,
        }
    }
}

/// The relay: owns presence, live connections and the broadcaster.
pub struct Relay {
    registry: PresenceRegistry,
    connections: ConnectionSet,
    broadcaster: Broadcaster,
    rebroadcast_rejoin: bool,
}

impl Default for Relay {
    fn default() -> Self {
        Self::new(RelayOptions::default())
    }
}

impl Relay {
    pub fn new(opts: RelayOptions) -> Self {
        Self {
            registry: PresenceRegistry::new(),
            connections: ConnectionSet::new(),
            broadcaster: Broadcaster::new(opts.qos),
            rebroadcast_rejoin: opts.rebroadcast_rejoin,
        }
    }

    pub fn registry(&self) -> &PresenceRegistry {
        &self.registry
    }

    pub fn connections(&self) -> &ConnectionSet {
        &self.connections
    }

    /// Transport connect. The connection can receive broadcasts right away
    /// but has no presence until it joins.
    pub fn connect(&self, conn: Connection) -> ConnId {
        let id = self.connections.connect(conn);
        tracing::debug!(conn_id = id, active = self.connections.len(), "connection opened");
        id
    }

    /// Transport connect with a welcome frame. The welcome is queued before
    /// the connection joins the fan-out set, so it is always the first frame
    /// the client sees.
    pub async fn accept(&self, conn: Connection) -> Result<ConnId> {
        let id = self.connections.allocate_id();
        self.broadcaster
            .send_direct(id, &conn, &DirectFrame::Welcome { conn_id: id })
            .await?;
        self.connections.insert(id, conn);
        tracing::debug!(conn_id = id, active = self.connections.len(), "connection opened");
        Ok(id)
    }

    /// Single entry point for everything that happens on a connection.
    ///
    /// Returns the fan-out report, or `None` when the event produced no
    /// broadcast.
    ///
    /// Events for one connection are expected in transport order (one task
    /// per connection). A `Join` racing a `Disconnect` for the same id is
    /// still rolled back so no name outlives its connection.
    pub async fn handle_event(&self, id: ConnId, event: RelayEvent) -> Result<Option<DeliveryReport>> {
        match event {
            RelayEvent::Join { name } => self.on_join(id, name).await,
            RelayEvent::Message { text } => self.on_message(id, text).await,
            RelayEvent::Disconnect => self.on_disconnect(id).await,
        }
    }

    /// Send a frame to `id` only. Unknown ids are ignored.
    pub async fn send_direct(&self, id: ConnId, frame: &DirectFrame) -> Result<()> {
        let Some(conn) = self.connections.get(id) else {
            return Ok(());
        };
        self.broadcaster.send_direct(id, &conn, frame).await
    }

    async fn on_join(&self, id: ConnId, name: String) -> Result<Option<DeliveryReport>> {
        self.ensure_connected(id)?;

        let previous = self.registry.register(id, name.clone());
        if !self.connections.contains(id) {
            self.registry.remove(id);
            return Err(RelayError::BadRequest(format!("connection {id} closed during join")));
        }
        if let Some(prev) = &previous {
            tracing::info!(conn_id = id, from = %prev, to = %name, "peer renamed");
            if !self.rebroadcast_rejoin {
                return Ok(None);
            }
        } else {
            tracing::info!(conn_id = id, name = %name, present = self.registry.len(), "peer joined");
        }

        self.fan_out(id, BroadcastEvent::PeerJoined { name }).await.map(Some)
    }

    async fn on_message(&self, id: ConnId, text: String) -> Result<Option<DeliveryReport>> {
        self.ensure_connected(id)?;

        // Unannounced senders are relayed without a name.
        let name = self.registry.lookup(id);
        tracing::debug!(conn_id = id, announced = name.is_some(), len = text.len(), "message");

        self.fan_out(id, BroadcastEvent::MessageReceived { name, text })
            .await
            .map(Some)
    }

    async fn on_disconnect(&self, id: ConnId) -> Result<Option<DeliveryReport>> {
        self.connections.disconnect(id);
        let Some(name) = self.registry.remove(id) else {
            tracing::debug!(conn_id = id, "unannounced connection closed");
            return Ok(None);
        };

        tracing::info!(conn_id = id, name = %name, present = self.registry.len(), "peer left");
        self.fan_out(id, BroadcastEvent::PeerLeft { name }).await.map(Some)
    }

    async fn fan_out(&self, origin: ConnId, event: BroadcastEvent) -> Result<DeliveryReport> {
        let peers = self.connections.snapshot();
        self.broadcaster.broadcast_except(peers, origin, &event).await
    }

    fn ensure_connected(&self, id: ConnId) -> Result<()> {
        if self.connections.contains(id) {
            Ok(())
        } else {
            Err(RelayError::BadRequest(format!("unknown connection {id}")))
        }
    }
}
