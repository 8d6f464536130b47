//! Transport boundary: opaque message identifiers, the byte-channel seam the
//! codec writes into, and the cluster health latch the non-stop executor
//! consults.
//!
//! The transport itself (framing, reconnect, retry) is a collaborator, not
//! part of this crate. Health transitions use `ArcSwap` so operation paths
//! read the latch lock-free; shutdown is broadcast over a `watch` channel
//! that pending waits select on.

use std::sync::Arc;

use arc_swap::ArcSwap;
use bytes::Bytes;
use tokio::sync::watch;

/// Wire message type discriminator, assigned by the transport's message
/// catalog. Opaque to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageType(pub u16);

/// Identifies the client's session with the cluster coordination tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// Identifies the channel a message travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

/// Framing header accompanying every message body. Populated by the
/// transport; this crate only carries it through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Discriminator for the concrete message type.
    pub message_type: MessageType,
    /// Session the message belongs to.
    pub session: SessionId,
    /// Channel the message travels on.
    pub channel: ChannelId,
}

/// Error returned when handing a message to the transport fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The channel to the cluster has been closed.
    #[error("transport channel disconnected")]
    Disconnected,
    /// The transport could not accept the message in time.
    #[error("transport send timed out")]
    Timeout,
}

/// "A place to write bytes": the only thing the client core requires from
/// the transport, plus the identifiers it stamps on outgoing messages.
pub trait MessageChannel: Send + Sync {
    /// Session this channel is bound to.
    fn session(&self) -> SessionId;

    /// Channel identifier assigned by the transport.
    fn channel(&self) -> ChannelId;

    /// Hands one encoded message body to the transport.
    ///
    /// # Errors
    ///
    /// Returns a [`SendError`] if the transport cannot deliver.
    fn send(&self, header: MessageHeader, body: Bytes) -> Result<(), SendError>;
}

/// Reachability of the cluster coordination tier, as reported by the
/// transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterHealth {
    /// Operations flow normally.
    Connected,
    /// The cluster is not answering; non-stop policies govern waits.
    Unreachable,
    /// The client is shutting down; pending waits must resolve.
    Stopped,
}

/// Lock-free cluster health latch with a shutdown broadcast.
///
/// The transport flips the latch on connect/disconnect events; operation
/// paths read it on every call, so reads must never contend. Triggering
/// shutdown resolves every pending non-stop wait through the same
/// substitution path as a timeout.
#[derive(Debug)]
pub struct ClusterStatus {
    health: ArcSwap<ClusterHealth>,
    shutdown: watch::Sender<bool>,
}

impl ClusterStatus {
    /// Creates a latch in the `Connected` state.
    #[must_use]
    pub fn new() -> Self {
        let (shutdown, _rx) = watch::channel(false);
        Self {
            health: ArcSwap::from_pointee(ClusterHealth::Connected),
            shutdown,
        }
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> ClusterHealth {
        **self.health.load()
    }

    /// Marks the cluster reachable again.
    pub fn set_connected(&self) {
        self.health.store(Arc::new(ClusterHealth::Connected));
    }

    /// Marks the cluster unreachable.
    pub fn set_unreachable(&self) {
        self.health.store(Arc::new(ClusterHealth::Unreachable));
    }

    /// Initiates shutdown: flips the latch to `Stopped` and signals every
    /// pending wait.
    pub fn trigger_shutdown(&self) {
        self.health.store(Arc::new(ClusterHealth::Stopped));
        // Ignore send errors -- receivers may have been dropped.
        let _ = self.shutdown.send(true);
    }

    /// Whether shutdown has been triggered.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// A receiver that resolves when shutdown is triggered. Pending
    /// non-stop waits select on this alongside their operation future.
    #[must_use]
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }
}

impl Default for ClusterStatus {
    fn default() -> Self {
        Self::new()
    }
}
