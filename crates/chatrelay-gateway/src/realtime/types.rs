use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{timeout, Duration};

/// Transport-assigned connection id. Monotonic, never reused within a process.
pub type ConnId = u64;

/// Quality-of-Service strategy for outgoing delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QoS {
    /// Do not await; if the recipient's queue is full, drop.
    #[default]
    Lossy,
    /// Await queue space, bounded by a per-recipient timeout.
    Reliable { timeout_ms: u64 },
}

/// Message serialized once and shared by every recipient of a fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedMsg(Arc<str>);

impl PreparedMsg {
    pub fn new(s: impl Into<Arc<str>>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Why a single recipient did not get a message. Never surfaced to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("outbound queue full")]
    QueueFull,
    #[error("connection closed")]
    Closed,
    #[error("delivery timed out")]
    Timeout,
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl DeliveryReport {
    pub(crate) fn record(&mut self, res: std::result::Result<(), DeliveryError>) {
        self.attempted += 1;
        match res {
            Ok(()) => self.delivered += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// One connection's outbound queue sender.
#[derive(Debug, Clone)]
pub struct Connection {
    tx: mpsc::Sender<PreparedMsg>,
}

impl Connection {
    pub fn new(tx: mpsc::Sender<PreparedMsg>) -> Self {
        Self { tx }
    }

    /// Non-blocking enqueue.
    pub fn try_deliver(&self, msg: &PreparedMsg) -> std::result::Result<(), DeliveryError> {
        self.tx.try_send(msg.clone()).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::QueueFull,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// Enqueue, waiting at most `wait` for queue space.
    pub async fn deliver(&self, msg: &PreparedMsg, wait: Duration) -> std::result::Result<(), DeliveryError> {
        timeout(wait, self.tx.send(msg.clone()))
            .await
            .map_err(|_| DeliveryError::Timeout)?
            .map_err(|_| DeliveryError::Closed)
    }
}
