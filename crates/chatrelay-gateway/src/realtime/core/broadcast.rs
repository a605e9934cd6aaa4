use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use tokio::time::Duration;

use chatrelay_core::error::Result;
use chatrelay_core::protocol::{BroadcastEvent, DirectFrame};

use crate::realtime::core::Peer;
use crate::realtime::types::{ConnId, Connection, DeliveryError, DeliveryReport, PreparedMsg, QoS};

/// Fan-out engine: serialize once, one delivery attempt per peer.
#[derive(Debug, Clone, Default)]
pub struct Broadcaster {
    qos: QoS,
}

impl Broadcaster {
    pub fn new(qos: QoS) -> Self {
        Self { qos }
    }

    /// Deliver `event` to every peer in the snapshot except `origin`.
    ///
    /// A failing recipient never stops the rest of the fan-out, and nothing
    /// is buffered for retry.
    pub async fn broadcast_except(
        &self,
        peers: Vec<Peer>,
        origin: ConnId,
        event: &BroadcastEvent,
    ) -> Result<DeliveryReport> {
        let prepared = PreparedMsg::new(event.to_json()?);
        let targets = peers.into_iter().filter(|p| p.id != origin);

        let mut report = DeliveryReport::default();
        match self.qos {
            QoS::Lossy => {
                for peer in targets {
                    let res = peer.conn.try_deliver(&prepared);
                    log_failure(peer.id, &res);
                    report.record(res);
                }
            }
            QoS::Reliable { timeout_ms } => {
                let wait = Duration::from_millis(timeout_ms);
                let mut futs = FuturesUnordered::new();
                for peer in targets {
                    let msg = &prepared;
                    futs.push(async move { (peer.id, peer.conn.deliver(msg, wait).await) });
                }
                while let Some((id, res)) = futs.next().await {
                    log_failure(id, &res);
                    report.record(res);
                }
            }
        }

        if report.failed > 0 {
            tracing::warn!(
                kind = event.kind(),
                attempted = report.attempted,
                failed = report.failed,
                "broadcast had undelivered recipients"
            );
        }
        Ok(report)
    }

    /// Send a frame to one connection only (welcome / error).
    /// Delivery failures are logged, not returned.
    pub async fn send_direct(&self, id: ConnId, conn: &Connection, frame: &DirectFrame) -> Result<()> {
        let prepared = PreparedMsg::new(frame.to_json()?);
        let res = match self.qos {
            QoS::Lossy => conn.try_deliver(&prepared),
            QoS::Reliable { timeout_ms } => {
                conn.deliver(&prepared, Duration::from_millis(timeout_ms)).await
            }
        };
        log_failure(id, &res);
        Ok(())
    }
}

fn log_failure(id: ConnId, res: &std::result::Result<(), DeliveryError>) {
    if let Err(e) = res {
        tracing::debug!(conn_id = id, error = %e, "delivery failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn peer(id: ConnId, cap: usize) -> (Peer, mpsc::Receiver<PreparedMsg>) {
        let (tx, rx) = mpsc::channel(cap);
        (Peer { id, conn: Connection::new(tx) }, rx)
    }

    fn joined(name: &str) -> BroadcastEvent {
        BroadcastEvent::PeerJoined { name: name.into() }
    }

    #[tokio::test]
    async fn origin_is_skipped() {
        let (p1, mut rx1) = peer(1, 4);
        let (p2, mut rx2) = peer(2, 4);
        let b = Broadcaster::new(QoS::Lossy);

        let report = b.broadcast_except(vec![p1, p2], 1, &joined("A")).await.ok();
        assert_eq!(
            report,
            Some(DeliveryReport { attempted: 1, delivered: 1, failed: 0 })
        );
        assert!(rx1.try_recv().is_err());
        let got = rx2.try_recv().ok();
        assert_eq!(got.as_ref().map(PreparedMsg::as_str), Some(r#"{"type":"peer-joined","name":"A"}"#));
    }

    #[tokio::test]
    async fn one_failed_recipient_does_not_stop_fanout() {
        let (closed, rx_closed) = peer(2, 4);
        drop(rx_closed);
        let (full, _rx_full) = peer(3, 1);
        assert!(full.conn.try_deliver(&PreparedMsg::new("filler")).is_ok());
        let (ok, mut rx_ok) = peer(4, 4);

        let b = Broadcaster::new(QoS::Lossy);
        let report = b
            .broadcast_except(vec![closed, full, ok], 1, &joined("A"))
            .await
            .ok();
        assert_eq!(
            report,
            Some(DeliveryReport { attempted: 3, delivered: 1, failed: 2 })
        );
        assert!(rx_ok.try_recv().is_ok());
    }

    #[tokio::test]
    async fn reliable_mode_times_out_per_recipient() {
        let (full, _rx_full) = peer(2, 1);
        assert!(full.conn.try_deliver(&PreparedMsg::new("filler")).is_ok());
        let (ok, mut rx_ok) = peer(3, 4);

        let b = Broadcaster::new(QoS::Reliable { timeout_ms: 20 });
        let report = b.broadcast_except(vec![full, ok], 1, &joined("A")).await.ok();
        assert_eq!(
            report,
            Some(DeliveryReport { attempted: 2, delivered: 1, failed: 1 })
        );
        assert!(rx_ok.try_recv().is_ok());
    }
}
