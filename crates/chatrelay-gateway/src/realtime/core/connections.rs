use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::realtime::types::{ConnId, Connection};

/// A connection captured in a fan-out snapshot.
#[derive(Debug, Clone)]
pub struct Peer {
    pub id: ConnId,
    pub conn: Connection,
}

/// Every live transport connection, announced or not.
pub struct ConnectionSet {
    conns: DashMap<ConnId, Connection>,
    seq: AtomicU64,
}

impl Default for ConnectionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self {
            conns: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    /// Register a new connection and assign its id.
    pub fn connect(&self, conn: Connection) -> ConnId {
        let id = self.allocate_id();
        self.insert(id, conn);
        id
    }

    /// Reserve an id without making the connection visible to snapshots.
    pub fn allocate_id(&self) -> ConnId {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Make a connection with a previously allocated id visible to fan-out.
    pub fn insert(&self, id: ConnId, conn: Connection) {
        self.conns.insert(id, conn);
    }

    pub fn disconnect(&self, id: ConnId) -> Option<Connection> {
        self.conns.remove(&id).map(|(_, conn)| conn)
    }

    pub fn get(&self, id: ConnId) -> Option<Connection> {
        self.conns.get(&id).map(|r| r.value().clone())
    }

    pub fn contains(&self, id: ConnId) -> bool {
        self.conns.contains_key(&id)
    }

    /// Point-in-time copy of the live connections, used for one fan-out.
    pub fn snapshot(&self) -> Vec<Peer> {
        self.conns
            .iter()
            .map(|r| Peer {
                id: *r.key(),
                conn: r.value().clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn conn() -> Connection {
        let (tx, _rx) = mpsc::channel(1);
        Connection::new(tx)
    }

    #[test]
    fn ids_are_never_reused() {
        let set = ConnectionSet::new();
        let a = set.connect(conn());
        set.disconnect(a);
        let b = set.connect(conn());
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn allocated_id_is_invisible_until_inserted() {
        let set = ConnectionSet::new();
        let id = set.allocate_id();
        assert!(!set.contains(id));
        assert!(set.snapshot().is_empty());

        set.insert(id, conn());
        assert!(set.contains(id));
        assert_ne!(set.connect(conn()), id);
    }

    #[test]
    fn snapshot_reflects_live_connections() {
        let set = ConnectionSet::new();
        let a = set.connect(conn());
        let b = set.connect(conn());
        set.disconnect(a);

        let ids: Vec<ConnId> = set.snapshot().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![b]);
        assert!(!set.contains(a));
        assert_eq!(set.len(), 1);
    }
}
