use dashmap::DashMap;

use crate::realtime::types::ConnId;

/// Presence: `conn_id -> display name`.
///
/// An entry exists iff the connection has announced a name and has not yet
/// disconnected. Names are not unique across connections.
#[derive(Default)]
pub struct PresenceRegistry {
    names: DashMap<ConnId, String>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self { names: DashMap::new() }
    }

    /// Insert or overwrite. Returns the previous name, if any.
    pub fn register(&self, conn_id: ConnId, name: impl Into<String>) -> Option<String> {
        self.names.insert(conn_id, name.into())
    }

    pub fn lookup(&self, conn_id: ConnId) -> Option<String> {
        self.names.get(&conn_id).map(|r| r.value().clone())
    }

    /// Delete and return the prior name. Safe on connections that never announced.
    pub fn remove(&self, conn_id: ConnId) -> Option<String> {
        self.names.remove(&conn_id).map(|(_, name)| name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
