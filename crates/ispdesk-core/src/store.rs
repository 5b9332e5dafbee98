// ── Connection store ──
//
// Ordered list of connections with an id index. Order matters: the
// projector derives codes and synthetic placeholders from list position.
// Entries are replaced wholesale on refresh or appended; never removed.

use std::collections::HashMap;

use tracing::debug;

use crate::error::CoreError;
use crate::model::{Connection, ConnectionId, ConnectionStatus};

#[derive(Debug, Clone, Default)]
pub struct ConnectionStore {
    items: Vec<Connection>,
    by_id: HashMap<ConnectionId, usize>,
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a fetched list. Duplicate ids keep their first occurrence.
    pub fn from_connections(connections: Vec<Connection>) -> Self {
        let mut store = Self::new();
        store.replace_all(connections);
        store
    }

    /// Replace the whole list (refresh).
    pub fn replace_all(&mut self, connections: Vec<Connection>) {
        self.items.clear();
        self.by_id.clear();
        for conn in connections {
            if self.by_id.contains_key(&conn.id) {
                debug!(id = %conn.id, "dropping duplicate connection id");
                continue;
            }
            self.by_id.insert(conn.id.clone(), self.items.len());
            self.items.push(conn);
        }
    }

    /// Append a newly provisioned connection.
    pub fn push(&mut self, conn: Connection) -> Result<(), CoreError> {
        if self.by_id.contains_key(&conn.id) {
            return Err(CoreError::ValidationFailed {
                message: format!("connection '{}' already exists", conn.id),
            });
        }
        self.by_id.insert(conn.id.clone(), self.items.len());
        self.items.push(conn);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Connection> {
        self.by_id.get(id).and_then(|&i| self.items.get(i))
    }

    /// Position of a connection in list order.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Returns `true` if the status actually changed.
    pub fn set_status(&mut self, id: &str, status: ConnectionStatus) -> bool {
        let Some(conn) = self.by_id.get(id).and_then(|&i| self.items.get_mut(i)) else {
            return false;
        };
        let changed = conn.status != status;
        conn.status = status;
        changed
    }

    pub fn as_slice(&self) -> &[Connection] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
