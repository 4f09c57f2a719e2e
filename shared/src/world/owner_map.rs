use std::collections::HashMap;

use crate::{ConnectionId, EntityKey, OwnerEntry};

/// Two-way map between connections and the player entities they control.
/// Additions made on the server queue an [`OwnerEntry`] for the next
/// broadcast.
#[derive(Default)]
pub struct OwnerMap {
    by_connection: HashMap<ConnectionId, EntityKey>,
    by_entity: HashMap<EntityKey, ConnectionId>,
    pending: Vec<OwnerEntry>,
}

impl OwnerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `connection` to `entity`, replacing any previous mapping of
    /// either side.
    pub fn insert(&mut self, connection: ConnectionId, entity: EntityKey) {
        if let Some(old_entity) = self.by_connection.insert(connection, entity) {
            self.by_entity.remove(&old_entity);
        }
        if let Some(old_connection) = self.by_entity.insert(entity, connection) {
            if old_connection != connection {
                self.by_connection.remove(&old_connection);
            }
        }
    }

    pub fn queue_addition(&mut self, entry: OwnerEntry) {
        self.pending.push(entry);
    }

    pub fn take_pending(&mut self) -> Vec<OwnerEntry> {
        std::mem::take(&mut self.pending)
    }

    pub fn remove_connection(&mut self, connection: &ConnectionId) -> Option<EntityKey> {
        let entity = self.by_connection.remove(connection)?;
        self.by_entity.remove(&entity);
        self.pending.retain(|entry| entry.connection != *connection);
        Some(entity)
    }

    pub fn remove_entity(&mut self, entity: &EntityKey) -> Option<ConnectionId> {
        let connection = self.by_entity.remove(entity)?;
        self.by_connection.remove(&connection);
        self.pending.retain(|entry| entry.connection != connection);
        Some(connection)
    }

    pub fn entity(&self, connection: &ConnectionId) -> Option<EntityKey> {
        self.by_connection.get(connection).copied()
    }

    pub fn connection(&self, entity: &EntityKey) -> Option<ConnectionId> {
        self.by_entity.get(entity).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, EntityKey)> + '_ {
        self.by_connection
            .iter()
            .map(|(connection, entity)| (*connection, *entity))
    }

    pub fn len(&self) -> usize {
        self.by_connection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_connection.is_empty()
    }
}
