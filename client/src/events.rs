use std::vec::IntoIter;

use arbor_shared::{EntityKey, NetworkId};

use crate::ArborClientError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    /// The first (or a forced) full snapshot was merged
    FullSyncReceived,
    /// A server subtree was materialized under its owner
    EntityAdded(EntityKey),
    /// A server subtree was despawned
    EntityRemoved(NetworkId),
    /// A server update was applied to this many entities
    EntitiesUpdated(usize),
    /// A server update referenced an unknown entity and was dropped
    UpdateDropped { missing: NetworkId },
    RpcInvoked { caller: NetworkId, method: String },
    RpcDropped { caller: NetworkId, method: String },
    /// A message from the server could not be applied; later messages in
    /// the same drain still were
    MessageFailed {
        message: &'static str,
        error: ArborClientError,
    },
    /// The update interval elapsed
    NetworkUpdateElapsed,
}

pub struct ClientEvents {
    events: Vec<ClientEvent>,
}

impl ClientEvents {
    pub(crate) fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub(crate) fn push(&mut self, event: ClientEvent) {
        self.events.push(event);
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClientEvent> {
        self.events.iter()
    }

    pub fn contains(&self, event: &ClientEvent) -> bool {
        self.events.contains(event)
    }
}

impl IntoIterator for ClientEvents {
    type Item = ClientEvent;
    type IntoIter = IntoIter<ClientEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
