use std::vec::IntoIter;

use arbor_shared::{ConnectionId, NetworkId, RpcError};

/// Something the server observed while draining incoming messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    /// A client-issued call ran against `caller`
    RpcInvoked { caller: NetworkId, method: String },
    /// A client-issued call named an unknown caller and was dropped
    RpcDropped { caller: NetworkId, method: String },
    /// A client-issued call was refused by its handler table or failed
    RpcFailed {
        caller: NetworkId,
        method: String,
        error: RpcError,
    },
    /// Remote input for `player` was applied
    InputUpdated { player: NetworkId },
    /// `connection` asked for a resync and was sent a fresh snapshot
    ForceUpdateRequested { connection: ConnectionId },
}

pub struct ServerEvents {
    events: Vec<ServerEvent>,
}

impl ServerEvents {
    pub(crate) fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub(crate) fn push(&mut self, event: ServerEvent) {
        self.events.push(event);
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServerEvent> {
        self.events.iter()
    }

    pub fn has_input_from(&self, player: &NetworkId) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, ServerEvent::InputUpdated { player: p } if p == player))
    }
}

impl IntoIterator for ServerEvents {
    type Item = ServerEvent;
    type IntoIter = IntoIter<ServerEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
