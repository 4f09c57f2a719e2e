use arbor_shared::ConnectionId;

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// The connection id the server assigned to this client. The player
    /// entity is the one whose `OwnerId` matches it.
    pub connection: ConnectionId,
}

impl ClientConfig {
    pub fn new(connection: ConnectionId) -> Self {
        Self { connection }
    }
}
