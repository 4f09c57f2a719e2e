use std::default::Default;

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Number of peers, counting the server itself, that must be present
    /// before periodic updates are broadcast.
    pub min_connected_peers: usize,
    /// Determines whether a freshly accepted connection is sent the full
    /// snapshot straight away, rather than waiting for it to ask.
    pub full_sync_on_connect: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            min_connected_peers: 2,
            full_sync_on_connect: true,
        }
    }
}
