use arbor_shared::ConnectionId;
use thiserror::Error;

/// Sends encoded messages to connected clients
pub trait PacketSender: Send + Sync {
    /// Sends a packet to the client behind `connection`
    fn send(&self, connection: &ConnectionId, payload: &[u8]) -> Result<(), SendError>;
}

/// Receives encoded messages from connected clients
pub trait PacketReceiver: Send + Sync {
    /// Receives the next waiting packet, if any
    fn receive(&mut self) -> Result<Option<(ConnectionId, Vec<u8>)>, RecvError>;
}

/// Error that can occur when sending a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the transport could not send the packet")]
pub struct SendError;

/// Error that can occur when receiving a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the transport could not receive a packet")]
pub struct RecvError;
