use thiserror::Error;

/// Sends encoded messages to the server
pub trait PacketSender: Send + Sync {
    /// Sends a packet to the server
    fn send(&self, payload: &[u8]) -> Result<(), SendError>;
}

/// Receives encoded messages from the server
pub trait PacketReceiver: Send + Sync {
    /// Receives the next waiting packet, if any
    fn receive(&mut self) -> Result<Option<Vec<u8>>, RecvError>;
}

/// Error that can occur when sending a packet to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the transport could not send the packet")]
pub struct SendError;

/// Error that can occur when receiving a packet from the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the transport could not receive a packet")]
pub struct RecvError;
