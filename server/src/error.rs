use arbor_shared::{ConnectionId, RpcError, WireError, WorldError};
use thiserror::Error;

use crate::transport::RecvError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArborServerError {
    /// A scene, identity or codec operation failed
    #[error(transparent)]
    World(#[from] WorldError),

    /// A remote call could not be queued or executed
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// An outgoing message could not be encoded
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The transport refused a packet for `connection`
    #[error("could not send to connection {connection}")]
    Send { connection: ConnectionId },

    /// The transport failed while receiving
    #[error("the transport failed while receiving")]
    Recv,

    /// `connection` was never accepted
    #[error("connection {connection} is not accepted")]
    UnknownConnection { connection: ConnectionId },
}

impl From<RecvError> for ArborServerError {
    fn from(_: RecvError) -> Self {
        ArborServerError::Recv
    }
}
