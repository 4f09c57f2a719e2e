use arbor_shared::{RpcError, WireError, WorldError};
use thiserror::Error;

use crate::transport::{RecvError, SendError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArborClientError {
    /// A scene, identity or codec operation failed
    #[error(transparent)]
    World(#[from] WorldError),

    /// A remote call could not be queued or executed
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// An outgoing message could not be encoded
    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("could not send to the server")]
    Send,

    #[error("the transport failed while receiving")]
    Recv,
}

impl From<SendError> for ArborClientError {
    fn from(_: SendError) -> Self {
        ArborClientError::Send
    }
}

impl From<RecvError> for ArborClientError {
    fn from(_: RecvError) -> Self {
        ArborClientError::Recv
    }
}
