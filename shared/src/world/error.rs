use thiserror::Error;

use crate::{CodecError, HostType, IdentityError, SceneError};

/// Errors that can occur while mutating the replicated world
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The operation belongs to the other role. Never retried.
    #[error("{operation} is not available on the {host_type}")]
    Usage {
        operation: &'static str,
        host_type: HostType,
    },

    /// The entity must carry an identity for this operation
    #[error("Entity `{name}` has no identity")]
    Unidentified { name: String },

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
