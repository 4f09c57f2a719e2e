use thiserror::Error;

use super::NetworkId;

/// Errors raised while allocating or resolving entity identities
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Every id below the self range has been handed out
    #[error("Server identity range exhausted")]
    ServerRangeExhausted,

    /// Every id in the self range has been handed out
    #[error("Self identity range exhausted")]
    SelfRangeExhausted,

    /// No live entity holds the id
    #[error("No entity holds identity {id}")]
    NotFound { id: NetworkId },

    /// The id is already indexed for another live entity
    #[error("Identity {id} is already held by another entity")]
    AlreadyIndexed { id: NetworkId },

    /// A process-local id was about to be used as a cross-network reference
    #[error("Identity {id} is in the self range and cannot be referenced across the network")]
    SelfIdentityOnWire { id: NetworkId },
}
