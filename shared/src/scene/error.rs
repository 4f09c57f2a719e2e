use thiserror::Error;

use super::EntityKey;

/// Errors that can occur while mutating the scene tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// The key does not name a live entity
    #[error("Entity not found: {context}")]
    EntityNotFound { context: &'static str },

    /// The child already has a parent and must be detached first
    #[error("Entity {child:?} is already attached to a parent")]
    AlreadyAttached { child: EntityKey },

    /// Attaching would make an entity its own ancestor
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle { parent: EntityKey, child: EntityKey },

    /// The scene root lives as long as the scene
    #[error("The scene root cannot be detached or despawned")]
    RootIsPermanent,
}

/// Errors raised by capability hooks while reading a payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BehaviorError {
    #[error("Malformed behavior payload: {reason}")]
    Payload { reason: String },

    #[error("Invalid behavior state: {reason}")]
    Invalid { reason: String },
}

impl From<serde_json::Error> for BehaviorError {
    fn from(error: serde_json::Error) -> Self {
        BehaviorError::Payload {
            reason: error.to_string(),
        }
    }
}
