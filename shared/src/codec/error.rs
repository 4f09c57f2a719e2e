use thiserror::Error;

use crate::{BehaviorError, SceneError, SpatialKind};

/// Errors raised while materializing an entity from a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The concrete type is not registered
    #[error("Unknown node type `{type_name}`")]
    UnknownType { type_name: String },

    /// The declared type names a behavior that is not registered
    #[error("Unknown behavior `{type_tag}` declared by `{name}`")]
    UnknownBehavior { type_tag: String, name: String },

    /// A field the concrete type's transform requires is absent
    #[error("Record `{name}` of kind {kind:?} is missing field `{field}`")]
    MissingField {
        name: String,
        kind: SpatialKind,
        field: &'static str,
    },

    /// A field is present but has the wrong shape
    #[error("Record `{name}` has a malformed `{field}` field")]
    MalformedField { name: String, field: &'static str },

    /// The `UniqueId` metadata is not a decimal id
    #[error("Record `{name}` carries a malformed identity `{value}`")]
    MalformedIdentity { name: String, value: String },

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}
