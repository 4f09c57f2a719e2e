use thiserror::Error;

use crate::{CodecError, IdentityError, SceneError};

/// Errors that can occur while writing or restoring a save record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Nothing is stored under the path
    #[error("No save record at `{path}`")]
    NotFound { path: String },

    /// The backend failed to read or write
    #[error("Save backend failed at `{path}`: {reason}")]
    Io { path: String, reason: String },

    /// The record could not be (de)serialized
    #[error("Malformed save record at `{path}`: {reason}")]
    Malformed { path: String, reason: String },

    /// The stored content hash does not match the record. Reported, never
    /// repaired.
    #[error("Save record at `{path}` does not match its content hash")]
    SchemaMismatch { path: String },

    /// The skip rules exclude the entity from save records
    #[error("Entity is excluded from save records")]
    NotPersistable,

    #[error("Failed to read the wall clock")]
    Clock,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}
