use thiserror::Error;

/// Errors that can occur while encoding or decoding a wire message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The message could not be serialized
    #[error("Failed to encode message: {reason}")]
    Encode { reason: String },

    /// The bytes are not a well-formed message
    #[error("Failed to decode message: {reason}")]
    Decode { reason: String },

    /// The peer speaks a different protocol revision
    #[error("Wire version mismatch: expected {expected}, received {actual}")]
    VersionMismatch { expected: u16, actual: u16 },
}
