use thiserror::Error;

use crate::{HostType, NetworkId};

/// Errors that can occur while issuing or executing a remote call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The calling entity does not exist in the scene
    #[error("Rpc caller entity not found")]
    CallerNotFound,

    /// The calling entity was never given an identity
    #[error("Rpc caller `{name}` has no identity")]
    CallerHasNoIdentity { name: String },

    /// Process-local entities cannot be named on the wire
    #[error("Rpc caller {id} is a self-only entity")]
    SelfOnlyCaller { id: NetworkId },

    /// No handler is registered for the method on the target's type
    #[error("No rpc method `{method}` on type `{type_tag}`")]
    UnknownMethod { type_tag: String, method: String },

    /// The handler's downcast to its behavior failed
    #[error("Rpc method `{method}` expects behavior `{expected}` but the entity declares `{actual}`")]
    BehaviorMismatch {
        method: String,
        expected: &'static str,
        actual: String,
    },

    #[error("Rpc argument {index} is missing")]
    MissingArgument { index: usize },

    #[error("Rpc argument {index} should be {expected} but is {actual}")]
    ArgumentType {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// The call target is not reachable from this role
    #[error("Rpc to {target} is not available on the {host_type}")]
    UsageError {
        target: &'static str,
        host_type: HostType,
    },
}
