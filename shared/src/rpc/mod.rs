mod error;
mod rpc_dispatcher;
mod rpc_methods;
mod rpc_value;

pub use error::RpcError;
pub use rpc_dispatcher::{RpcDispatcher, RpcOutcome, RpcTarget};
pub use rpc_methods::{RpcHandler, RpcMethods};
pub use rpc_value::{arg, FromRpcValue, RpcValue};
