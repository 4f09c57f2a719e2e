mod error;
mod network_message;

pub use error::WireError;
pub use network_message::{
    ClientInputUpdate, FullServerData, NetworkMessage, OwnerEntry, RpcCall, ServerAdd,
    ServerRemove, ServerUpdate, WIRE_VERSION,
};
