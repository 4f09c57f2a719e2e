//! # Arbor Server
//! The authoritative side of an arbor session: owns the replicated scene,
//! hands out server identities, announces entities to accepted
//! connections, broadcasts periodic updates and executes remote calls sent
//! by clients.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod transport;
pub mod shared {
    pub use arbor_shared::{
        AddOptions, ConnectionId, EntityKey, InputMode, InputSource, NetworkId, Node, Protocol,
        RpcValue,
    };
}

mod error;
mod events;
mod server;
mod server_config;

pub use error::ArborServerError;
pub use events::{ServerEvent, ServerEvents};
pub use server::Server;
pub use server_config::ServerConfig;
