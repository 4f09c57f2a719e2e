//! # Arbor Client
//! The replica side of an arbor session: mirrors the server's scene graph
//! from snapshots and updates, keeps self entities local, and sends remote
//! calls and input state to the server.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod transport;
pub mod shared {
    pub use arbor_shared::{
        ConnectionId, EntityKey, InputMode, InputSource, NetworkId, Node, Protocol, RpcValue,
    };
}

mod client;
mod client_config;
mod error;
mod events;

pub use client::Client;
pub use client_config::ClientConfig;
pub use error::ArborClientError;
pub use events::{ClientEvent, ClientEvents};
