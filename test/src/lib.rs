//! In-process harness for arbor: a local packet hub standing in for the
//! network, a sample protocol, and helpers that drive a server and its
//! clients through ticks.

pub mod helpers;
pub mod local_socket;
pub mod test_protocol;

pub use helpers::*;
pub use local_socket::LocalHub;
pub use test_protocol::{protocol, Counter, Sun};
