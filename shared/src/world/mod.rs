mod error;
mod network_world;
mod owner_map;
mod replication_registry;
mod replication_scheduler;

pub use error::WorldError;
pub use network_world::{AddOptions, NetworkWorld, UpdateOutcome};
pub use owner_map::OwnerMap;
pub use replication_registry::ReplicationRegistry;
pub use replication_scheduler::ReplicationScheduler;
