//! # Arbor Shared
//! Common functionality shared between arbor-server & arbor-client crates:
//! entity identities, the scene tree, the entity record codec, wire
//! messages, remote calls and input synchronization.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod backends;
mod bigmap;
mod codec;
mod identity;
mod input;
mod messages;
mod persistence;
mod protocol;
mod rpc;
mod scene;
mod tick;
mod types;
mod world;

pub use backends::Timer;
cfg_if! {
    if #[cfg(not(target_arch = "wasm32"))] {
        pub use backends::{TimeError, Timestamp};
        pub use persistence::FileBackend;
    }
}
pub use bigmap::{BigMap, BigMapKey};
pub use codec::{
    deserialize_entity, serialize_entity, CodecError, CodecPath, EntityRecord, Rotation,
    SpatialFields, TypeRegistry, Vector,
};
pub use identity::{IdRange, IdentityError, IdentityTable, NetworkId, FIRST_SELF_ID, ROOT_ID};
pub use input::{
    InputManager, InputMode, InputSource, InputState, InputUpdateType, ModalTracker, NoModals,
    PointerButton, PressState,
};
pub use messages::{
    ClientInputUpdate, FullServerData, NetworkMessage, OwnerEntry, RpcCall, ServerAdd,
    ServerRemove, ServerUpdate, WireError, WIRE_VERSION,
};
pub use persistence::{
    load_entity, save_entity, MemoryBackend, PersistenceError, SaveBackend, SaveRecord,
};
pub use protocol::{Protocol, ProtocolError, ProtocolPlugin};
pub use rpc::{
    arg, FromRpcValue, RpcDispatcher, RpcError, RpcHandler, RpcMethods, RpcOutcome, RpcTarget,
    RpcValue,
};
pub use scene::{
    names::{groups, meta},
    Behavior, BehaviorError, EntityKey, Node, Persistable, Replicable, Scene, SceneError,
    SceneListener, Spatial, SpatialKind, Transform2D, Transform3D, UiTransform,
};
pub use tick::TickStage;
pub use types::{ConnectionId, HostType};
pub use world::{
    AddOptions, NetworkWorld, OwnerMap, ReplicationRegistry, ReplicationScheduler, UpdateOutcome,
    WorldError,
};

pub use glam::{Vec2, Vec3};
pub use serde_json::{json, Value};
