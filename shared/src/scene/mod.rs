mod behavior;
mod error;
mod listener;
mod node;
mod scene;
mod spatial;

pub mod names;

pub use behavior::{Behavior, Persistable, Replicable};
pub use error::{BehaviorError, SceneError};
pub use listener::SceneListener;
pub use node::Node;
pub use scene::{EntityKey, Scene};
pub use spatial::{Spatial, SpatialKind, Transform2D, Transform3D, UiTransform};
