use std::any::Any;

use serde_json::Value;

use super::BehaviorError;

/// Script attached to an entity. Its `type_tag` is the entity's declared
/// type on the wire, and is the key a [`TypeRegistry`](crate::TypeRegistry)
/// uses to re-create it.
pub trait Behavior: Any + Send {
    fn type_tag(&self) -> &'static str;

    fn replicable(&self) -> Option<&dyn Replicable> {
        None
    }

    fn replicable_mut(&mut self) -> Option<&mut dyn Replicable> {
        None
    }

    fn persistable(&self) -> Option<&dyn Persistable> {
        None
    }

    fn persistable_mut(&mut self) -> Option<&mut dyn Persistable> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// State streamed from the server to clients.
///
/// `write_network` always produces the full payload. Whether it is sent is
/// decided by the owning [`Node`](crate::Node)'s dirty flag, so
/// implementations never track dirtiness themselves.
pub trait Replicable {
    fn write_network(&self) -> Value;

    fn read_network(&mut self, payload: &Value) -> Result<(), BehaviorError>;
}

/// State written to and restored from save records.
pub trait Persistable {
    fn write_save(&self) -> Value;

    fn read_save(&mut self, payload: &Value) -> Result<(), BehaviorError>;
}
