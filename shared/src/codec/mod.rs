mod entity_codec;
mod error;
mod record;
mod type_registry;

pub(crate) use entity_codec::{is_reachable, is_skipped};
pub use entity_codec::{deserialize_entity, serialize_entity, CodecPath};
pub use error::CodecError;
pub use record::{EntityRecord, Rotation, SpatialFields, Vector};
pub use type_registry::TypeRegistry;
