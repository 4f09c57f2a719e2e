use super::{EntityKey, Scene};

/// Receives add/remove notifications for server and self entities, e.g. a
/// level-partition tracker or a UI layer. Both hooks run while the entity
/// is still attached.
pub trait SceneListener {
    fn entity_added(&mut self, _scene: &mut Scene, _parent: EntityKey, _entity: EntityKey) {}

    fn entity_removed(&mut self, _scene: &mut Scene, _entity: EntityKey) {}
}
