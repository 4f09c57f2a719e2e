use std::collections::BTreeMap;

use serde_json::Value;

use crate::NetworkId;

use super::{Behavior, EntityKey, Spatial, Transform2D, Transform3D, UiTransform};

/// One entity of the scene tree.
///
/// Parent and child links are maintained by [`Scene`](super::Scene); a
/// freshly built `Node` is always detached.
pub struct Node {
    name: String,
    concrete_type: String,
    spatial: Spatial,
    id: Option<NetworkId>,
    meta: BTreeMap<String, String>,
    groups: Vec<String>,
    behavior: Option<Box<dyn Behavior>>,
    dirty: bool,
    pub(super) parent: Option<EntityKey>,
    pub(super) children: Vec<EntityKey>,
}

impl Node {
    pub fn new(name: impl Into<String>, concrete_type: impl Into<String>, spatial: Spatial) -> Self {
        Self {
            name: name.into(),
            concrete_type: concrete_type.into(),
            spatial,
            id: None,
            meta: BTreeMap::new(),
            groups: Vec::new(),
            behavior: None,
            dirty: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn plain(name: impl Into<String>) -> Self {
        Self::new(name, "Node", Spatial::None)
    }

    pub fn node_2d(name: impl Into<String>, transform: Transform2D) -> Self {
        Self::new(name, "Node2D", Spatial::TwoD(transform))
    }

    pub fn control(name: impl Into<String>, transform: UiTransform) -> Self {
        Self::new(name, "Control", Spatial::Ui(transform))
    }

    pub fn node_3d(name: impl Into<String>, transform: Transform3D) -> Self {
        Self::new(name, "Node3D", Spatial::ThreeD(transform))
    }

    pub fn with_behavior<B: Behavior>(mut self, behavior: B) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_meta(key, value);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.add_group(group);
        self
    }

    // Identity

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn concrete_type(&self) -> &str {
        &self.concrete_type
    }

    /// The behavior's tag when one is attached, the concrete type otherwise.
    pub fn declared_type(&self) -> &str {
        match &self.behavior {
            Some(behavior) => behavior.type_tag(),
            None => &self.concrete_type,
        }
    }

    pub fn id(&self) -> Option<NetworkId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: NetworkId) {
        self.id = Some(id);
    }

    // Spatial

    pub fn spatial(&self) -> &Spatial {
        &self.spatial
    }

    pub fn spatial_mut(&mut self) -> &mut Spatial {
        &mut self.spatial
    }

    // Metadata

    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    pub fn get_meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.meta.insert(key.into(), value.into());
    }

    pub fn remove_meta(&mut self, key: &str) -> Option<String> {
        self.meta.remove(key)
    }

    // Groups

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    pub fn add_group(&mut self, group: impl Into<String>) {
        let group = group.into();
        if !self.in_group(&group) {
            self.groups.push(group);
        }
    }

    pub fn remove_group(&mut self, group: &str) {
        self.groups.retain(|g| g != group);
    }

    // Behavior

    pub fn behavior(&self) -> Option<&dyn Behavior> {
        self.behavior.as_deref()
    }

    pub fn behavior_mut(&mut self) -> Option<&mut (dyn Behavior + 'static)> {
        self.behavior.as_deref_mut()
    }

    pub fn behavior_as<B: Behavior>(&self) -> Option<&B> {
        self.behavior
            .as_deref()
            .and_then(|behavior| behavior.as_any().downcast_ref::<B>())
    }

    pub fn behavior_as_mut<B: Behavior>(&mut self) -> Option<&mut B> {
        self.behavior
            .as_deref_mut()
            .and_then(|behavior| behavior.as_any_mut().downcast_mut::<B>())
    }

    pub fn set_behavior(&mut self, behavior: Box<dyn Behavior>) {
        self.behavior = Some(behavior);
    }

    pub fn is_replicable(&self) -> bool {
        self.behavior
            .as_deref()
            .is_some_and(|behavior| behavior.replicable().is_some())
    }

    pub fn is_persistable(&self) -> bool {
        self.behavior
            .as_deref()
            .is_some_and(|behavior| behavior.persistable().is_some())
    }

    // Replication

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replicable payload for the next broadcast.
    ///
    /// Returns `None` for non-replicable entities, and for clean ones unless
    /// `force` is set. A read clears the dirty flag unless `keep_dirty` is set.
    pub fn network_delta(&mut self, force: bool, keep_dirty: bool) -> Option<Value> {
        if !(force || self.dirty) {
            return None;
        }
        let payload = self
            .behavior
            .as_deref()
            .and_then(|behavior| behavior.replicable())
            .map(|replicable| replicable.write_network())?;
        if !keep_dirty {
            self.dirty = false;
        }
        Some(payload)
    }

    // Tree

    pub fn parent(&self) -> Option<EntityKey> {
        self.parent
    }

    pub fn children(&self) -> &[EntityKey] {
        &self.children
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type())
            .field("concrete_type", &self.concrete_type)
            .field("id", &self.id)
            .field("groups", &self.groups)
            .field("children", &self.children.len())
            .finish()
    }
}
