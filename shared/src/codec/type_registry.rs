use std::collections::HashMap;

use crate::{Behavior, SpatialKind};

type BehaviorFactory = fn() -> Box<dyn Behavior>;

fn make_behavior<B: Behavior + Default>() -> Box<dyn Behavior> {
    Box::new(B::default())
}

/// Everything the codec needs to re-create an entity by name: which
/// transform each concrete type carries, and how to build each behavior.
pub struct TypeRegistry {
    node_types: HashMap<String, SpatialKind>,
    behaviors: HashMap<&'static str, BehaviorFactory>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut registry = Self {
            node_types: HashMap::new(),
            behaviors: HashMap::new(),
        };
        registry.add_node_type("Node", SpatialKind::None);
        registry.add_node_type("Node2D", SpatialKind::TwoD);
        registry.add_node_type("Control", SpatialKind::Ui);
        registry.add_node_type("Node3D", SpatialKind::ThreeD);
        registry
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node_type(&mut self, type_name: impl Into<String>, kind: SpatialKind) {
        self.node_types.insert(type_name.into(), kind);
    }

    /// Registers `B` under its own type tag and returns the tag.
    pub fn add_behavior<B: Behavior + Default>(&mut self) -> &'static str {
        let type_tag = B::default().type_tag();
        self.behaviors.insert(type_tag, make_behavior::<B>);
        type_tag
    }

    pub fn spatial_kind(&self, type_name: &str) -> Option<SpatialKind> {
        self.node_types.get(type_name).copied()
    }

    pub fn has_behavior(&self, type_tag: &str) -> bool {
        self.behaviors.contains_key(type_tag)
    }

    pub fn make_behavior(&self, type_tag: &str) -> Option<Box<dyn Behavior>> {
        self.behaviors.get(type_tag).map(|factory| factory())
    }
}
