use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use crate::{
    codec::{is_reachable, is_skipped, CodecPath},
    EntityKey, NetworkId, Scene,
};

/// Entities whose replicable state is broadcast, in registration order.
#[derive(Default)]
pub struct ReplicationRegistry {
    entities: Vec<EntityKey>,
    members: HashSet<EntityKey>,
}

impl ReplicationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every replicable entity of the subtree that network records
    /// carry. Subtrees the network codec prunes are skipped whole, since
    /// clients never learn their ids.
    pub fn add_subtree(&mut self, scene: &Scene, root: &EntityKey) {
        if !is_reachable(scene, root, CodecPath::Network) {
            return;
        }
        let mut stack = vec![*root];
        while let Some(key) = stack.pop() {
            let Some(node) = scene.node(&key) else {
                continue;
            };
            if key != *root && is_skipped(scene, &key, node, CodecPath::Network) {
                continue;
            }
            if node.is_replicable() && self.members.insert(key) {
                self.entities.push(key);
            }
            stack.extend(node.children().iter().rev());
        }
    }

    pub fn remove_subtree(&mut self, scene: &Scene, root: &EntityKey) {
        let removed: HashSet<EntityKey> = scene
            .descendants(root)
            .into_iter()
            .filter(|key| self.members.remove(key))
            .collect();
        if !removed.is_empty() {
            self.entities.retain(|key| !removed.contains(key));
        }
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.members.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Payloads of every registered entity that changed since it was last
    /// collected, or of all of them when `force` is set. Entities that
    /// vanished from the scene, or were moved where network records no longer
    /// reach them, are dropped from the registry.
    pub fn collect(&mut self, scene: &mut Scene, force: bool) -> BTreeMap<NetworkId, Value> {
        let members = &mut self.members;
        self.entities.retain(|key| {
            let kept = is_reachable(scene, key, CodecPath::Network);
            if !kept {
                members.remove(key);
            }
            kept
        });

        let mut payloads = BTreeMap::new();
        for key in &self.entities {
            let Some(node) = scene.node_mut(key) else {
                continue;
            };
            let Some(id) = node.id().filter(NetworkId::is_server) else {
                continue;
            };
            if let Some(payload) = node.network_delta(force, false) {
                payloads.insert(id, payload);
            }
        }
        payloads
    }
}
