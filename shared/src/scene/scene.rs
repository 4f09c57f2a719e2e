use crate::{BigMap, BigMapKey};

use super::{Node, SceneError};

// EntityKey
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct EntityKey(u64);

impl BigMapKey for EntityKey {
    fn to_u64(&self) -> u64 {
        self.0
    }

    fn from_u64(value: u64) -> Self {
        EntityKey(value)
    }
}

/// Arena holding the entity tree. Entities are addressed by [`EntityKey`],
/// which stays valid until the entity is despawned; a stale key simply
/// misses on every lookup.
pub struct Scene {
    nodes: BigMap<EntityKey, Node>,
    root: EntityKey,
}

impl Scene {
    pub fn new(root: Node) -> Self {
        let mut nodes = BigMap::new();
        let root = nodes.insert(root);
        Self { nodes, root }
    }

    pub fn root(&self) -> EntityKey {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn node(&self, key: &EntityKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: &EntityKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    pub fn parent(&self, key: &EntityKey) -> Option<EntityKey> {
        self.nodes.get(key).and_then(|node| node.parent)
    }

    pub fn children(&self, key: &EntityKey) -> &[EntityKey] {
        match self.nodes.get(key) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    pub fn find_child(&self, parent: &EntityKey, name: &str) -> Option<EntityKey> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.nodes.get(child).is_some_and(|node| node.name() == name))
    }

    /// `key` and everything below it, parents before children, siblings in
    /// order.
    pub fn descendants(&self, key: &EntityKey) -> Vec<EntityKey> {
        let mut output = Vec::new();
        if !self.contains(key) {
            return output;
        }
        let mut stack = vec![*key];
        while let Some(current) = stack.pop() {
            output.push(current);
            for child in self.children(&current).iter().rev() {
                stack.push(*child);
            }
        }
        output
    }

    pub fn is_ancestor(&self, ancestor: &EntityKey, key: &EntityKey) -> bool {
        let mut current = self.parent(key);
        while let Some(parent) = current {
            if parent == *ancestor {
                return true;
            }
            current = self.parent(&parent);
        }
        false
    }

    // Mutation

    /// Inserts a detached entity. Any tree links on `node` are discarded.
    pub fn spawn(&mut self, mut node: Node) -> EntityKey {
        node.parent = None;
        node.children.clear();
        self.nodes.insert(node)
    }

    pub fn spawn_child(&mut self, parent: &EntityKey, node: Node) -> Result<EntityKey, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::EntityNotFound {
                context: "spawn_child parent",
            });
        }
        let child = self.spawn(node);
        self.attach(parent, &child)?;
        Ok(child)
    }

    pub fn attach(&mut self, parent: &EntityKey, child: &EntityKey) -> Result<(), SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::EntityNotFound {
                context: "attach parent",
            });
        }
        if *child == self.root {
            return Err(SceneError::RootIsPermanent);
        }
        let Some(child_node) = self.nodes.get(child) else {
            return Err(SceneError::EntityNotFound {
                context: "attach child",
            });
        };
        if child_node.parent.is_some() {
            return Err(SceneError::AlreadyAttached { child: *child });
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(SceneError::WouldCreateCycle {
                parent: *parent,
                child: *child,
            });
        }

        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = Some(*parent);
        }
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(*child);
        }
        Ok(())
    }

    pub fn detach(&mut self, child: &EntityKey) -> Result<(), SceneError> {
        if *child == self.root {
            return Err(SceneError::RootIsPermanent);
        }
        let Some(child_node) = self.nodes.get_mut(child) else {
            return Err(SceneError::EntityNotFound {
                context: "detach child",
            });
        };
        if let Some(parent) = child_node.parent.take() {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.retain(|key| key != child);
            }
        }
        Ok(())
    }

    /// Removes `key` and all of its descendants, returning them parents
    /// first.
    pub fn despawn(&mut self, key: &EntityKey) -> Result<Vec<(EntityKey, Node)>, SceneError> {
        self.detach(key)?;
        let removed = self
            .descendants(key)
            .into_iter()
            .filter_map(|current| self.nodes.remove(&current).map(|node| (current, node)))
            .collect();
        Ok(removed)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Node::plain("Main"))
    }
}
