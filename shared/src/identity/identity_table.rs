use std::collections::HashMap;

use log::{debug, warn};

use crate::{groups, EntityKey, HostType, Scene};

use super::{IdentityError, NetworkId, FIRST_SELF_ID, ROOT_ID};

/// Which id space an allocation draws from. The choice always belongs to
/// the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdRange {
    /// Authoritative ids, handed out by the server only
    Server,
    /// Process-local ids for entities that are never replicated
    Local,
}

/// Allocates [`NetworkId`]s and maps every live id to its entity.
pub struct IdentityTable {
    host_type: HostType,
    next_server_id: u64,
    next_self_id: u64,
    entities: HashMap<NetworkId, EntityKey>,
    resync_requested: bool,
}

impl IdentityTable {
    pub fn new(host_type: HostType) -> Self {
        Self {
            host_type,
            next_server_id: 0,
            next_self_id: FIRST_SELF_ID as u64,
            entities: HashMap::new(),
            resync_requested: false,
        }
    }

    // Allocation

    pub fn allocate_server_id(&mut self) -> Result<NetworkId, IdentityError> {
        if self.next_server_id >= FIRST_SELF_ID as u64 {
            return Err(IdentityError::ServerRangeExhausted);
        }
        let id = NetworkId::new(self.next_server_id as u32);
        self.next_server_id += 1;
        Ok(id)
    }

    /// Next id of the half-open self range `[FIRST_SELF_ID, u32::MAX)`.
    pub fn allocate_self_id(&mut self) -> Result<NetworkId, IdentityError> {
        if self.next_self_id >= u32::MAX as u64 {
            return Err(IdentityError::SelfRangeExhausted);
        }
        let id = NetworkId::new(self.next_self_id as u32);
        self.next_self_id += 1;
        Ok(id)
    }

    pub fn allocate(&mut self, range: IdRange) -> Result<NetworkId, IdentityError> {
        match range {
            IdRange::Server => self.allocate_server_id(),
            IdRange::Local => self.allocate_self_id(),
        }
    }

    /// Gives every entity of the subtree that lacks an id one from `range`,
    /// then indexes the whole subtree. Existing ids are never reassigned.
    /// Entities in the local range are also tagged `SelfOnly`.
    pub fn assign_subtree(
        &mut self,
        scene: &mut Scene,
        root: &EntityKey,
        range: IdRange,
    ) -> Result<(), IdentityError> {
        for key in scene.descendants(root) {
            let Some(node) = scene.node_mut(&key) else {
                continue;
            };
            if range == IdRange::Local {
                node.add_group(groups::SELF_ONLY);
            }
            let id = match node.id() {
                Some(id) => id,
                None => {
                    let id = self.allocate(range)?;
                    node.set_id(id);
                    id
                }
            };
            self.index(id, key)?;
        }
        Ok(())
    }

    /// Indexes the scene root under [`ROOT_ID`] and keeps the server
    /// allocator from handing that id out again.
    pub fn reserve_root(&mut self, root: EntityKey) -> NetworkId {
        self.entities.insert(ROOT_ID, root);
        self.next_server_id = self.next_server_id.max(u64::from(ROOT_ID.value()) + 1);
        ROOT_ID
    }

    // Lookup table

    pub fn index(&mut self, id: NetworkId, key: EntityKey) -> Result<(), IdentityError> {
        match self.entities.get(&id) {
            Some(existing) if *existing != key => Err(IdentityError::AlreadyIndexed { id }),
            Some(_) => Ok(()),
            None => {
                self.entities.insert(id, key);
                Ok(())
            }
        }
    }

    /// Indexes every identified entity of a subtree that was materialized
    /// from a record. On error nothing from the subtree stays indexed.
    pub fn index_subtree(&mut self, scene: &Scene, root: &EntityKey) -> Result<(), IdentityError> {
        let mut indexed = Vec::new();
        for key in scene.descendants(root) {
            let Some(id) = scene.node(&key).and_then(|node| node.id()) else {
                continue;
            };
            if self.entities.contains_key(&id) {
                for id in indexed {
                    self.entities.remove(&id);
                }
                return Err(IdentityError::AlreadyIndexed { id });
            }
            self.entities.insert(id, key);
            indexed.push(id);
        }
        Ok(())
    }

    pub fn unindex_subtree(&mut self, scene: &Scene, root: &EntityKey) {
        for key in scene.descendants(root) {
            if let Some(id) = scene.node(&key).and_then(|node| node.id()) {
                if self.entities.get(&id) == Some(&key) {
                    self.entities.remove(&id);
                }
            }
        }
    }

    pub fn unindex(&mut self, id: &NetworkId) -> Option<EntityKey> {
        self.entities.remove(id)
    }

    pub fn get(&self, id: &NetworkId) -> Option<EntityKey> {
        self.entities.get(id).copied()
    }

    pub fn contains(&self, id: &NetworkId) -> bool {
        self.entities.contains_key(id)
    }

    /// Looks up the entity holding `id`. On a client a miss means the local
    /// replica has diverged, so it also raises a resync request.
    pub fn resolve(&mut self, id: &NetworkId) -> Result<EntityKey, IdentityError> {
        if let Some(key) = self.entities.get(id) {
            return Ok(*key);
        }
        if self.host_type == HostType::Client {
            if !self.resync_requested {
                warn!("identity {} is unknown, requesting a full resync", id);
            }
            self.resync_requested = true;
        } else {
            debug!("identity {} is unknown on the server", id);
        }
        Err(IdentityError::NotFound { id: *id })
    }

    pub fn request_resync(&mut self) {
        self.resync_requested = true;
    }

    pub fn resync_requested(&self) -> bool {
        self.resync_requested
    }

    /// Returns whether a resync was requested since the last call.
    pub fn take_resync_request(&mut self) -> bool {
        std::mem::take(&mut self.resync_requested)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    #[cfg(test)]
    pub(crate) fn skip_to(&mut self, next_server_id: u64, next_self_id: u64) {
        self.next_server_id = next_server_id;
        self.next_self_id = next_self_id;
    }
}
