use glam::Vec3;
use log::{debug, info, warn};

use crate::{
    deserialize_entity, groups, meta, serialize_entity, CodecPath, ConnectionId, EntityKey,
    EntityRecord, FullServerData, HostType, IdRange, IdentityError, IdentityTable, NetworkId,
    Node, OwnerEntry, Scene, SceneError, SceneListener, ServerAdd, ServerRemove, ServerUpdate,
    TypeRegistry,
};

use super::{OwnerMap, ReplicationRegistry, WorldError};

/// Options for [`NetworkWorld::add_server_entity`].
#[derive(Clone, Debug, PartialEq)]
pub struct AddOptions {
    /// Moves the entity before it is attached
    pub position: Option<Vec3>,
    /// Whether save records should include the entity
    pub persistent: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            position: None,
            persistent: true,
        }
    }
}

/// Result of applying a [`ServerUpdate`] on a client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Arrived before the first full snapshot
    Ignored,
    /// Referenced an unknown entity, nothing was applied
    Dropped { missing: NetworkId },
    Applied { entities: usize },
}

/// The replicated scene together with its identity table, replication
/// registry and owner map. Operations that belong to one role fail with
/// [`WorldError::Usage`] on the other.
pub struct NetworkWorld {
    host_type: HostType,
    scene: Scene,
    identities: IdentityTable,
    replicables: ReplicationRegistry,
    owners: OwnerMap,
    has_full_server_data: bool,
}

impl NetworkWorld {
    pub fn new(host_type: HostType) -> Self {
        Self::with_root(host_type, Node::plain("Main"))
    }

    pub fn with_root(host_type: HostType, root: Node) -> Self {
        let mut scene = Scene::new(root);
        let mut identities = IdentityTable::new(host_type);
        let root = scene.root();
        let root_id = identities.reserve_root(root);
        if let Some(node) = scene.node_mut(&root) {
            node.set_id(root_id);
        }

        Self {
            host_type,
            scene,
            identities,
            replicables: ReplicationRegistry::new(),
            owners: OwnerMap::new(),
            has_full_server_data: false,
        }
    }

    // Accessors

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn root(&self) -> EntityKey {
        self.scene.root()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn identities(&self) -> &IdentityTable {
        &self.identities
    }

    pub fn identities_mut(&mut self) -> &mut IdentityTable {
        &mut self.identities
    }

    /// Both halves at once, for callers that resolve and mutate together.
    pub fn scene_and_identities_mut(&mut self) -> (&mut Scene, &mut IdentityTable) {
        (&mut self.scene, &mut self.identities)
    }

    pub fn replicables(&self) -> &ReplicationRegistry {
        &self.replicables
    }

    pub fn owners(&self) -> &OwnerMap {
        &self.owners
    }

    pub fn has_full_server_data(&self) -> bool {
        self.has_full_server_data
    }

    pub fn entity(&self, id: &NetworkId) -> Option<EntityKey> {
        self.identities.get(id)
    }

    pub fn id_of(&self, key: &EntityKey) -> Result<NetworkId, WorldError> {
        let node = self.scene.node(key).ok_or(SceneError::EntityNotFound {
            context: "NetworkWorld::id_of",
        })?;
        node.id().ok_or_else(|| WorldError::Unidentified {
            name: node.name().to_string(),
        })
    }

    fn require(&self, host_type: HostType, operation: &'static str) -> Result<(), WorldError> {
        if self.host_type == host_type {
            Ok(())
        } else {
            Err(WorldError::Usage {
                operation,
                host_type: self.host_type,
            })
        }
    }

    fn wire_id_of(&self, key: &EntityKey) -> Result<NetworkId, WorldError> {
        let id = self.id_of(key)?;
        if id.is_self() {
            return Err(IdentityError::SelfIdentityOnWire { id }.into());
        }
        Ok(id)
    }

    // Server entities

    /// Adopts a detached subtree under `owner` and announces it to every
    /// client.
    ///
    /// The entity is tagged `NotPersistent` unless it is persistent and
    /// belongs to a level partition. Every entity of the subtree receives a
    /// server id before it is attached. Returns `None` when the skip rules
    /// leave nothing to announce.
    pub fn add_server_entity(
        &mut self,
        owner: &EntityKey,
        entity: &EntityKey,
        options: AddOptions,
        listeners: &mut [Box<dyn SceneListener>],
    ) -> Result<Option<ServerAdd>, WorldError> {
        self.require(HostType::Server, "add_server_entity")?;
        let owner_id = self.wire_id_of(owner)?;
        let owner_partitioned = self
            .scene
            .node(owner)
            .is_some_and(|node| node.get_meta(meta::LEVEL_PARTITION_NAME).is_some());

        let node = self.scene.node_mut(entity).ok_or(SceneError::EntityNotFound {
            context: "add_server_entity",
        })?;
        let partitioned =
            owner_partitioned || node.get_meta(meta::LEVEL_PARTITION_NAME).is_some();
        if !options.persistent || !partitioned {
            node.add_group(groups::NOT_PERSISTENT);
        }
        if let Some(position) = options.position {
            if !node.spatial_mut().set_position(position) {
                debug!("position override ignored for `{}`: no transform", node.name());
            }
        }

        self.identities
            .assign_subtree(&mut self.scene, entity, IdRange::Server)?;
        if let Err(error) = self.scene.attach(owner, entity) {
            self.identities.unindex_subtree(&self.scene, entity);
            return Err(error.into());
        }
        for listener in listeners.iter_mut() {
            listener.entity_added(&mut self.scene, *owner, *entity);
        }
        self.replicables.add_subtree(&self.scene, entity);

        let Some(record) = serialize_entity(&self.scene, entity, CodecPath::Network) else {
            debug!("server entity {:?} is excluded from network records", entity);
            return Ok(None);
        };
        info!("server entity `{}` added under {}", record.name, owner_id);
        Ok(Some(ServerAdd {
            owner: owner_id,
            entity: record,
        }))
    }

    /// Despawns a server entity with its subtree and announces the removal.
    pub fn remove_server_entity(
        &mut self,
        entity: &EntityKey,
        listeners: &mut [Box<dyn SceneListener>],
    ) -> Result<ServerRemove, WorldError> {
        self.require(HostType::Server, "remove_server_entity")?;
        if *entity == self.scene.root() {
            return Err(SceneError::RootIsPermanent.into());
        }
        let id = self.wire_id_of(entity)?;

        self.replicables.remove_subtree(&self.scene, entity);
        for listener in listeners.iter_mut() {
            listener.entity_removed(&mut self.scene, *entity);
        }
        self.despawn_subtree(entity)?;
        info!("server entity {} removed", id);
        Ok(ServerRemove { id })
    }

    /// Records of every top-level entity, for a newly connected client.
    pub fn full_server_data(&self) -> Result<FullServerData, WorldError> {
        self.require(HostType::Server, "full_server_data")?;
        let root = self.scene.root();
        let entities = self
            .scene
            .children(&root)
            .iter()
            .filter_map(|child| serialize_entity(&self.scene, child, CodecPath::Network))
            .collect();
        Ok(FullServerData { entities })
    }

    /// Payloads of changed replicables (every replicable when `force` is
    /// set) plus owner mappings, or `None` when there is nothing to send.
    pub fn collect_update(&mut self, force: bool) -> Result<Option<ServerUpdate>, WorldError> {
        self.require(HostType::Server, "collect_update")?;
        let entities = self.replicables.collect(&mut self.scene, force);
        let owners_added = if force {
            self.owners.take_pending();
            self.owner_entries()
        } else {
            self.owners.take_pending()
        };

        let update = ServerUpdate {
            entities,
            owners_added,
        };
        if update.is_empty() {
            Ok(None)
        } else {
            Ok(Some(update))
        }
    }

    fn owner_entries(&self) -> Vec<OwnerEntry> {
        let mut entries: Vec<OwnerEntry> = self
            .owners
            .iter()
            .filter_map(|(connection, key)| {
                let entity = self.scene.node(&key)?.id()?;
                Some(OwnerEntry { connection, entity })
            })
            .collect();
        entries.sort_by_key(|entry| entry.connection);
        entries
    }

    // Players

    /// Records `player` as the entity controlled by `connection` and tags
    /// it with the connection's `OwnerId`.
    pub fn register_player(
        &mut self,
        connection: ConnectionId,
        player: &EntityKey,
    ) -> Result<NetworkId, WorldError> {
        self.require(HostType::Server, "register_player")?;
        let id = self.wire_id_of(player)?;
        if let Some(node) = self.scene.node_mut(player) {
            node.set_meta(meta::OWNER_ID, connection.to_string());
            node.mark_dirty();
        }
        self.owners.insert(connection, *player);
        self.owners.queue_addition(OwnerEntry {
            connection,
            entity: id,
        });
        info!("connection {} controls player {}", connection, id);
        Ok(id)
    }

    pub fn unregister_connection(&mut self, connection: &ConnectionId) -> Option<EntityKey> {
        self.owners.remove_connection(connection)
    }

    /// The player entity of `connection`. Falls back to searching the
    /// scene for an entity tagged with the connection's `OwnerId`.
    pub fn owner_entity(&mut self, connection: &ConnectionId) -> Option<EntityKey> {
        if let Some(key) = self.owners.entity(connection) {
            if self.scene.contains(&key) {
                return Some(key);
            }
        }
        let owner = connection.to_string();
        let root = self.scene.root();
        let found = self.scene.descendants(&root).into_iter().find(|key| {
            self.scene
                .node(key)
                .and_then(|node| node.get_meta(meta::OWNER_ID))
                == Some(owner.as_str())
        })?;
        self.owners.insert(*connection, found);
        Some(found)
    }

    /// Like [`owner_entity`](Self::owner_entity), but a client that cannot
    /// find the player asks for a resync.
    pub fn resolve_owner(&mut self, connection: &ConnectionId) -> Option<EntityKey> {
        let found = self.owner_entity(connection);
        if found.is_none() && self.host_type == HostType::Client {
            warn!("no player entity for connection {}, requesting a resync", connection);
            self.identities.request_resync();
        }
        found
    }

    // Self entities

    /// Adopts a detached subtree that never leaves this process.
    pub fn add_self_entity(
        &mut self,
        owner: &EntityKey,
        entity: &EntityKey,
        listeners: &mut [Box<dyn SceneListener>],
    ) -> Result<NetworkId, WorldError> {
        if !self.scene.contains(owner) {
            return Err(SceneError::EntityNotFound {
                context: "add_self_entity owner",
            }
            .into());
        }
        self.identities
            .assign_subtree(&mut self.scene, entity, IdRange::Local)?;
        if let Err(error) = self.scene.attach(owner, entity) {
            self.identities.unindex_subtree(&self.scene, entity);
            return Err(error.into());
        }
        for listener in listeners.iter_mut() {
            listener.entity_added(&mut self.scene, *owner, *entity);
        }
        self.id_of(entity)
    }

    pub fn remove_self_entity(
        &mut self,
        entity: &EntityKey,
        listeners: &mut [Box<dyn SceneListener>],
    ) -> Result<(), WorldError> {
        if !self.scene.contains(entity) {
            return Err(SceneError::EntityNotFound {
                context: "remove_self_entity",
            }
            .into());
        }
        for listener in listeners.iter_mut() {
            listener.entity_removed(&mut self.scene, *entity);
        }
        self.despawn_subtree(entity)?;
        Ok(())
    }

    /// Despawns a subtree and forgets its ids, registrations and owners.
    pub fn despawn_subtree(&mut self, entity: &EntityKey) -> Result<Vec<(EntityKey, Node)>, WorldError> {
        if *entity == self.scene.root() {
            return Err(SceneError::RootIsPermanent.into());
        }
        self.replicables.remove_subtree(&self.scene, entity);
        self.identities.unindex_subtree(&self.scene, entity);
        for key in self.scene.descendants(entity) {
            self.owners.remove_entity(&key);
        }
        Ok(self.scene.despawn(entity)?)
    }

    // Client application

    /// Merges a full snapshot. Entities already known are kept and only
    /// their unknown descendants are added; unknown top-level entities are
    /// attached under the root. Returns the newly attached subtree roots.
    pub fn apply_full_server_data(
        &mut self,
        registry: &TypeRegistry,
        data: &FullServerData,
    ) -> Result<Vec<EntityKey>, WorldError> {
        self.require(HostType::Client, "apply_full_server_data")?;
        self.has_full_server_data = true;

        let root = self.scene.root();
        let mut added = Vec::new();
        for record in &data.entities {
            if let Err(error) = self.merge_record(registry, &root, record, &mut added) {
                warn!("skipping `{}` from full server data: {}", record.name, error);
            }
        }
        info!(
            "full server data merged: {} new subtrees, {} known identities",
            added.len(),
            self.identities.len()
        );
        Ok(added)
    }

    fn merge_record(
        &mut self,
        registry: &TypeRegistry,
        parent: &EntityKey,
        record: &EntityRecord,
        added: &mut Vec<EntityKey>,
    ) -> Result<(), WorldError> {
        if let Some(id) = record.network_id()? {
            if let Some(known) = self.identities.get(&id) {
                for child in &record.children {
                    self.merge_record(registry, &known, child, added)?;
                }
                return Ok(());
            }
        }
        let key = self.materialize(registry, parent, record)?;
        added.push(key);
        Ok(())
    }

    fn materialize(
        &mut self,
        registry: &TypeRegistry,
        parent: &EntityKey,
        record: &EntityRecord,
    ) -> Result<EntityKey, WorldError> {
        let key = deserialize_entity(&mut self.scene, registry, record, CodecPath::Network)?;
        if let Err(error) = self.identities.index_subtree(&self.scene, &key) {
            self.scene.despawn(&key)?;
            return Err(error.into());
        }
        if let Err(error) = self.scene.attach(parent, &key) {
            self.identities.unindex_subtree(&self.scene, &key);
            self.scene.despawn(&key)?;
            return Err(error.into());
        }
        Ok(key)
    }

    /// Materializes an announced server entity under its owner. Adds that
    /// arrive before the first snapshot, name an unknown owner, or repeat a
    /// known entity are dropped.
    pub fn apply_server_add(
        &mut self,
        registry: &TypeRegistry,
        add: &ServerAdd,
    ) -> Result<Option<EntityKey>, WorldError> {
        self.require(HostType::Client, "apply_server_add")?;
        if !self.has_full_server_data {
            debug!("ignoring ServerAdd for `{}` before full server data", add.entity.name);
            return Ok(None);
        }
        let Ok(owner) = self.identities.resolve(&add.owner) else {
            warn!(
                "dropping ServerAdd for `{}`: owner {} is unknown",
                add.entity.name, add.owner
            );
            return Ok(None);
        };
        if let Some(id) = add.entity.network_id()? {
            if self.identities.contains(&id) {
                warn!("dropping ServerAdd for already known entity {}", id);
                return Ok(None);
            }
        }
        self.materialize(registry, &owner, &add.entity).map(Some)
    }

    pub fn apply_server_remove(&mut self, remove: &ServerRemove) -> Result<Option<EntityKey>, WorldError> {
        self.require(HostType::Client, "apply_server_remove")?;
        let Some(key) = self.identities.get(&remove.id) else {
            warn!("ServerRemove for unknown entity {}", remove.id);
            return Ok(None);
        };
        self.despawn_subtree(&key)?;
        Ok(Some(key))
    }

    /// Feeds every payload to its entity's replicable hook. If any
    /// referenced entity is unknown the whole update is dropped and a
    /// resync is requested.
    pub fn apply_server_update(&mut self, update: &ServerUpdate) -> Result<UpdateOutcome, WorldError> {
        self.require(HostType::Client, "apply_server_update")?;
        if !self.has_full_server_data {
            return Ok(UpdateOutcome::Ignored);
        }

        let mut targets = Vec::with_capacity(update.entities.len());
        for id in update.entities.keys() {
            match self.identities.resolve(id) {
                Ok(key) => targets.push(key),
                Err(_) => {
                    warn!("dropping ServerUpdate: entity {} is unknown", id);
                    return Ok(UpdateOutcome::Dropped { missing: *id });
                }
            }
        }

        let mut applied = 0;
        for (key, (id, payload)) in targets.iter().zip(update.entities.iter()) {
            let Some(node) = self.scene.node_mut(key) else {
                continue;
            };
            match node
                .behavior_mut()
                .and_then(|behavior| behavior.replicable_mut())
            {
                Some(replicable) => match replicable.read_network(payload) {
                    Ok(()) => applied += 1,
                    Err(error) => warn!("entity {} rejected its update: {}", id, error),
                },
                None => warn!("entity {} is not replicable on this client", id),
            }
        }

        for entry in &update.owners_added {
            match self.identities.resolve(&entry.entity) {
                Ok(key) => self.owners.insert(entry.connection, key),
                Err(_) => warn!(
                    "owner entry for connection {} names unknown entity {}",
                    entry.connection, entry.entity
                ),
            }
        }

        Ok(UpdateOutcome::Applied { entities: applied })
    }
}
