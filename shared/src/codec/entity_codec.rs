use log::warn;

use crate::{groups, meta, EntityKey, Node, Scene, SceneError};

use super::{CodecError, EntityRecord, SpatialFields, TypeRegistry};

/// Which consumer a record is built for. The two paths differ in skip
/// rules, identity handling, and which capability payload is embedded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodecPath {
    Network,
    Save,
}

pub(crate) fn is_skipped(scene: &Scene, key: &EntityKey, node: &Node, path: CodecPath) -> bool {
    if node.in_group(groups::SELF_ONLY) {
        return true;
    }
    if path == CodecPath::Save && node.in_group(groups::NOT_PERSISTENT) {
        return true;
    }
    let Some(parent) = scene.parent(key).and_then(|parent| scene.node(&parent)) else {
        return false;
    };
    if parent.in_group(groups::IGNORE_CHILDREN) {
        return true;
    }
    match path {
        CodecPath::Network => parent.in_group(groups::IGNORE_CHILDREN_NETWORK),
        CodecPath::Save => parent.in_group(groups::IGNORE_CHILDREN_SAVE),
    }
}

/// Whether a record built from the scene root reaches `key` on `path`. False
/// as soon as `key` or one of its ancestors is pruned by the skip rules.
pub(crate) fn is_reachable(scene: &Scene, key: &EntityKey, path: CodecPath) -> bool {
    let mut current = Some(*key);
    while let Some(key) = current {
        let Some(node) = scene.node(&key) else {
            return false;
        };
        if is_skipped(scene, &key, node, path) {
            return false;
        }
        current = scene.parent(&key);
    }
    true
}

/// Builds the record for `key` and its descendants, or `None` when the skip
/// rules exclude the entity. Skipped children are left out of `C`.
///
/// Network records embed the replicable payload with a read that leaves the
/// dirty flag untouched.
pub fn serialize_entity(scene: &Scene, key: &EntityKey, path: CodecPath) -> Option<EntityRecord> {
    let node = scene.node(key)?;
    if is_skipped(scene, key, node, path) {
        return None;
    }

    let mut meta = node.meta().clone();
    match (path, node.id()) {
        (CodecPath::Network, Some(id)) => {
            meta.insert(meta::UNIQUE_ID.to_string(), id.to_string());
        }
        _ => {
            meta.remove(meta::UNIQUE_ID);
        }
    }

    let behavior = node.behavior();
    let network_payload = match path {
        CodecPath::Network => behavior
            .and_then(|behavior| behavior.replicable())
            .map(|replicable| replicable.write_network()),
        CodecPath::Save => None,
    };
    let save_payload = match path {
        CodecPath::Save => behavior
            .and_then(|behavior| behavior.persistable())
            .map(|persistable| persistable.write_save()),
        CodecPath::Network => None,
    };

    let children = node
        .children()
        .iter()
        .filter_map(|child| serialize_entity(scene, child, path))
        .collect();

    Some(EntityRecord {
        name: node.name().to_string(),
        declared_type: node.declared_type().to_string(),
        concrete_type: node.concrete_type().to_string(),
        spatial: SpatialFields::from_spatial(node.spatial()),
        meta,
        groups: node.groups().to_vec(),
        children,
        network_payload,
        save_payload,
    })
}

/// Materializes `record` as a new detached subtree and returns its root.
///
/// The behavior named by the declared type is attached before metadata and
/// children are applied, and the capability hook runs last. If any part
/// fails the partial subtree is despawned.
pub fn deserialize_entity(
    scene: &mut Scene,
    registry: &TypeRegistry,
    record: &EntityRecord,
    path: CodecPath,
) -> Result<EntityKey, CodecError> {
    let kind = registry
        .spatial_kind(&record.concrete_type)
        .ok_or_else(|| CodecError::UnknownType {
            type_name: record.concrete_type.clone(),
        })?;
    let spatial = record.spatial.to_spatial(&record.name, kind)?;

    let mut node = Node::new(record.name.clone(), record.concrete_type.clone(), spatial);
    if record.declared_type != record.concrete_type {
        let behavior = registry.make_behavior(&record.declared_type).ok_or_else(|| {
            CodecError::UnknownBehavior {
                type_tag: record.declared_type.clone(),
                name: record.name.clone(),
            }
        })?;
        node.set_behavior(behavior);
    }
    let key = scene.spawn(node);

    match populate(scene, registry, &key, record, path) {
        Ok(()) => Ok(key),
        Err(error) => {
            // key was spawned above and is still detached
            let _ = scene.despawn(&key);
            Err(error)
        }
    }
}

fn populate(
    scene: &mut Scene,
    registry: &TypeRegistry,
    key: &EntityKey,
    record: &EntityRecord,
    path: CodecPath,
) -> Result<(), CodecError> {
    let id = record.network_id()?;

    let node = scene.node_mut(key).ok_or(SceneError::EntityNotFound {
        context: "deserialize_entity",
    })?;
    for (meta_key, value) in &record.meta {
        if meta_key != meta::UNIQUE_ID {
            node.set_meta(meta_key.clone(), value.clone());
        }
    }
    if let (CodecPath::Network, Some(id)) = (path, id) {
        node.set_id(id);
    }
    for group in &record.groups {
        node.add_group(group.clone());
    }

    for child_record in &record.children {
        let child = deserialize_entity(scene, registry, child_record, path)?;
        if let Err(error) = scene.attach(key, &child) {
            let _ = scene.despawn(&child);
            return Err(error.into());
        }
    }

    let Some(node) = scene.node_mut(key) else {
        return Ok(());
    };
    let name = node.name().to_string();
    let Some(behavior) = node.behavior_mut() else {
        return Ok(());
    };
    match (path, &record.network_payload, &record.save_payload) {
        (CodecPath::Network, Some(payload), _) => match behavior.replicable_mut() {
            Some(replicable) => replicable.read_network(payload)?,
            None => warn!("record `{}` carries a network payload but is not replicable", name),
        },
        (CodecPath::Save, _, Some(payload)) => match behavior.persistable_mut() {
            Some(persistable) => persistable.read_save(payload)?,
            None => warn!("record `{}` carries a save payload but is not persistable", name),
        },
        _ => {}
    }
    Ok(())
}
