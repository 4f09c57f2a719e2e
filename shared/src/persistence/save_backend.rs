use std::collections::HashMap;

use log::info;

use crate::{deserialize_entity, serialize_entity, CodecPath, EntityKey, Scene, TypeRegistry};

use super::{PersistenceError, SaveRecord};

/// Byte storage keyed by path.
pub trait SaveBackend {
    fn load(&self, path: &str) -> Result<Vec<u8>, PersistenceError>;

    fn save(&mut self, path: &str, bytes: &[u8]) -> Result<(), PersistenceError>;
}

/// Keeps records in memory, e.g. for tests or a scratch slot.
#[derive(Default)]
pub struct MemoryBackend {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn insert(&mut self, path: &str, bytes: Vec<u8>) {
        self.files.insert(path.to_string(), bytes);
    }
}

impl SaveBackend for MemoryBackend {
    fn load(&self, path: &str) -> Result<Vec<u8>, PersistenceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound {
                path: path.to_string(),
            })
    }

    fn save(&mut self, path: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        self.files.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }
}

cfg_if! {
    if #[cfg(not(target_arch = "wasm32"))] {
        use std::{fs, io, path::PathBuf};

        /// Stores records as files below a root directory.
        pub struct FileBackend {
            root: PathBuf,
        }

        impl FileBackend {
            pub fn new(root: impl Into<PathBuf>) -> Self {
                Self { root: root.into() }
            }
        }

        impl SaveBackend for FileBackend {
            fn load(&self, path: &str) -> Result<Vec<u8>, PersistenceError> {
                fs::read(self.root.join(path)).map_err(|error| match error.kind() {
                    io::ErrorKind::NotFound => PersistenceError::NotFound {
                        path: path.to_string(),
                    },
                    _ => PersistenceError::Io {
                        path: path.to_string(),
                        reason: error.to_string(),
                    },
                })
            }

            fn save(&mut self, path: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
                let full_path = self.root.join(path);
                let io_error = |error: io::Error| PersistenceError::Io {
                    path: path.to_string(),
                    reason: error.to_string(),
                };
                if let Some(parent) = full_path.parent() {
                    fs::create_dir_all(parent).map_err(io_error)?;
                }
                fs::write(&full_path, bytes).map_err(io_error)
            }
        }

        fn now() -> Result<Option<u64>, PersistenceError> {
            crate::Timestamp::try_now()
                .map(Some)
                .map_err(|_| PersistenceError::Clock)
        }
    } else {
        fn now() -> Result<Option<u64>, PersistenceError> {
            Ok(None)
        }
    }
}

/// Writes the save record of `key` and its persistent descendants to
/// `path`.
pub fn save_entity(
    scene: &Scene,
    key: &EntityKey,
    backend: &mut dyn SaveBackend,
    path: &str,
) -> Result<SaveRecord, PersistenceError> {
    let entity =
        serialize_entity(scene, key, CodecPath::Save).ok_or(PersistenceError::NotPersistable)?;
    let mut record = SaveRecord::new(entity, now()?);
    record.seal().map_err(|error| PersistenceError::Malformed {
        path: path.to_string(),
        reason: error.to_string(),
    })?;
    backend.save(path, &record.to_bytes(path)?)?;
    info!("saved `{}` to `{}`", record.entity.name, path);
    Ok(record)
}

/// Restores the record at `path` as a new detached subtree. A record whose
/// content does not match its hash is rejected.
pub fn load_entity(
    scene: &mut Scene,
    registry: &TypeRegistry,
    backend: &dyn SaveBackend,
    path: &str,
) -> Result<EntityKey, PersistenceError> {
    let bytes = backend.load(path)?;
    let record = SaveRecord::from_bytes(&bytes, path)?;
    record.verify(path)?;
    let key = deserialize_entity(scene, registry, &record.entity, CodecPath::Save)?;
    info!("loaded `{}` from `{}`", record.entity.name, path);
    Ok(key)
}
