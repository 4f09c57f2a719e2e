use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::EntityRecord;

use super::PersistenceError;

/// Entity record written by the save path, stamped with the wall-clock time
/// it was taken and sealed with a SHA-256 of its own content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    #[serde(flatten)]
    pub entity: EntityRecord,
    #[serde(rename = "RTS", default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<u64>,
    #[serde(rename = "hash", default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl SaveRecord {
    pub fn new(entity: EntityRecord, saved_at: Option<u64>) -> Self {
        Self {
            entity,
            saved_at,
            hash: None,
        }
    }

    /// Uppercase hex SHA-256 of the record serialized without its hash.
    pub fn content_hash(&self) -> Result<String, serde_json::Error> {
        let unsealed = SaveRecord {
            entity: self.entity.clone(),
            saved_at: self.saved_at,
            hash: None,
        };
        let bytes = serde_json::to_vec(&unsealed)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:X}", hasher.finalize()))
    }

    pub fn seal(&mut self) -> Result<(), serde_json::Error> {
        self.hash = Some(self.content_hash()?);
        Ok(())
    }

    pub fn hash_matches(&self) -> bool {
        match (&self.hash, self.content_hash()) {
            (Some(stored), Ok(computed)) => *stored == computed,
            _ => false,
        }
    }

    pub fn verify(&self, path: &str) -> Result<(), PersistenceError> {
        if self.hash_matches() {
            Ok(())
        } else {
            Err(PersistenceError::SchemaMismatch {
                path: path.to_string(),
            })
        }
    }

    pub fn to_bytes(&self, path: &str) -> Result<Vec<u8>, PersistenceError> {
        serde_json::to_vec(self).map_err(|error| PersistenceError::Malformed {
            path: path.to_string(),
            reason: error.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8], path: &str) -> Result<Self, PersistenceError> {
        serde_json::from_slice(bytes).map_err(|error| PersistenceError::Malformed {
            path: path.to_string(),
            reason: error.to_string(),
        })
    }
}
