use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ConnectionId, EntityRecord, InputMode, NetworkId, PointerButton, PressState, RpcValue};

use super::WireError;

/// Bumped whenever a record or message changes shape.
pub const WIRE_VERSION: u16 = 1;

/// Every message exchanged between server and clients, discriminated by the
/// `DAT` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "DAT")]
pub enum NetworkMessage {
    /// Either direction
    RpcCall(RpcCall),
    /// Client -> server
    ClientInputUpdate(ClientInputUpdate),
    /// Server -> clients
    ServerUpdate(ServerUpdate),
    /// Server -> one client
    FullServerData(FullServerData),
    /// Server -> clients
    ServerAdd(ServerAdd),
    /// Server -> clients
    ServerRemove(ServerRemove),
    /// Client -> server
    RequestForceUpdate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcCall {
    #[serde(rename = "Caller")]
    pub caller: NetworkId,
    #[serde(rename = "MethodName")]
    pub method: String,
    #[serde(rename = "Params", default)]
    pub params: Vec<RpcValue>,
}

/// Input of one player. Only the fields relevant to the update type are
/// present: a pointer-only update carries just `MP`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientInputUpdate {
    #[serde(rename = "O")]
    pub owner: NetworkId,
    #[serde(rename = "A", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub actions: BTreeMap<String, PressState>,
    #[serde(rename = "M", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pointers: BTreeMap<PointerButton, PressState>,
    #[serde(rename = "IST", default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<InputMode>,
    #[serde(rename = "MP", default, skip_serializing_if = "Option::is_none")]
    pub pointer_position: Option<Vec2>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OwnerEntry {
    #[serde(rename = "OID")]
    pub connection: ConnectionId,
    #[serde(rename = "UID")]
    pub entity: NetworkId,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerUpdate {
    #[serde(rename = "NN", default)]
    pub entities: BTreeMap<NetworkId, Value>,
    #[serde(rename = "A", default, skip_serializing_if = "Vec::is_empty")]
    pub owners_added: Vec<OwnerEntry>,
}

impl ServerUpdate {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.owners_added.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FullServerData {
    #[serde(rename = "Nodes", default)]
    pub entities: Vec<EntityRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerAdd {
    #[serde(rename = "Owner")]
    pub owner: NetworkId,
    #[serde(rename = "Node")]
    pub entity: EntityRecord,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerRemove {
    #[serde(rename = "UniqueId")]
    pub id: NetworkId,
}

#[derive(Serialize)]
struct OutgoingEnvelope<'a> {
    #[serde(rename = "V")]
    version: u16,
    #[serde(rename = "D")]
    data: &'a NetworkMessage,
}

#[derive(Deserialize)]
struct IncomingEnvelope {
    #[serde(rename = "V")]
    version: u16,
    #[serde(rename = "D")]
    data: Value,
}

impl NetworkMessage {
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let envelope = OutgoingEnvelope {
            version: WIRE_VERSION,
            data: self,
        };
        serde_json::to_vec(&envelope).map_err(|error| WireError::Encode {
            reason: error.to_string(),
        })
    }

    /// Decodes one message. The version is checked before the payload is
    /// interpreted, so a peer on another revision reports a mismatch rather
    /// than a malformed message.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let envelope: IncomingEnvelope =
            serde_json::from_slice(bytes).map_err(|error| WireError::Decode {
                reason: error.to_string(),
            })?;
        if envelope.version != WIRE_VERSION {
            return Err(WireError::VersionMismatch {
                expected: WIRE_VERSION,
                actual: envelope.version,
            });
        }
        serde_json::from_value(envelope.data).map_err(|error| WireError::Decode {
            reason: error.to_string(),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            NetworkMessage::RpcCall(_) => "RpcCall",
            NetworkMessage::ClientInputUpdate(_) => "ClientInputUpdate",
            NetworkMessage::ServerUpdate(_) => "ServerUpdate",
            NetworkMessage::FullServerData(_) => "FullServerData",
            NetworkMessage::ServerAdd(_) => "ServerAdd",
            NetworkMessage::ServerRemove(_) => "ServerRemove",
            NetworkMessage::RequestForceUpdate => "RequestForceUpdate",
        }
    }
}
