use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// First id of the self range. Everything below it belongs to the server.
pub const FIRST_SELF_ID: u32 = u32::MAX - 10_000_000;

/// Identity of the scene root. Both roles index their root under it
/// without ever exchanging it.
pub const ROOT_ID: NetworkId = NetworkId::new(0);

/// Stable identity of a replicated entity, shared by the server and every
/// client. Ids at or above [`FIRST_SELF_ID`] are process-local and never
/// name an entity across the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkId(u32);

impl NetworkId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn is_self(&self) -> bool {
        self.0 >= FIRST_SELF_ID
    }

    pub fn is_server(&self) -> bool {
        !self.is_self()
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NetworkId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>().map(NetworkId)
    }
}

// Decimal string on the wire, which also lets ids be JSON object keys
impl Serialize for NetworkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NetworkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
