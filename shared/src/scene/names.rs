//! Group tags and metadata keys the protocol itself interprets.

pub mod groups {
    /// Entity exists only in the local process and is never serialized
    pub const SELF_ONLY: &str = "SelfOnly";
    /// Entity is skipped by save records
    pub const NOT_PERSISTENT: &str = "NotPersistent";
    /// Children are skipped by every record
    pub const IGNORE_CHILDREN: &str = "IgnoreChildren";
    /// Children are skipped by save records
    pub const IGNORE_CHILDREN_SAVE: &str = "IgnoreChildrenSave";
    /// Children are skipped by network records
    pub const IGNORE_CHILDREN_NETWORK: &str = "IgnoreChildrenNetwork";
    pub const LEVEL: &str = "Level";
    pub const OUTSIDE: &str = "Outside";
}

pub mod meta {
    /// Decimal [`NetworkId`](crate::NetworkId), carried only by network records
    pub const UNIQUE_ID: &str = "UniqueId";
    /// Decimal [`ConnectionId`](crate::ConnectionId) of the controlling player
    pub const OWNER_ID: &str = "OwnerId";
    pub const LEVEL_PARTITION_NAME: &str = "LevelPartitionName";
    pub const UNIQUE_ITEM_ID: &str = "UniqueItemId";
}
